//! # sable-crypto
//!
//! Cryptographic primitives for the Sable onion transport.
//!
//! The suite is fixed; no algorithm negotiation is permitted:
//!
//! - [`x25519`] — X25519 key agreement (RFC 7748)
//! - [`kdf`] — Symmetric key derivation via HMAC-SHA256
//! - [`aes_gcm`] — AES-256-GCM AEAD encryption
//! - [`ecies`] — One-shot pairwise encryption to a recipient public key

pub mod aes_gcm;
pub mod ecies;
pub mod kdf;
pub mod x25519;

/// Error types for cryptographic operations.
///
/// Any crypto failure is fatal to the request attempt that triggered it and
/// is never retried.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AEAD encryption failed.
    #[error("AEAD encryption failed")]
    AeadEncryption,

    /// AEAD decryption failed (authentication tag mismatch).
    #[error("AEAD decryption failed")]
    AeadDecryption,

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Ciphertext too short or otherwise structurally invalid.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Invalid hex encoding of key material.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
