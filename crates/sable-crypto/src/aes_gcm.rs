//! AES-256-GCM AEAD encryption.
//!
//! Wire convention: sealed blobs are `nonce(12) || ciphertext || tag(16)`
//! with a random nonce, so a single byte string carries everything the
//! holder of the key needs to decrypt.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use crate::{CryptoError, Result};

/// Nonce size for AES-GCM (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Key size for AES-256-GCM (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Authentication tag size (128 bits = 16 bytes).
pub const TAG_SIZE: usize = 16;

/// Encrypt data with AES-256-GCM under an explicit nonce.
///
/// The nonce must never be reused with the same key. Returns ciphertext
/// with the 16-byte authentication tag appended.
pub fn encrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::AeadEncryption)?;

    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CryptoError::AeadEncryption)
}

/// Decrypt data with AES-256-GCM under an explicit nonce.
pub fn decrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::AeadDecryption)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::AeadDecryption)
}

/// Encrypt with a random nonce, emitting `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_SIZE], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = encrypt(key, &nonce, plaintext, aad)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a `nonce || ciphertext || tag` blob produced by [`seal`].
pub fn open(key: &[u8; KEY_SIZE], blob: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::MalformedCiphertext(format!(
            "blob of {} bytes is shorter than nonce + tag",
            blob.len()
        )));
    }

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&blob[..NONCE_SIZE]);
    decrypt(key, &nonce, &blob[NONCE_SIZE..], aad)
}

/// Seal without additional authenticated data.
pub fn seal_no_aad(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    seal(key, plaintext, &[])
}

/// Open without additional authenticated data.
pub fn open_no_aad(key: &[u8; KEY_SIZE], blob: &[u8]) -> Result<Vec<u8>> {
    open(key, blob, &[])
}
