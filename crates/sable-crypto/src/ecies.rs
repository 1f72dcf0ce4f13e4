//! One-shot pairwise encryption to a recipient's X25519 public key.
//!
//! ## Algorithm
//!
//! ```text
//! encrypt_for_pubkey(recipient_pk, plaintext):
//!   1. (eph_pk, shared_secret) = ephemeral X25519 exchange with recipient_pk
//!   2. key = HMAC-SHA256("LOKI", shared_secret)
//!   3. blob = AES-256-GCM.Seal(key, plaintext, aad = eph_pk)
//!   4. return { ciphertext: blob, symmetric_key: key, ephemeral_pk: eph_pk }
//! ```
//!
//! The returned symmetric key is what the recipient will also derive from
//! `DH(recipient_sk, eph_pk)`; the sender retains the innermost layer's key
//! to decrypt the eventual response. Ephemeral keys are single-use and never
//! persisted.

use zeroize::ZeroizeOnDrop;

use crate::x25519::{ephemeral_key_exchange, X25519PublicKey, X25519StaticSecret};
use crate::{aes_gcm, kdf, Result};

/// The output of one pairwise encryption step.
///
/// Consumed exactly once: either wrapped by the next (outer) onion layer or
/// transmitted as the guard payload.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionContext {
    /// Sealed blob (`nonce || ciphertext || tag`).
    #[zeroize(skip)]
    pub ciphertext: Vec<u8>,
    /// Derived symmetric key, shared with the recipient.
    pub symmetric_key: [u8; kdf::DERIVED_KEY_SIZE],
    /// Ephemeral public key the recipient needs to derive the same key.
    #[zeroize(skip)]
    pub ephemeral_pk: X25519PublicKey,
}

/// Encrypt a plaintext to a recipient's X25519 public key.
pub fn encrypt_for_pubkey(
    recipient_pk: &X25519PublicKey,
    plaintext: &[u8],
) -> Result<EncryptionContext> {
    let (ephemeral_pk, shared_secret) = ephemeral_key_exchange(recipient_pk);
    let symmetric_key = kdf::derive_symmetric_key(shared_secret.as_bytes())?;
    let ciphertext = aes_gcm::seal(&symmetric_key, plaintext, ephemeral_pk.as_bytes())?;

    Ok(EncryptionContext {
        ciphertext,
        symmetric_key,
        ephemeral_pk,
    })
}

/// Derive the symmetric key a recipient shares with the sender of a context.
pub fn derive_recipient_key(
    recipient_sk: &X25519StaticSecret,
    ephemeral_pk: &X25519PublicKey,
) -> Result<[u8; kdf::DERIVED_KEY_SIZE]> {
    let shared_secret = recipient_sk.diffie_hellman(ephemeral_pk);
    kdf::derive_symmetric_key(shared_secret.as_bytes())
}

/// Recipient-side decryption of a sealed pairwise blob.
pub fn decrypt(
    recipient_sk: &X25519StaticSecret,
    ephemeral_pk: &X25519PublicKey,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let key = derive_recipient_key(recipient_sk, ephemeral_pk)?;
    decrypt_with_key(&key, ephemeral_pk, ciphertext)
}

/// Decrypt a sealed pairwise blob with an already-derived symmetric key.
pub fn decrypt_with_key(
    key: &[u8; kdf::DERIVED_KEY_SIZE],
    ephemeral_pk: &X25519PublicKey,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    aes_gcm::open(key, ciphertext, ephemeral_pk.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let recipient_sk = X25519StaticSecret::random();
        let recipient_pk = recipient_sk.public_key();

        let ctx = encrypt_for_pubkey(&recipient_pk, b"layer payload").expect("encrypt");
        let plaintext = decrypt(&recipient_sk, &ctx.ephemeral_pk, &ctx.ciphertext).expect("decrypt");

        assert_eq!(plaintext, b"layer payload");
    }

    #[test]
    fn test_recipient_derives_same_key() {
        let recipient_sk = X25519StaticSecret::random();
        let recipient_pk = recipient_sk.public_key();

        let ctx = encrypt_for_pubkey(&recipient_pk, b"x").expect("encrypt");
        let recipient_key =
            derive_recipient_key(&recipient_sk, &ctx.ephemeral_pk).expect("derive");

        assert_eq!(recipient_key, ctx.symmetric_key);
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let recipient_sk = X25519StaticSecret::random();
        let other_sk = X25519StaticSecret::random();
        let recipient_pk = recipient_sk.public_key();

        let ctx = encrypt_for_pubkey(&recipient_pk, b"secret").expect("encrypt");
        assert!(decrypt(&other_sk, &ctx.ephemeral_pk, &ctx.ciphertext).is_err());
    }

    #[test]
    fn test_ciphertext_bound_to_ephemeral_key() {
        let recipient_sk = X25519StaticSecret::random();
        let recipient_pk = recipient_sk.public_key();

        let ctx = encrypt_for_pubkey(&recipient_pk, b"secret").expect("encrypt");

        // Swapping in a different ephemeral key must break the AAD binding
        // even if the symmetric key were somehow known.
        let other_pk = X25519StaticSecret::random().public_key();
        assert!(decrypt_with_key(&ctx.symmetric_key, &other_pk, &ctx.ciphertext).is_err());
    }

    #[test]
    fn test_fresh_ephemeral_per_call() {
        let recipient_pk = X25519StaticSecret::random().public_key();

        let ctx1 = encrypt_for_pubkey(&recipient_pk, b"same").expect("encrypt");
        let ctx2 = encrypt_for_pubkey(&recipient_pk, b"same").expect("encrypt");

        assert_ne!(ctx1.ephemeral_pk, ctx2.ephemeral_pk);
        assert_ne!(ctx1.symmetric_key, ctx2.symmetric_key);
    }
}
