//! Symmetric key derivation.
//!
//! Every pairwise exchange derives its AES-256 key as
//! `HMAC-SHA256(key = "LOKI", message = shared_secret)`. The fixed salt is a
//! wire-compatibility constant shared with every node on the network.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{CryptoError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Fixed HMAC salt used by all nodes on the network.
pub const KDF_SALT: &[u8] = b"LOKI";

/// Derived symmetric key size (256 bits).
pub const DERIVED_KEY_SIZE: usize = 32;

/// Derive a 32-byte symmetric key from an X25519 shared secret.
pub fn derive_symmetric_key(shared_secret: &[u8; 32]) -> Result<[u8; DERIVED_KEY_SIZE]> {
    let mut mac = HmacSha256::new_from_slice(KDF_SALT)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    mac.update(shared_secret);
    Ok(mac.finalize().into_bytes().into())
}
