//! Layered-encryption request construction.
//!
//! A request is wrapped once per hop, innermost first:
//!
//! ```text
//! ciphertext_dest            = Enc(dest_x25519,   { body })
//! ciphertext_n               = Enc(hop_n_x25519,  { destination: dest, ciphertext_dest })
//! ...
//! ciphertext_guard           = Enc(hop_1_x25519,  { destination: hop_2, ciphertext_2 })
//! ```
//!
//! Only the innermost plaintext names the real request; each relay, on
//! peeling its layer, learns the next hop's identity and nothing else. The
//! wrapping runs as an explicit loop so arbitrarily long paths cost no call
//! stack.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sable_crypto::ecies::{self, EncryptionContext};
use sable_crypto::x25519::X25519PublicKey;
use sable_types::SymmetricKeyBytes;

use crate::destination::Destination;
use crate::path::OnionPath;
use crate::{OnionError, Result};

/// The wire object POSTed to the guard node's onion endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardPayload {
    /// Outermost sealed layer, base64.
    pub ciphertext: String,
    /// Ephemeral public key for the guard's layer, hex.
    pub ephemeral_key: String,
}

/// One relay's routing wrapper, carried encrypted inside its layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopWrapper {
    /// The previous (inner) layer's sealed blob, base64.
    pub ciphertext: String,
    /// The previous layer's ephemeral public key, hex.
    pub ephemeral_key: String,
    /// Who this relay forwards to.
    #[serde(flatten)]
    pub next: NextHop,
}

/// The forwarding instruction inside a relay wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextHop {
    /// Forward to another node on the network, by Ed25519 identity hex.
    Node {
        /// Next hop's identity key, hex.
        destination: String,
    },
    /// Perform a terminal HTTP request.
    Server {
        /// Host to contact.
        host: String,
        /// Request path.
        target: String,
        /// HTTP method.
        method: String,
    },
}

/// The innermost plaintext, readable only by the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPayload {
    /// Application request body, JSON text.
    pub body: String,
}

/// A fully built onion request.
///
/// `destination_key` is the symmetric key of the innermost layer; it is the
/// only key that can decrypt the destination's response, and no intermediate
/// hop can derive it.
pub struct OnionRequest {
    /// Wire payload for the guard node.
    pub guard_payload: GuardPayload,
    /// Retained key for decoding the response.
    pub destination_key: SymmetricKeyBytes,
}

/// Wrap `payload` once per hop of `path`, terminating at `destination`.
///
/// The payload is carried as JSON text inside the innermost layer and must
/// be valid UTF-8.
pub fn build_onion_request(
    path: &OnionPath,
    destination: &Destination,
    payload: &[u8],
) -> Result<OnionRequest> {
    let body = std::str::from_utf8(payload)
        .map_err(|_| OnionError::NonUtf8Payload)?
        .to_string();

    // Innermost layer: the only plaintext that names the real request.
    let inner = DestinationPayload { body };
    let mut ctx = encrypt_layer(&destination.encryption_key(), &inner)?;
    let destination_key = ctx.symmetric_key;

    // Wrap outward, from the relay nearest the destination back to the guard.
    let hops = path.hops();
    for (idx, relay) in hops.iter().enumerate().rev() {
        let next = if idx == hops.len() - 1 {
            next_hop_for_destination(destination)
        } else {
            NextHop::Node {
                destination: hops[idx + 1].ed25519_hex(),
            }
        };

        let wrapper = HopWrapper {
            ciphertext: BASE64.encode(&ctx.ciphertext),
            ephemeral_key: ctx.ephemeral_pk.to_hex(),
            next,
        };
        ctx = encrypt_layer(&X25519PublicKey::from_bytes(relay.x25519_pk), &wrapper)?;
    }

    debug!(layers = hops.len() + 1, "built onion request");

    Ok(OnionRequest {
        guard_payload: GuardPayload {
            ciphertext: BASE64.encode(&ctx.ciphertext),
            ephemeral_key: ctx.ephemeral_pk.to_hex(),
        },
        destination_key,
    })
}

fn encrypt_layer<T: Serialize>(
    recipient: &X25519PublicKey,
    plaintext: &T,
) -> Result<EncryptionContext> {
    let bytes = serde_json::to_vec(plaintext)?;
    Ok(ecies::encrypt_for_pubkey(recipient, &bytes)?)
}

fn next_hop_for_destination(destination: &Destination) -> NextHop {
    match destination {
        Destination::Node { ed25519_pk, .. } => NextHop::Node {
            destination: hex::encode(ed25519_pk),
        },
        Destination::Server {
            host,
            target,
            method,
            ..
        } => NextHop::Server {
            host: host.clone(),
            target: target.clone(),
            method: method.clone(),
        },
    }
}
