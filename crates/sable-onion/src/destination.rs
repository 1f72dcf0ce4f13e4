//! Request destinations.

use sable_crypto::x25519::X25519PublicKey;
use sable_types::{Ed25519PublicKeyBytes, X25519PublicKeyBytes};

/// Where an onion-routed request terminates.
///
/// Two shapes, each carrying only the fields it needs. The X25519 key is the
/// innermost encryption key in both cases; only the holder of the matching
/// secret can read the request body or produce a readable response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// A service node on the network, addressed by its Ed25519 identity.
    Node {
        /// Identity key; the last relay forwards to this node.
        ed25519_pk: Ed25519PublicKeyBytes,
        /// Encryption key for the innermost layer.
        x25519_pk: X25519PublicKeyBytes,
    },
    /// A terminal HTTP target reached through the last relay.
    Server {
        /// Host name the last relay will contact.
        host: String,
        /// Request path on that host.
        target: String,
        /// HTTP method.
        method: String,
        /// The server's published encryption key for the innermost layer.
        x25519_pk: X25519PublicKeyBytes,
    },
}

impl Destination {
    /// The X25519 key the innermost layer is encrypted to.
    pub fn encryption_key(&self) -> X25519PublicKey {
        match self {
            Destination::Node { x25519_pk, .. } | Destination::Server { x25519_pk, .. } => {
                X25519PublicKey::from_bytes(*x25519_pk)
            }
        }
    }

    /// Hex identity of a node destination, if this is one.
    pub fn ed25519_hex(&self) -> Option<String> {
        match self {
            Destination::Node { ed25519_pk, .. } => Some(hex::encode(ed25519_pk)),
            Destination::Server { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_destination_identity() {
        let dest = Destination::Node {
            ed25519_pk: [7u8; 32],
            x25519_pk: [8u8; 32],
        };
        assert_eq!(dest.ed25519_hex(), Some("07".repeat(32)));
        assert_eq!(dest.encryption_key().to_bytes(), [8u8; 32]);
    }

    #[test]
    fn test_server_destination_has_no_identity() {
        let dest = Destination::Server {
            host: "files.example.org".to_string(),
            target: "/rooms/main".to_string(),
            method: "POST".to_string(),
            x25519_pk: [9u8; 32],
        };
        assert_eq!(dest.ed25519_hex(), None);
        assert_eq!(dest.encryption_key().to_bytes(), [9u8; 32]);
    }
}
