//! Service node descriptors.

use serde::{Deserialize, Serialize};

use crate::{Ed25519PublicKeyBytes, X25519PublicKeyBytes, ONION_ENDPOINT, PROXY_ENDPOINT};

/// One relay in the service-node network.
///
/// A node is addressed by its Ed25519 identity key and encrypted to with its
/// X25519 key. Descriptors are supplied by the node pool and are read-only
/// to the transport core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    /// IPv4/IPv6 address, as published in the pool.
    pub ip: String,
    /// HTTPS port.
    pub port: u16,
    /// Encryption key (X25519).
    pub x25519_pk: X25519PublicKeyBytes,
    /// Identity key (Ed25519).
    pub ed25519_pk: Ed25519PublicKeyBytes,
}

impl ServiceNode {
    /// Hex encoding of the node's Ed25519 identity key.
    pub fn ed25519_hex(&self) -> String {
        hex::encode(self.ed25519_pk)
    }

    /// Hex encoding of the node's X25519 encryption key.
    pub fn x25519_hex(&self) -> String {
        hex::encode(self.x25519_pk)
    }

    /// HTTPS URL for an arbitrary endpoint path on this node.
    pub fn https_url(&self, path: &str) -> String {
        format!("https://{}:{}{}", self.ip, self.port, path)
    }

    /// URL of this node's onion-request endpoint.
    pub fn onion_url(&self) -> String {
        self.https_url(ONION_ENDPOINT)
    }

    /// URL of this node's proxy endpoint.
    pub fn proxy_url(&self) -> String {
        self.https_url(PROXY_ENDPOINT)
    }
}
