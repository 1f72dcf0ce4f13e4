//! # sable-onion
//!
//! Onion path model and layered request construction for the Sable network.
//!
//! - [`path`] — Single-use onion paths over service nodes
//! - [`destination`] — The two destination shapes a request can target
//! - [`pool`] — The external node-pool collaborator interface
//! - [`layers`] — The layered-encryption request builder
//!
//! Paths are supplied per-request by the node pool and consumed by one
//! attempt; nothing in this crate holds long-lived state.

pub mod destination;
pub mod layers;
pub mod path;
pub mod pool;

/// Default number of hops in an onion path.
pub const DEFAULT_PATH_HOPS: usize = 3;

/// Error types for onion path and layer operations.
#[derive(Debug, thiserror::Error)]
pub enum OnionError {
    /// A path must contain at least one hop.
    #[error("onion path is empty")]
    EmptyPath,

    /// Not enough usable nodes to assemble a path.
    #[error("insufficient nodes: need {need}, have {have}")]
    InsufficientNodes { need: usize, have: usize },

    /// Request payloads are carried as JSON text and must be valid UTF-8.
    #[error("payload is not valid UTF-8")]
    NonUtf8Payload,

    /// Wrapper object serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cryptographic failure while building a layer.
    #[error("crypto error: {0}")]
    Crypto(#[from] sable_crypto::CryptoError),
}

/// Convenience result type for onion operations.
pub type Result<T> = std::result::Result<T, OnionError>;
