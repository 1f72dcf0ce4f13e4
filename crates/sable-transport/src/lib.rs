//! # sable-transport
//!
//! Client-side request transports for the Sable network.
//!
//! Three ways to reach a destination, selected by [`config::TransportMode`]:
//!
//! ```text
//! Application payload (opaque JSON bytes)
//!     |
//!     v
//! Dispatcher (dispatcher.rs)   -- mode selection + bounded path retry
//!     |
//!     +-- onion  -> layered encryption -> POST /onion_req on the guard
//!     |             (onion.rs, decode.rs)
//!     +-- proxy  -> single-hop relay    -> POST /proxy with key headers
//!     |             (proxy.rs)
//!     +-- direct -> plain HTTPS call    -> typed bootstrap errors
//!                   (direct.rs)
//!     |
//!     v
//! HttpClient (http.rs)         -- reqwest POST, relaxed TLS verification
//! ```
//!
//! Every request attempt is independent: fresh ephemeral keys, a fresh path,
//! no persistent circuits and no shared mutable state. The node pool is an
//! external collaborator reached through [`sable_onion::pool::NodePool`].

pub mod config;
pub mod decode;
pub mod direct;
pub mod dispatcher;
pub mod http;
pub mod onion;
pub mod proxy;

use sable_types::network::ServiceNode;

/// Error types for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Cryptographic failure; fatal to the attempt, never retried.
    #[error("crypto error: {0}")]
    Crypto(#[from] sable_crypto::CryptoError),

    /// Path or layering failure from the onion crate.
    #[error("onion error: {0}")]
    Onion(#[from] sable_onion::OnionError),

    /// Network-level failure (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be decrypted or parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A status code outside every classification table.
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// The onion request failed in a way no new path can fix.
    #[error("onion request failed")]
    RequestFailed,

    /// Every permitted path attempt was consumed.
    #[error("path attempts exhausted after {attempts} tries")]
    PathAttemptsExhausted { attempts: u32 },

    /// Every permitted proxy retry was consumed.
    #[error("proxy retries exhausted after {attempts} tries")]
    ProxyRetriesExhausted { attempts: u32 },

    /// The destination could not be reached through any relay.
    #[error("destination unreachable")]
    DestinationUnreachable,

    /// Not enough relays to proxy through, even after a pool refresh.
    #[error("insufficient relays for proxying")]
    InsufficientRelays,

    /// Direct call: our clock is too far from the network's (status 406).
    #[error("clock out of sync with network")]
    ClockOutOfSync,

    /// Direct call: wrong shard for this destination (status 421); carries
    /// the replacement shard reported by the server.
    #[error("wrong shard for destination ({} replacement nodes)", nodes.len())]
    WrongShard {
        /// Replacement nodes parsed from the response body.
        nodes: Vec<ServiceNode>,
    },

    /// Direct call: proof of work required (status 432).
    #[error("proof of work required (difficulty {difficulty})")]
    ProofOfWorkRequired {
        /// Server-demanded difficulty.
        difficulty: u32,
    },

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
pub(crate) mod testing;
