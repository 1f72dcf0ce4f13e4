//! Single-hop relay proxying.
//!
//! Used only when onion routing is administratively disabled. The request
//! is sealed to one randomly chosen relay, which forwards it to the target
//! node named in the headers and returns the target's response sealed under
//! the same key. No layering; the relay sees who is asked for, but not the
//! request contents.
//!
//! ## Retry policy
//!
//! | Status | Meaning | Action |
//! |---|---|---|
//! | 200 | success | decrypt and return |
//! | 401 | relay deregistering | mark relay bad, rotate |
//! | 500/503 | relay or target fault | mark relay bad, rotate; sleep first on 500 |
//! | 504 | target unreachable via relay | fresh relay, bounded separately |
//! | other | unclassified | fail immediately |
//!
//! All rotation runs inside one bounded loop; exhausting either budget marks
//! the target itself unreachable in the pool.

use std::collections::HashSet;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{debug, info, warn};

use sable_crypto::x25519::{ephemeral_key_exchange, X25519PublicKey};
use sable_crypto::{aes_gcm, kdf};
use sable_onion::pool::NodePool;
use sable_types::network::ServiceNode;
use sable_types::rpc::ParsedResponse;
use sable_types::{Ed25519PublicKeyBytes, SymmetricKeyBytes};

use crate::config::TransportConfig;
use crate::http::HttpClient;
use crate::{Result, TransportError};

/// Header carrying the sender's ephemeral public key, hex.
pub const SENDER_KEY_HEADER: &str = "X-Sender-Public-Key";

/// Header naming the target node by Ed25519 identity, hex.
pub const TARGET_KEY_HEADER: &str = "X-Target-Snode-Key";

/// Send `payload` to `target` through one randomly chosen relay.
///
/// Relay faults rotate to a fresh relay up to `proxy_retry_limit` attempts;
/// repeated 504s stop earlier at `proxy_unreachable_limit`. Both exhaustion
/// paths mark the target unreachable in the pool and fail.
pub async fn send_via_proxy<H, P>(
    http: &H,
    pool: &P,
    config: &TransportConfig,
    target: &ServiceNode,
    payload: &[u8],
) -> Result<ParsedResponse>
where
    H: HttpClient + ?Sized,
    P: NodePool + ?Sized,
{
    let mut tried: HashSet<Ed25519PublicKeyBytes> = HashSet::new();
    let mut refreshed = false;
    let mut unreachable_hits = 0u32;

    for attempt in 1..=config.proxy_retry_limit {
        let relay = pick_relay(pool, target, &tried, &mut refreshed).await?;
        tried.insert(relay.ed25519_pk);

        let (ephemeral_pk, shared_secret) =
            ephemeral_key_exchange(&X25519PublicKey::from_bytes(relay.x25519_pk));
        let symmetric_key = kdf::derive_symmetric_key(shared_secret.as_bytes())?;
        let sealed = aes_gcm::seal_no_aad(&symmetric_key, payload)?;

        let headers = [
            (SENDER_KEY_HEADER, ephemeral_pk.to_hex()),
            (TARGET_KEY_HEADER, target.ed25519_hex()),
        ];

        debug!(attempt, relay = %relay.ed25519_hex(), "proxying request");

        let response = match http.post(&relay.proxy_url(), sealed, &headers).await {
            Ok(response) => response,
            Err(e) => {
                warn!(attempt, error = %e, "relay unreachable at the network level");
                pool.mark_node_unreachable(&relay).await;
                continue;
            }
        };

        match response.status {
            200 => return decode_proxy_response(&symmetric_key, &response.body),
            401 => {
                info!(relay = %relay.ed25519_hex(), "relay is deregistering, rotating");
                pool.mark_node_unreachable(&relay).await;
            }
            status @ (500 | 503) => {
                warn!(attempt, status, "relay-side fault, rotating");
                pool.mark_node_unreachable(&relay).await;
                if status == 500 {
                    tokio::time::sleep(Duration::from_millis(config.retry_backoff_ms)).await;
                }
            }
            504 => {
                unreachable_hits += 1;
                warn!(
                    attempt,
                    unreachable_hits, "target unreachable via this relay"
                );
                if unreachable_hits >= config.proxy_unreachable_limit {
                    pool.mark_destination_unreachable(&target.ed25519_hex()).await;
                    return Err(TransportError::DestinationUnreachable);
                }
            }
            status => return Err(TransportError::UnexpectedStatus { status }),
        }
    }

    pool.mark_destination_unreachable(&target.ed25519_hex()).await;
    Err(TransportError::ProxyRetriesExhausted {
        attempts: config.proxy_retry_limit,
    })
}

/// Choose a relay from the pool, excluding the target and relays already
/// tried this request. A depleted pool is refreshed once per request.
async fn pick_relay<P: NodePool + ?Sized>(
    pool: &P,
    target: &ServiceNode,
    tried: &HashSet<Ed25519PublicKeyBytes>,
    refreshed: &mut bool,
) -> Result<ServiceNode> {
    loop {
        let known = pool.random_pool().await;
        let candidates: Vec<ServiceNode> = known
            .iter()
            .filter(|n| n.ed25519_pk != target.ed25519_pk)
            .filter(|n| !tried.contains(&n.ed25519_pk))
            .cloned()
            .collect();

        if known.len() < 2 || candidates.is_empty() {
            if !*refreshed {
                *refreshed = true;
                debug!("relay pool depleted, refreshing once");
                pool.refresh_pool().await?;
                continue;
            }
            return Err(TransportError::InsufficientRelays);
        }

        if let Some(choice) = candidates.choose(&mut rand::thread_rng()) {
            return Ok(choice.clone());
        }
    }
}

/// The decrypted proxy envelope; unlike the onion wire format the body is a
/// plain JSON value, not a doubly encoded string.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    status: u16,
    #[serde(default)]
    headers: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    body: serde_json::Value,
}

fn decode_proxy_response(key: &SymmetricKeyBytes, body: &[u8]) -> Result<ParsedResponse> {
    let text = std::str::from_utf8(body)
        .map_err(|_| TransportError::MalformedResponse("proxy body is not UTF-8".to_string()))?;

    let blob = BASE64
        .decode(text.trim())
        .map_err(|e| TransportError::MalformedResponse(format!("proxy base64: {e}")))?;

    let plaintext = aes_gcm::open_no_aad(key, &blob)
        .map_err(|e| TransportError::MalformedResponse(format!("proxy decrypt: {e}")))?;

    let envelope: ProxyEnvelope = serde_json::from_slice(&plaintext)
        .map_err(|e| TransportError::MalformedResponse(format!("proxy envelope: {e}")))?;

    Ok(ParsedResponse {
        status: envelope.status,
        headers: envelope.headers,
        body: envelope.body,
    })
}
