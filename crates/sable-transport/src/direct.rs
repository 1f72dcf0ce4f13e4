//! Plain unrouted HTTPS calls.
//!
//! Only used for unauthenticated bootstrap RPC, before any path exists.
//! Nothing is encrypted at this layer; the interesting part is translating
//! the bootstrap status codes into typed errors the caller can act on:
//!
//! - 406 — our clock is too far from the network's
//! - 421 — wrong shard; the body carries the replacement node list
//! - 432 — proof of work required; the body carries the difficulty
//!
//! None of these are retried here.

use serde::Deserialize;
use tracing::{debug, warn};

use sable_types::network::ServiceNode;
use sable_types::rpc::ParsedResponse;

use crate::http::{HttpClient, JSON_CONTENT_TYPE};
use crate::{Result, TransportError};

/// Wire shape of one node in a 421 shard response.
#[derive(Debug, Deserialize)]
struct WireNode {
    ip: String,
    port: u16,
    pubkey_x25519: String,
    pubkey_ed25519: String,
}

#[derive(Debug, Default, Deserialize)]
struct ShardBody {
    #[serde(default)]
    snodes: Vec<WireNode>,
}

#[derive(Debug, Default, Deserialize)]
struct PowBody {
    #[serde(default)]
    difficulty: u32,
}

/// POST `payload` directly to `url` with no encryption layer.
pub async fn send_direct<H: HttpClient + ?Sized>(
    http: &H,
    url: &str,
    payload: &[u8],
) -> Result<ParsedResponse> {
    let headers = [(JSON_CONTENT_TYPE.0, JSON_CONTENT_TYPE.1.to_string())];
    let response = http.post(url, payload.to_vec(), &headers).await?;

    match response.status {
        200 => {
            let body = serde_json::from_slice(&response.body)
                .map_err(|e| TransportError::MalformedResponse(format!("direct body: {e}")))?;
            debug!(url, "direct request succeeded");
            Ok(ParsedResponse {
                status: 200,
                headers: serde_json::Map::new(),
                body,
            })
        }
        406 => Err(TransportError::ClockOutOfSync),
        421 => {
            let shard: ShardBody = serde_json::from_slice(&response.body).unwrap_or_default();
            let nodes = shard.snodes.iter().filter_map(parse_wire_node).collect();
            Err(TransportError::WrongShard { nodes })
        }
        432 => {
            let pow: PowBody = serde_json::from_slice(&response.body).unwrap_or_default();
            Err(TransportError::ProofOfWorkRequired {
                difficulty: pow.difficulty,
            })
        }
        status => Err(TransportError::UnexpectedStatus { status }),
    }
}

fn parse_wire_node(wire: &WireNode) -> Option<ServiceNode> {
    let x25519_pk = decode_key(&wire.pubkey_x25519)?;
    let ed25519_pk = decode_key(&wire.pubkey_ed25519)?;
    Some(ServiceNode {
        ip: wire.ip.clone(),
        port: wire.port,
        x25519_pk,
        ed25519_pk,
    })
}

fn decode_key(s: &str) -> Option<[u8; 32]> {
    let decoded = hex::decode(s).ok()?;
    match decoded.try_into() {
        Ok(key) => Some(key),
        Err(_) => {
            warn!("shard node key has wrong length, skipping entry");
            None
        }
    }
}
