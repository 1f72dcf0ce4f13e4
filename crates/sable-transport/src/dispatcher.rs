//! Request dispatch: mode selection and bounded path retry.

use tracing::{debug, warn};

use sable_onion::destination::Destination;
use sable_onion::pool::NodePool;
use sable_types::network::ServiceNode;
use sable_types::rpc::ParsedResponse;
use sable_types::{Ed25519PublicKeyBytes, RPC_ENDPOINT};

use crate::config::{TransportConfig, TransportMode};
use crate::http::HttpClient;
use crate::onion::{send_onion_request, AttemptResult};
use crate::{direct, proxy, Result, TransportError};

/// Routes requests over the configured transport.
///
/// In onion mode, a `BadPath` outcome marks the path bad in the pool and
/// retries with a fresh path, up to `max_path_attempts`; exhausting the
/// budget is a hard failure. Proxy and direct results are terminal, with
/// the proxy applying its own internal retry policy.
pub struct Dispatcher<H, P> {
    http: H,
    pool: P,
    config: TransportConfig,
}

impl<H, P> Dispatcher<H, P>
where
    H: HttpClient,
    P: NodePool,
{
    /// Create a dispatcher over an HTTP client and a node pool.
    pub fn new(http: H, pool: P, config: TransportConfig) -> Self {
        Self { http, pool, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send `payload` to a service node over the configured transport.
    pub async fn dispatch(&self, target: &ServiceNode, payload: &[u8]) -> Result<ParsedResponse> {
        match self.config.mode {
            TransportMode::Onion => {
                let destination = Destination::Node {
                    ed25519_pk: target.ed25519_pk,
                    x25519_pk: target.x25519_pk,
                };
                self.send_over_paths(&destination, Some(&target.ed25519_pk), payload)
                    .await
            }
            TransportMode::Proxy => {
                proxy::send_via_proxy(&self.http, &self.pool, &self.config, target, payload).await
            }
            TransportMode::Direct => {
                direct::send_direct(&self.http, &target.https_url(RPC_ENDPOINT), payload).await
            }
        }
    }

    /// Send `payload` to a terminal server destination.
    ///
    /// Server destinations are reachable only through onion routing,
    /// regardless of the configured mode.
    pub async fn dispatch_to_server(
        &self,
        destination: &Destination,
        payload: &[u8],
    ) -> Result<ParsedResponse> {
        self.send_over_paths(destination, None, payload).await
    }

    /// The onion retry loop: fresh path per attempt, bounded attempt count.
    async fn send_over_paths(
        &self,
        destination: &Destination,
        excluding: Option<&Ed25519PublicKeyBytes>,
        payload: &[u8],
    ) -> Result<ParsedResponse> {
        let max_attempts = self.config.max_path_attempts.max(1);

        for attempt in 1..=max_attempts {
            let path = self.pool.onion_path(excluding).await?;
            debug!(attempt, hops = path.len(), "sending onion request");

            match send_onion_request(&self.http, &path, destination, payload).await {
                AttemptResult::Success(parsed) => {
                    debug!(attempt, status = parsed.status, "onion request succeeded");
                    return Ok(parsed);
                }
                AttemptResult::BadPath => {
                    warn!(attempt, "path is unusable, marking bad");
                    self.pool.mark_path_bad(&path).await;
                }
                AttemptResult::HardFailure => return Err(TransportError::RequestFailed),
            }
        }

        warn!(max_attempts, "all path attempts consumed");
        Err(TransportError::PathAttemptsExhausted {
            attempts: max_attempts,
        })
    }
}
