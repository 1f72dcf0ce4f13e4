//! Raw HTTP POST seam.
//!
//! All three transports go through [`HttpClient`], so retry and
//! classification logic can be exercised without sockets. The production
//! implementation is a thin [`reqwest`] wrapper.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Result, TransportError};

/// JSON content-type header pair.
pub const JSON_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// A raw HTTP response: status plus body bytes, nothing interpreted.
#[derive(Clone, Debug)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// One-shot HTTP POST.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` to `url` with the given headers.
    ///
    /// Returns the response for *any* status code; only connect, TLS, and
    /// timeout failures are errors.
    async fn post(&self, url: &str, body: Vec<u8>, headers: &[(&str, String)])
        -> Result<WireResponse>;
}

/// Production HTTP client.
///
/// Certificate validation is relaxed: node identity is pinned by the
/// onion-layer keys, not by the TLS certificate, and nodes serve self-signed
/// certificates.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client with the given per-request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(&str, String)],
    ) -> Result<WireResponse> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?
            .to_vec();

        Ok(WireResponse { status, body })
    }
}
