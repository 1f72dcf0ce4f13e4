//! Onion response decoding.
//!
//! The guard returns the destination's response as a base64 blob, sealed
//! under the symmetric key of the innermost request layer. The decrypted
//! text is `{ status, headers, body }` where `body` is itself a
//! JSON-encoded string that must be parsed again to reach the application
//! payload.
//!
//! Decoding is a pure function of its inputs; any failure is fatal to the
//! attempt and never retried.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use sable_crypto::aes_gcm;
use sable_types::rpc::ParsedResponse;
use sable_types::SymmetricKeyBytes;

use crate::{Result, TransportError};

/// The decrypted wire envelope, before the inner body parse.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    status: u16,
    #[serde(default)]
    headers: serde_json::Map<String, serde_json::Value>,
    body: String,
}

/// Decrypt and parse an onion response body.
pub fn decode_onion_response(
    ciphertext_b64: &str,
    symmetric_key: &SymmetricKeyBytes,
) -> Result<ParsedResponse> {
    let blob = BASE64
        .decode(ciphertext_b64.trim())
        .map_err(|e| TransportError::MalformedResponse(format!("base64: {e}")))?;

    let plaintext = aes_gcm::open_no_aad(symmetric_key, &blob)
        .map_err(|e| TransportError::MalformedResponse(format!("decrypt: {e}")))?;

    let text = String::from_utf8(plaintext)
        .map_err(|_| TransportError::MalformedResponse("response is not UTF-8".to_string()))?;

    let envelope: WireEnvelope = serde_json::from_str(&text)
        .map_err(|e| TransportError::MalformedResponse(format!("envelope: {e}")))?;

    let body = serde_json::from_str(&envelope.body)
        .map_err(|e| TransportError::MalformedResponse(format!("inner body: {e}")))?;

    Ok(ParsedResponse {
        status: envelope.status,
        headers: envelope.headers,
        body,
    })
}
