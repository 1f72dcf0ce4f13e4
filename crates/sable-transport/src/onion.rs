//! Onion request transmission and status classification.

use tracing::{debug, warn};

use sable_onion::destination::Destination;
use sable_onion::layers::build_onion_request;
use sable_onion::path::OnionPath;
use sable_types::rpc::ParsedResponse;

use crate::decode::decode_onion_response;
use crate::http::{HttpClient, JSON_CONTENT_TYPE};

/// Outcome of one onion attempt over one path.
#[derive(Debug)]
pub enum AttemptResult {
    /// The destination answered and the response decoded.
    Success(ParsedResponse),
    /// This path is unusable right now; a fresh path may succeed.
    BadPath,
    /// Failure no new path can fix; surface to the caller.
    HardFailure,
}

/// How a guard-node status code is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// Proceed to response decoding.
    Success,
    /// One or more hops are unreachable, overloaded, or desynchronized.
    BadPath,
    /// Not path-related; do not retry with a new path.
    HardFailure,
}

/// Classify a guard-node HTTP status.
///
/// 503/504 are hop overload/unreachability and 404 is a desynchronized
/// relay; all three mean "this path, not this request, has failed".
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        404 | 503 | 504 => StatusClass::BadPath,
        _ => StatusClass::HardFailure,
    }
}

/// Send one onion-wrapped request over `path` and classify the outcome.
///
/// Builds the layered payload, POSTs it to the guard's onion endpoint, and
/// on 200 decodes the response with the retained destination-layer key.
pub async fn send_onion_request<H: HttpClient + ?Sized>(
    http: &H,
    path: &OnionPath,
    destination: &Destination,
    payload: &[u8],
) -> AttemptResult {
    let request = match build_onion_request(path, destination, payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "failed to build onion request");
            return AttemptResult::HardFailure;
        }
    };

    let body = match serde_json::to_vec(&request.guard_payload) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to serialize guard payload");
            return AttemptResult::HardFailure;
        }
    };

    let url = path.guard().onion_url();
    let headers = [(JSON_CONTENT_TYPE.0, JSON_CONTENT_TYPE.1.to_string())];
    let response = match http.post(&url, body, &headers).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, url, "onion request failed at the network level");
            return AttemptResult::HardFailure;
        }
    };

    match classify_status(response.status) {
        StatusClass::Success => {
            let ciphertext = match String::from_utf8(response.body) {
                Ok(text) => text,
                Err(_) => {
                    warn!("guard returned a non-UTF-8 response body");
                    return AttemptResult::HardFailure;
                }
            };
            match decode_onion_response(&ciphertext, &request.destination_key) {
                Ok(parsed) => {
                    debug!(status = parsed.status, "onion response decoded");
                    AttemptResult::Success(parsed)
                }
                Err(e) => {
                    warn!(error = %e, "onion response failed to decode");
                    AttemptResult::HardFailure
                }
            }
        }
        StatusClass::BadPath => {
            debug!(status = response.status, "path rejected the request");
            AttemptResult::BadPath
        }
        StatusClass::HardFailure => {
            warn!(status = response.status, "unclassified guard status");
            AttemptResult::HardFailure
        }
    }
}
