//! Decoded pseudo-HTTP response types.

use serde::{Deserialize, Serialize};

/// A fully decoded response from the destination.
///
/// Produced by the response decoder after AEAD decryption: the wire carries
/// `{ status, headers, body: "<json string>" }` and `body` here is the
/// result of parsing that inner JSON string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// Pseudo-HTTP status reported by the destination.
    pub status: u16,
    /// Response headers as reported by the destination.
    #[serde(default)]
    pub headers: serde_json::Map<String, serde_json::Value>,
    /// Application payload.
    pub body: serde_json::Value,
}

impl ParsedResponse {
    /// Whether the destination reported success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_success() {
        let ok = ParsedResponse {
            status: 200,
            headers: serde_json::Map::new(),
            body: json!({"foo": 1}),
        };
        assert!(ok.is_success());

        let not_found = ParsedResponse {
            status: 404,
            ..ok.clone()
        };
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_serde_roundtrip() {
        let resp = ParsedResponse {
            status: 200,
            headers: serde_json::Map::new(),
            body: json!({"messages": []}),
        };
        let json = serde_json::to_string(&resp).expect("serialize");
        let parsed: ParsedResponse = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, resp);
    }
}
