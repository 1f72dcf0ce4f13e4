//! Shared test support: scripted HTTP clients and network fixtures.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::http::{HttpClient, WireResponse};
use crate::{Result, TransportError};

/// A recorded HTTP call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub url: String,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

enum Script {
    /// Always respond with the same status/body.
    Always(WireResponse),
    /// Every call fails at the network level.
    NetworkErrors,
}

/// Scripted [`HttpClient`] that records every call.
pub struct MockHttp {
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockHttp {
    /// Respond to every call with the same status and body.
    pub fn always(status: u16, body: &[u8]) -> Self {
        Self {
            script: Mutex::new(Script::Always(WireResponse {
                status,
                body: body.to_vec(),
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call at the network level.
    pub fn network_errors() -> Self {
        Self {
            script: Mutex::new(Script::NetworkErrors),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &[(&str, String)],
    ) -> Result<WireResponse> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                url: url.to_string(),
                body,
                headers: headers
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            });

        let script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        match &*script {
            Script::Always(response) => Ok(response.clone()),
            Script::NetworkErrors => {
                Err(TransportError::Network("scripted failure".to_string()))
            }
        }
    }
}

/// Onion-network fixtures.
pub mod fixtures {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use sable_crypto::ecies;
    use sable_crypto::x25519::{X25519PublicKey, X25519StaticSecret};
    use sable_onion::destination::Destination;
    use sable_onion::layers::{GuardPayload, HopWrapper};
    use sable_onion::path::OnionPath;
    use sable_types::network::ServiceNode;

    use super::*;
    use crate::http::{HttpClient, WireResponse};

    /// A service node with a real X25519 keypair.
    pub fn make_keyed_node(id: u8) -> (ServiceNode, X25519StaticSecret) {
        let secret = X25519StaticSecret::random();
        let node = ServiceNode {
            ip: format!("10.0.0.{id}"),
            port: 22021,
            x25519_pk: secret.public_key().to_bytes(),
            ed25519_pk: [id; 32],
        };
        (node, secret)
    }

    /// A path of `hops` nodes with real keypairs, ids 1..=hops.
    pub fn make_path(hops: u8) -> (OnionPath, Vec<X25519StaticSecret>) {
        let (nodes, secrets): (Vec<_>, Vec<_>) = (1..=hops).map(make_keyed_node).unzip();
        (OnionPath::new(nodes).expect("non-empty path"), secrets)
    }

    /// A node destination with a real keypair.
    pub fn make_node_destination(id: u8) -> (Destination, X25519StaticSecret) {
        let secret = X25519StaticSecret::random();
        let destination = Destination::Node {
            ed25519_pk: [id; 32],
            x25519_pk: secret.public_key().to_bytes(),
        };
        (destination, secret)
    }

    /// A guard that peels every onion layer with the hop secrets, then
    /// answers with `{ status, headers, body }` sealed under the key derived
    /// for the destination layer — the closest thing to a real network
    /// without sockets.
    pub struct PeelingGuard {
        hop_secrets: Vec<X25519StaticSecret>,
        destination_secret: X25519StaticSecret,
        response_status: u16,
        response_body: serde_json::Value,
    }

    impl PeelingGuard {
        pub fn new(
            hop_secrets: Vec<X25519StaticSecret>,
            destination_secret: X25519StaticSecret,
            response_status: u16,
            response_body: serde_json::Value,
        ) -> Self {
            Self {
                hop_secrets,
                destination_secret,
                response_status,
                response_body,
            }
        }

        fn answer(&self, request_body: &[u8]) -> WireResponse {
            let guard_payload: GuardPayload =
                serde_json::from_slice(request_body).expect("guard payload json");

            let mut ciphertext = BASE64
                .decode(&guard_payload.ciphertext)
                .expect("guard ciphertext base64");
            let mut ephemeral =
                X25519PublicKey::from_hex(&guard_payload.ephemeral_key).expect("guard key hex");

            // Peel one layer per hop. Paths may order hops arbitrarily, so
            // each layer is tried against every known hop secret.
            for _ in 0..self.hop_secrets.len() {
                let plaintext = self
                    .hop_secrets
                    .iter()
                    .find_map(|secret| ecies::decrypt(secret, &ephemeral, &ciphertext).ok())
                    .expect("some hop secret peels this layer");
                let wrapper: HopWrapper =
                    serde_json::from_slice(&plaintext).expect("hop wrapper json");
                ciphertext = BASE64.decode(&wrapper.ciphertext).expect("inner base64");
                ephemeral =
                    X25519PublicKey::from_hex(&wrapper.ephemeral_key).expect("inner key hex");
            }

            // The destination decrypts the innermost layer and seals its
            // response under the same derived key.
            let response_key = ecies::derive_recipient_key(&self.destination_secret, &ephemeral)
                .expect("derive response key");
            ecies::decrypt_with_key(&response_key, &ephemeral, &ciphertext)
                .expect("innermost layer");

            let envelope = serde_json::json!({
                "status": self.response_status,
                "headers": {},
                "body": self.response_body.to_string(),
            });
            let sealed = sable_crypto::aes_gcm::seal_no_aad(
                &response_key,
                envelope.to_string().as_bytes(),
            )
            .expect("seal response");

            WireResponse {
                status: 200,
                body: BASE64.encode(sealed).into_bytes(),
            }
        }
    }

    #[async_trait]
    impl HttpClient for PeelingGuard {
        async fn post(
            &self,
            _url: &str,
            body: Vec<u8>,
            _headers: &[(&str, String)],
        ) -> Result<WireResponse> {
            Ok(self.answer(&body))
        }
    }

    /// A set of proxy relays that actually decrypt requests.
    ///
    /// Looks up the relay secret by URL, derives the shared key from the
    /// sender's ephemeral-key header, checks the request decrypts, and
    /// answers with a sealed `{ status: 200, headers, body }` envelope.
    /// Queued failure statuses are emitted first, one per call.
    pub struct ProxyRelaySim {
        secrets: std::collections::HashMap<String, X25519StaticSecret>,
        response_body: serde_json::Value,
        prelude: Mutex<VecDeque<u16>>,
        call_count: Mutex<usize>,
    }

    impl ProxyRelaySim {
        pub fn new(
            secrets: std::collections::HashMap<String, X25519StaticSecret>,
            response_body: serde_json::Value,
        ) -> Self {
            Self {
                secrets,
                response_body,
                prelude: Mutex::new(VecDeque::new()),
                call_count: Mutex::new(0),
            }
        }

        /// Emit this failure status for the next call before serving.
        pub fn fail_next(&self, status: u16) {
            self.prelude
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(status);
        }

        /// Number of calls received.
        pub fn calls(&self) -> usize {
            *self.call_count.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    #[async_trait]
    impl HttpClient for ProxyRelaySim {
        async fn post(
            &self,
            url: &str,
            body: Vec<u8>,
            headers: &[(&str, String)],
        ) -> Result<WireResponse> {
            *self.call_count.lock().unwrap_or_else(|e| e.into_inner()) += 1;

            if let Some(status) = self
                .prelude
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
            {
                return Ok(WireResponse {
                    status,
                    body: Vec::new(),
                });
            }

            let secret = self.secrets.get(url).expect("relay known by url");
            let sender_hex = headers
                .iter()
                .find(|(name, _)| *name == crate::proxy::SENDER_KEY_HEADER)
                .map(|(_, value)| value.clone())
                .expect("sender key header");
            let sender_pk = X25519PublicKey::from_hex(&sender_hex).expect("sender key hex");

            let shared = secret.diffie_hellman(&sender_pk);
            let key =
                sable_crypto::kdf::derive_symmetric_key(shared.as_bytes()).expect("derive key");
            sable_crypto::aes_gcm::open_no_aad(&key, &body).expect("request decrypts");

            let envelope = serde_json::json!({
                "status": 200,
                "headers": {},
                "body": self.response_body,
            });
            let sealed =
                sable_crypto::aes_gcm::seal_no_aad(&key, envelope.to_string().as_bytes())
                    .expect("seal response");

            Ok(WireResponse {
                status: 200,
                body: BASE64.encode(sealed).into_bytes(),
            })
        }
    }
}
