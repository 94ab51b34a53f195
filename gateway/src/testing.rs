//! In-process stand-in for the platform's messaging endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::reply::WebhookClient;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Value,
}

type Calls = Arc<Mutex<Vec<RecordedCall>>>;

/// Records every request and answers like the real endpoint would.
pub struct FakeApi {
    pub base: String,
    calls: Calls,
}

impl FakeApi {
    /// Token whose webhook is reported as unknown (404).
    pub const EXPIRED_TOKEN: &'static str = "expired";

    pub async fn start() -> Self {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(respond).with_state(calls.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}/api"),
            calls,
        }
    }

    pub fn client(&self) -> WebhookClient {
        WebhookClient::new(&self.base).unwrap()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `count` calls were recorded.
    pub async fn wait_for_calls(&self, count: usize) -> Vec<RecordedCall> {
        for _ in 0..100 {
            let calls = self.calls();
            if calls.len() >= count {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} calls, got {:?}", self.calls());
    }
}

async fn respond(State(calls): State<Calls>, method: Method, uri: Uri, body: Bytes) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    calls.lock().unwrap().push(RecordedCall {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: body.clone(),
    });

    if uri.path().contains(&format!("/{}", FakeApi::EXPIRED_TOKEN)) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Unknown Webhook", "code": 10015 })),
        )
            .into_response();
    }

    let message_id = match uri.path().rsplit('/').next() {
        Some("@original") => "1000",
        Some(id) if uri.path().contains("/messages/") => id,
        _ => "9001",
    };

    match method {
        Method::DELETE => StatusCode::NO_CONTENT.into_response(),
        _ => Json(json!({
            "id": message_id,
            "channel_id": "c1",
            "content": body.get("content").cloned().unwrap_or(json!("")),
            "flags": body.get("flags").cloned().unwrap_or(json!(0)),
        }))
        .into_response(),
    }
}

/// Fixed test keypair.
pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[
        0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c,
        0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae,
        0x7f, 0x60,
    ])
}

pub fn public_key_hex() -> String {
    hex::encode(signing_key().verifying_key().to_bytes())
}

/// Hex signature over `timestamp ++ body`.
pub fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}
