//! Interaction webhook signature verification.
//!
//! The platform signs every webhook with Ed25519:
//! - message: `X-Signature-Timestamp` header (UTF-8) followed by the raw body
//! - signature: hex-encoded, in the `X-Signature-Ed25519` header
//! - key: the application's public key, hex-encoded
//!
//! Reference: https://discord.com/developers/docs/interactions/overview#setting-up-an-endpoint-validating-security-request-headers

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ed25519_dalek::{Signature, VerifyingKey};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::interaction::{InteractionResponse, InteractionType};
use crate::web::AppState;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Fixed body of every 401 the gate produces.
pub const UNAUTHORIZED_BODY: &str = "Bad request signature";

/// The configured public key could not be used.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("public key is not valid hex: {0}")]
    KeyEncoding(#[from] hex::FromHexError),

    #[error("public key must be 32 bytes, got {0}")]
    KeyLength(usize),

    #[error("public key is not a valid Ed25519 point: {0}")]
    InvalidKey(#[from] ed25519_dalek::SignatureError),
}

/// Verifies webhook signatures against the application's public key.
#[derive(Debug, Clone)]
pub struct Verifier {
    public_key: VerifyingKey,
}

impl Verifier {
    /// Parse a hex-encoded public key.
    pub fn new(public_key_hex: &str) -> Result<Self, GateError> {
        let bytes = hex::decode(public_key_hex.trim())?;
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| GateError::KeyLength(bytes.len()))?;

        Ok(Self {
            public_key: VerifyingKey::from_bytes(&key)?,
        })
    }

    /// Verify a signature over `timestamp ++ body`.
    ///
    /// Returns `false` on any malformed input rather than erroring.
    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
        use ed25519_dalek::Verifier as _;

        if signature_hex.is_empty() || timestamp.is_empty() {
            warn!(
                has_signature = !signature_hex.is_empty(),
                has_timestamp = !timestamp.is_empty(),
                "signature_missing_fields"
            );
            return false;
        }

        let Ok(signature_bytes) = hex::decode(signature_hex) else {
            warn!(signature_length = signature_hex.len(), "signature_invalid_hex");
            return false;
        };
        let Ok(signature) = Signature::from_slice(&signature_bytes) else {
            warn!(signature_length = signature_bytes.len(), "signature_invalid_length");
            return false;
        };

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.public_key.verify(&message, &signature).is_ok()
    }
}

/// Raw bytes of a verified request body, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RawBody(pub Bytes);

/// Just enough of an interaction to spot pings.
#[derive(Deserialize)]
struct TypeProbe {
    #[serde(rename = "type")]
    kind: Option<u8>,
}

fn is_ping(body: &[u8]) -> bool {
    serde_json::from_slice::<TypeProbe>(body)
        .ok()
        .and_then(|probe| probe.kind)
        == Some(u8::from(InteractionType::Ping))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response()
}

/// Gate middleware for the interaction route.
///
/// 1. Anything but `POST` is rejected with 401
/// 2. The raw body is buffered and the signature checked
/// 3. Pings are answered with PONG whether or not the signature held
/// 4. Otherwise a bad signature is rejected with 401
/// 5. Verified requests continue with the body restored and a [`RawBody`] extension
pub async fn verify_interaction(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        warn!(method = %request.method(), "interaction_method_rejected");
        return unauthorized();
    }

    let signature = header(request.headers(), SIGNATURE_HEADER).to_string();
    let timestamp = header(request.headers(), TIMESTAMP_HEADER).to_string();

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "interaction_body_unreadable");
            return (StatusCode::BAD_REQUEST, "Invalid body").into_response();
        }
    };

    let verified = state.verifier.verify(&signature, &timestamp, &bytes);

    if is_ping(&bytes) {
        if !verified {
            warn!("ping_signature_invalid");
        }
        debug!(verified = verified, "ping_answered");
        return InteractionResponse::pong().into_response();
    }

    if !verified {
        warn!(body_length = bytes.len(), "interaction_signature_invalid");
        return unauthorized();
    }

    let mut request = Request::from_parts(parts, Body::from(bytes.clone()));
    request.extensions_mut().insert(RawBody(bytes));
    next.run(request).await
}
