//! Interaction endpoint handlers.
//!
//! By the time a request reaches [`interaction_endpoint`] the gate has
//! verified its signature and answered pings. The endpoint only:
//! 1. Parses the interaction
//! 2. Hands a [`Reply`] to the configured handler on its own task
//! 3. Returns the first immediate response the handler produces

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Extension, Json, Router,
};
use serde::Serialize;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::handler::InteractionHandler;
use crate::interaction::{Interaction, InteractionResponse};
use crate::reply::{Reply, WebhookClient};
use crate::web::signature::{verify_interaction, RawBody, Verifier};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<Verifier>,
    pub client: WebhookClient,
    pub handler: Arc<dyn InteractionHandler>,
}

impl AppState {
    /// Parse the public key and build the messaging client.
    pub fn new(config: Config, handler: Arc<dyn InteractionHandler>) -> Result<Self> {
        let verifier = Verifier::new(&config.public_key).context("Invalid public key")?;
        let client =
            WebhookClient::new(&config.api_base).context("Failed to build HTTP client")?;

        Ok(Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            client,
            handler,
        })
    }
}

/// Build the service router: the gated interaction route plus `/health`.
pub fn router(state: AppState) -> Router {
    let interactions_path = state.config.interactions_path.clone();

    Router::new()
        .route(&interactions_path, any(interaction_endpoint))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_interaction,
        ))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Interactions
// =============================================================================

/// Interaction webhook endpoint. Must sit behind [`verify_interaction`].
pub async fn interaction_endpoint(
    State(state): State<AppState>,
    Extension(RawBody(body)): Extension<RawBody>,
) -> Response {
    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, body_length = body.len(), "interaction_parse_failed");
            return (StatusCode::BAD_REQUEST, "Invalid interaction payload").into_response();
        }
    };

    let interaction_id = interaction.id.clone();
    info!(
        interaction_id = %interaction_id,
        interaction_type = %interaction.kind(),
        guild_id = ?interaction.guild_id,
        "interaction_received"
    );

    let (responder, response) = oneshot::channel();
    let Some(reply) = Reply::from_interaction(interaction, state.client.clone(), responder) else {
        return InteractionResponse::pong().into_response();
    };

    let handler = Arc::clone(&state.handler);
    let task = tokio::spawn(async move { handler.handle(reply).await });

    match response.await {
        Ok(response) => response.into_response(),
        Err(_) => {
            // Responder dropped: the handler finished or panicked without answering
            if let Err(e) = task.await {
                error!(interaction_id = %interaction_id, error = %e, "interaction_handler_panicked");
            }
            warn!(interaction_id = %interaction_id, "interaction_unanswered");
            (StatusCode::INTERNAL_SERVER_ERROR, "Interaction was not answered").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{MessagePayload, Modal};
    use crate::testing::{public_key_hex, sign, FakeApi};
    use crate::web::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, UNAUTHORIZED_BODY};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Routes by command name to exercise every path through the endpoint.
    struct ScriptedHandler;

    #[async_trait]
    impl InteractionHandler for ScriptedHandler {
        async fn handle(&self, mut reply: Reply) {
            let name = reply.command_name().map(str::to_string);
            match name.as_deref() {
                Some("defer") => {
                    reply.differ(true).await.unwrap();
                    reply.follow("done later").await.unwrap();
                }
                Some("silent") => {}
                Some("panic") => panic!("handler blew up"),
                Some("form") => {
                    let modal = Modal {
                        custom_id: "form".to_string(),
                        title: "Form".to_string(),
                        components: vec![],
                    };
                    reply.model(modal).await.unwrap();
                }
                _ => reply
                    .reply(MessagePayload::new().content("hello").ephemeral(true))
                    .await
                    .unwrap(),
            }
        }
    }

    async fn app() -> (Router, FakeApi) {
        app_with(|_| {}).await
    }

    async fn app_with(customize: impl FnOnce(&mut Config)) -> (Router, FakeApi) {
        let api = FakeApi::start().await;
        let mut config = Config::new(public_key_hex());
        config.api_base = api.base.clone();
        customize(&mut config);
        let state = AppState::new(config, Arc::new(ScriptedHandler)).unwrap();
        (router(state), api)
    }

    fn with_bad_signature(body: &str) -> Request<Body> {
        let mut request = signed(body);
        request
            .headers_mut()
            .insert(SIGNATURE_HEADER, "00".repeat(64).parse().unwrap());
        request
    }

    fn command(name: &str) -> String {
        json!({
            "id": "int-1",
            "application_id": "app",
            "type": 2,
            "token": "tok",
            "data": { "id": "cmd", "name": name }
        })
        .to_string()
    }

    fn signed(body: &str) -> Request<Body> {
        let timestamp = "1700000000";
        Request::builder()
            .method(Method::POST)
            .uri("/interactions")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, sign(timestamp, body.as_bytes()))
            .header(TIMESTAMP_HEADER, timestamp)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read(response: Response) -> (StatusCode, Vec<u8>) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let (status, bytes) = read(response).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _api) = app().await;
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = read_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_signed_command_gets_immediate_reply() {
        let (app, _api) = app().await;
        let response = app.oneshot(signed(&command("hello"))).await.unwrap();
        let (status, body) = read_json(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "type": 4, "data": { "content": "hello", "flags": 64 } }));
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let (app, _api) = app().await;
        let request = with_bad_signature(&command("hello"));

        let (status, body) = read(app.oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, UNAUTHORIZED_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_bad_signature_rejected_for_any_body() {
        let component = json!({
            "id": "int-2", "application_id": "app", "type": 3, "token": "tok",
            "data": { "custom_id": "counter:1", "component_type": 2 }
        })
        .to_string();
        let modal_submit = json!({
            "id": "int-3", "application_id": "app", "type": 5, "token": "tok",
            "data": { "custom_id": "form", "components": [] }
        })
        .to_string();

        for body in [component.as_str(), modal_submit.as_str(), "not json at all", ""] {
            let (app, api) = app().await;
            let (status, text) = read(app.oneshot(with_bad_signature(body)).await.unwrap()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "body: {body:?}");
            assert_eq!(text, UNAUTHORIZED_BODY.as_bytes());
            assert!(api.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_bad_request() {
        let (app, _api) = app_with(|config| config.max_body_bytes = 16).await;
        let body = format!(r#"{{"type":2,"pad":"{}"}}"#, "x".repeat(40));
        assert!(body.len() > 16);

        let (status, text) = read(app.oneshot(signed(&body)).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, b"Invalid body");
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        let (app, _api) = app().await;
        let request = Request::post("/interactions")
            .header("content-type", "application/json")
            .body(Body::from(command("hello")))
            .unwrap();

        let (status, _) = read(app.oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_post_rejected() {
        let (app, _api) = app().await;
        let request = Request::get("/interactions").body(Body::empty()).unwrap();

        let (status, body) = read(app.oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, b"Bad request signature");
    }

    #[tokio::test]
    async fn test_signed_ping_gets_pong() {
        let (app, _api) = app().await;
        let body = json!({ "id": "p", "application_id": "app", "type": 1, "token": "tok" }).to_string();

        let (status, value) = read_json(app.oneshot(signed(&body)).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "type": 1 }));
    }

    #[tokio::test]
    async fn test_unsigned_ping_still_gets_pong() {
        let (app, _api) = app().await;
        let request = Request::post("/interactions")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, "00".repeat(64))
            .header(TIMESTAMP_HEADER, "1700000000")
            .body(Body::from(r#"{"type":1}"#))
            .unwrap();

        let (status, value) = read_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "type": 1 }));
    }

    #[tokio::test]
    async fn test_deferred_then_followup() {
        let (app, api) = app().await;
        let (status, value) = read_json(app.oneshot(signed(&command("defer"))).await.unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "type": 5, "data": { "flags": 64 } }));

        let calls = api.wait_for_calls(1).await;
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "/api/webhooks/app/tok");
        assert_eq!(calls[0].body, json!({ "content": "done later" }));
    }

    #[tokio::test]
    async fn test_modal_response() {
        let (app, _api) = app().await;
        let (status, value) = read_json(app.oneshot(signed(&command("form"))).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["type"], 9);
    }

    #[tokio::test]
    async fn test_unanswered_interaction() {
        let (app, _api) = app().await;
        let (status, _) = read(app.oneshot(signed(&command("silent"))).await.unwrap()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_panicking_handler() {
        let (app, _api) = app().await;
        let (status, _) = read(app.oneshot(signed(&command("panic"))).await.unwrap()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_signed_garbage_is_bad_request() {
        let (app, _api) = app().await;
        let (status, _) = read(app.oneshot(signed(r#"{"type":2}"#)).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
