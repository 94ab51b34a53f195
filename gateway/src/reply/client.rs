//! Webhook messaging endpoint client.
//!
//! Follow-up traffic for an interaction is addressed by the application id
//! and the interaction token:
//!
//! ```text
//! POST   {base}/webhooks/{application_id}/{token}?wait=true
//! GET    {base}/webhooks/{application_id}/{token}/messages/{message_id | @original}
//! PATCH  {base}/webhooks/{application_id}/{token}/messages/{message_id | @original}
//! DELETE {base}/webhooks/{application_id}/{token}/messages/{message_id | @original}
//! ```
//!
//! The token authorizes the call, so no bot credential is attached.

use std::fmt;
use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, error};

use crate::error::ReplyError;
use crate::interaction::{Message, MessagePayload};

const USER_AGENT: &str = concat!("DiscordBot (slashgate, ", env!("CARGO_PKG_VERSION"), ")");

/// Addresses one message produced by an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageHandle {
    /// The message created by the immediate response
    Original,
    /// A follow-up message created later
    Id(String),
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("@original"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

/// Client for the webhook-style messaging endpoint.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct WebhookClient {
    http: Client,
    base: Arc<str>,
}

impl WebhookClient {
    /// Create a client against the given API base, e.g. `https://discord.com/api`.
    pub fn new(api_base: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(http, api_base))
    }

    /// Reuse an existing reqwest client.
    pub fn with_client(http: Client, api_base: &str) -> Self {
        Self {
            http,
            base: Arc::from(api_base.trim_end_matches('/')),
        }
    }

    pub fn webhook_url(&self, application_id: &str, token: &str) -> String {
        format!("{}/webhooks/{}/{}", self.base, application_id, token)
    }

    pub fn message_url(&self, application_id: &str, token: &str, handle: &MessageHandle) -> String {
        format!("{}/messages/{}", self.webhook_url(application_id, token), handle)
    }

    /// Fetch a message previously sent for this interaction.
    pub async fn get_message(
        &self,
        application_id: &str,
        token: &str,
        handle: &MessageHandle,
    ) -> Result<Message, ReplyError> {
        let url = self.message_url(application_id, token, handle);
        let response = self.send(self.http.get(&url), &url).await?;
        read_message(response, &url).await
    }

    /// Replace the content of a message previously sent for this interaction.
    pub async fn edit_message(
        &self,
        application_id: &str,
        token: &str,
        handle: &MessageHandle,
        payload: &MessagePayload,
    ) -> Result<Message, ReplyError> {
        let url = self.message_url(application_id, token, handle);
        let response = self.send(self.http.patch(&url).json(payload), &url).await?;
        read_message(response, &url).await
    }

    pub async fn delete_message(
        &self,
        application_id: &str,
        token: &str,
        handle: &MessageHandle,
    ) -> Result<(), ReplyError> {
        let url = self.message_url(application_id, token, handle);
        self.send(self.http.delete(&url), &url).await?;
        Ok(())
    }

    /// Post a new follow-up message and return it, including its id.
    pub async fn create_followup(
        &self,
        application_id: &str,
        token: &str,
        payload: &MessagePayload,
    ) -> Result<Message, ReplyError> {
        let url = self.webhook_url(application_id, token);
        let request = self.http.post(&url).query(&[("wait", "true")]).json(payload);
        let response = self.send(request, &url).await?;
        read_message(response, &url).await
    }

    /// Send a request, mapping transport errors and non-2xx statuses.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ReplyError> {
        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(url = url, error = %e, "webhook_request_error");
                return Err(ReplyError::Http {
                    url: url.to_string(),
                    source: e,
                });
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(url = url, status_code = status.as_u16(), "webhook_request_complete");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            url = url,
            status_code = status.as_u16(),
            body = %body,
            "webhook_request_rejected"
        );

        Err(ReplyError::Api {
            url: url.to_string(),
            status,
            body,
        })
    }
}

async fn read_message(response: Response, url: &str) -> Result<Message, ReplyError> {
    response.json::<Message>().await.map_err(|e| {
        error!(url = url, error = %e, "webhook_response_decode_error");
        ReplyError::Http {
            url: url.to_string(),
            source: e,
        }
    })
}
