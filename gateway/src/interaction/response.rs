//! Immediate response bodies.
//!
//! Exactly one of these is returned as the HTTP body for each inbound
//! interaction webhook.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::{MessageFlags, MessagePayload};

/// Callback type codes for the immediate response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum InteractionResponseType {
    Pong,
    ChannelMessageWithSource,
    DeferredChannelMessageWithSource,
    DeferredUpdateMessage,
    UpdateMessage,
    ApplicationCommandAutocompleteResult,
    Modal,
}

impl From<InteractionResponseType> for u8 {
    fn from(value: InteractionResponseType) -> Self {
        match value {
            InteractionResponseType::Pong => 1,
            InteractionResponseType::ChannelMessageWithSource => 4,
            InteractionResponseType::DeferredChannelMessageWithSource => 5,
            InteractionResponseType::DeferredUpdateMessage => 6,
            InteractionResponseType::UpdateMessage => 7,
            InteractionResponseType::ApplicationCommandAutocompleteResult => 8,
            InteractionResponseType::Modal => 9,
        }
    }
}

/// Choices returned for an autocomplete request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteResult {
    pub choices: Vec<CommandOptionChoice>,
}

impl AutocompleteResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.choices.push(CommandOptionChoice {
            name: name.into(),
            value: value.into(),
            name_localizations: None,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionChoice {
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Value>,
}

/// A modal popup. Components are passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<Value>,
}

/// Payload carried by the immediate response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CallbackData {
    Message(MessagePayload),
    Autocomplete(AutocompleteResult),
    Modal(Modal),
}

/// The single immediate response to an interaction webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CallbackData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: InteractionResponseType::Pong,
            data: None,
        }
    }

    pub fn message(payload: MessagePayload) -> Self {
        Self {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(CallbackData::Message(payload)),
        }
    }

    /// "Thinking..." placeholder; `flags` is always present, 0 when public.
    pub fn deferred_message(ephemeral: bool) -> Self {
        let flags = if ephemeral {
            MessageFlags::EPHEMERAL
        } else {
            MessageFlags::empty()
        };
        Self {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data: Some(CallbackData::Message(MessagePayload::new().flags(flags))),
        }
    }

    pub fn update(payload: MessagePayload) -> Self {
        Self {
            kind: InteractionResponseType::UpdateMessage,
            data: Some(CallbackData::Message(payload)),
        }
    }

    pub fn deferred_update(payload: MessagePayload) -> Self {
        Self {
            kind: InteractionResponseType::DeferredUpdateMessage,
            data: Some(CallbackData::Message(payload)),
        }
    }

    pub fn autocomplete(result: AutocompleteResult) -> Self {
        Self {
            kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
            data: Some(CallbackData::Autocomplete(result)),
        }
    }

    pub fn modal(modal: Modal) -> Self {
        Self {
            kind: InteractionResponseType::Modal,
            data: Some(CallbackData::Modal(modal)),
        }
    }
}

impl IntoResponse for InteractionResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pong_has_no_data() {
        let value = serde_json::to_value(InteractionResponse::pong()).unwrap();
        assert_eq!(value, json!({ "type": 1 }));
    }

    #[test]
    fn test_deferred_message_flags() {
        let private = serde_json::to_value(InteractionResponse::deferred_message(true)).unwrap();
        assert_eq!(private, json!({ "type": 5, "data": { "flags": 64 } }));

        let public = serde_json::to_value(InteractionResponse::deferred_message(false)).unwrap();
        assert_eq!(public, json!({ "type": 5, "data": { "flags": 0 } }));
    }

    #[test]
    fn test_autocomplete_choices() {
        let result = AutocompleteResult::new().choice("Rust", "rust").choice("Ruby", "ruby");
        let value = serde_json::to_value(InteractionResponse::autocomplete(result)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": 8,
                "data": { "choices": [
                    { "name": "Rust", "value": "rust" },
                    { "name": "Ruby", "value": "ruby" }
                ]}
            })
        );
    }

    #[test]
    fn test_modal_body() {
        let modal = Modal {
            custom_id: "feedback".to_string(),
            title: "Feedback".to_string(),
            components: vec![json!({ "type": 1, "components": [] })],
        };
        let value = serde_json::to_value(InteractionResponse::modal(modal)).unwrap();
        assert_eq!(value["type"], 9);
        assert_eq!(value["data"]["custom_id"], "feedback");
        assert_eq!(value["data"]["title"], "Feedback");
    }
}
