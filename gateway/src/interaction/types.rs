//! Inbound interaction types.
//!
//! The platform sends one JSON shape for every interaction and switches the
//! meaning of `data` on the numeric `type`. Deserialization goes through a
//! raw mirror of the wire object and then resolves `data` into the typed
//! [`InteractionData`] union, so handler code matches on variants instead of
//! probing loose fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::MessageFlags;

// =============================================================================
// Interaction Type
// =============================================================================

/// Discriminant of an inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
}

impl TryFrom<u8> for InteractionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Ping),
            2 => Ok(Self::ApplicationCommand),
            3 => Ok(Self::MessageComponent),
            4 => Ok(Self::ApplicationCommandAutocomplete),
            5 => Ok(Self::ModalSubmit),
            other => Err(format!("unknown interaction type {other}")),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ping => "ping",
            Self::ApplicationCommand => "application command",
            Self::MessageComponent => "message component",
            Self::ApplicationCommandAutocomplete => "autocomplete",
            Self::ModalSubmit => "modal submit",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Interaction
// =============================================================================

/// A verified inbound interaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawInteraction")]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    /// Credential for the follow-up messaging endpoint, valid for 15 minutes
    pub token: String,
    pub data: InteractionData,
    /// Message the component was attached to (component interactions only)
    pub message: Option<Message>,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub member: Option<Value>,
    pub user: Option<Value>,
    pub locale: Option<String>,
    pub guild_locale: Option<String>,
    pub app_permissions: Option<String>,
    pub version: Option<u8>,
}

impl Interaction {
    /// The wire discriminant this interaction arrived with.
    pub fn kind(&self) -> InteractionType {
        self.data.kind()
    }
}

/// Wire mirror of [`Interaction`] before `data` is resolved.
#[derive(Deserialize)]
struct RawInteraction {
    id: String,
    application_id: String,
    #[serde(rename = "type")]
    kind: InteractionType,
    token: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    member: Option<Value>,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    guild_locale: Option<String>,
    #[serde(default)]
    app_permissions: Option<String>,
    #[serde(default)]
    version: Option<u8>,
}

impl TryFrom<RawInteraction> for Interaction {
    type Error = String;

    fn try_from(raw: RawInteraction) -> Result<Self, Self::Error> {
        let data = InteractionData::resolve(raw.kind, raw.data)?;

        Ok(Interaction {
            id: raw.id,
            application_id: raw.application_id,
            token: raw.token,
            data,
            message: raw.message,
            guild_id: raw.guild_id,
            channel_id: raw.channel_id,
            member: raw.member,
            user: raw.user,
            locale: raw.locale,
            guild_locale: raw.guild_locale,
            app_permissions: raw.app_permissions,
            version: raw.version,
        })
    }
}

// =============================================================================
// Interaction Data
// =============================================================================

/// Typed `data` payload, keyed by interaction type.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    Ping,
    Command(CommandData),
    Component(ComponentData),
    Autocomplete(CommandData),
    ModalSubmit(ModalSubmitData),
}

impl InteractionData {
    fn resolve(kind: InteractionType, data: Option<Value>) -> Result<Self, String> {
        if kind == InteractionType::Ping {
            return Ok(Self::Ping);
        }

        let data = data.ok_or_else(|| format!("{kind} interaction is missing data"))?;
        let parsed = match kind {
            InteractionType::Ping => Self::Ping,
            InteractionType::ApplicationCommand => Self::Command(from_value(kind, data)?),
            InteractionType::MessageComponent => Self::Component(from_value(kind, data)?),
            InteractionType::ApplicationCommandAutocomplete => {
                Self::Autocomplete(from_value(kind, data)?)
            }
            InteractionType::ModalSubmit => Self::ModalSubmit(from_value(kind, data)?),
        };
        Ok(parsed)
    }

    pub fn kind(&self) -> InteractionType {
        match self {
            Self::Ping => InteractionType::Ping,
            Self::Command(_) => InteractionType::ApplicationCommand,
            Self::Component(_) => InteractionType::MessageComponent,
            Self::Autocomplete(_) => InteractionType::ApplicationCommandAutocomplete,
            Self::ModalSubmit(_) => InteractionType::ModalSubmit,
        }
    }

    /// Command data for both invocations and autocomplete requests.
    pub fn command(&self) -> Option<&CommandData> {
        match self {
            Self::Command(data) | Self::Autocomplete(data) => Some(data),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentData> {
        match self {
            Self::Component(data) => Some(data),
            _ => None,
        }
    }

    pub fn modal(&self) -> Option<&ModalSubmitData> {
        match self {
            Self::ModalSubmit(data) => Some(data),
            _ => None,
        }
    }
}

fn from_value<T: serde::de::DeserializeOwned>(kind: InteractionType, data: Value) -> Result<T, String> {
    serde_json::from_value(data).map_err(|e| format!("invalid {kind} data: {e}"))
}

/// Application command invocation (also used for autocomplete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub id: String,
    pub name: String,
    /// 1 = chat input, 2 = user context menu, 3 = message context menu
    #[serde(rename = "type", default = "default_command_type")]
    pub kind: u8,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

fn default_command_type() -> u8 {
    1
}

impl CommandData {
    /// Find a top-level option by name.
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The option the user is currently typing into, searching subcommands.
    pub fn focused_option(&self) -> Option<&CommandOption> {
        find_focused(&self.options)
    }
}

fn find_focused(options: &[CommandOption]) -> Option<&CommandOption> {
    options.iter().find_map(|option| {
        if option.focused {
            Some(option)
        } else {
            find_focused(&option.options)
        }
    })
}

/// A single command option value, possibly nesting subcommand options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub focused: bool,
}

impl CommandOption {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }
}

/// Button press or select menu choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: u8,
    /// Selected values for select menus; empty for buttons
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Value>,
}

/// Submitted modal with its text inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSubmitData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<ModalRow>,
}

impl ModalSubmitData {
    /// Value of the text input with the given custom id.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.components
            .iter()
            .flat_map(|row| row.components.iter())
            .find(|field| field.custom_id == custom_id)
            .and_then(|field| field.value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalRow {
    #[serde(default)]
    pub components: Vec<ModalField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalField {
    #[serde(rename = "type")]
    pub kind: u8,
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

// =============================================================================
// Message
// =============================================================================

/// Message object as returned by the platform.
///
/// Only the fields the reply lifecycle cares about are typed; embeds and
/// components stay opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub embeds: Vec<Value>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub flags: MessageFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
