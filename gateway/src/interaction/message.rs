//! Outbound message payloads.
//!
//! Callers hand either plain text or a structured [`MessagePayload`] to the
//! reply controller. The `ephemeral` request is not a wire field; it is
//! folded into `flags` right before the payload leaves the process.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

bitflags! {
    /// Message flag bits understood by the platform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u64 {
        const CROSSPOSTED = 1 << 0;
        const IS_CROSSPOST = 1 << 1;
        const SUPPRESS_EMBEDS = 1 << 2;
        const URGENT = 1 << 4;
        const HAS_THREAD = 1 << 5;
        /// Only the invoking user can see the message.
        const EPHEMERAL = 1 << 6;
        const LOADING = 1 << 7;
        const SUPPRESS_NOTIFICATIONS = 1 << 12;
    }
}

// Flags travel as a plain integer, not bitflags' named-string form.
impl Serialize for MessageFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for MessageFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = Option::<u64>::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits.unwrap_or_default()))
    }
}

/// Structured message body for immediate responses and webhook calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<MessageFlags>,
    /// Request private visibility; merged into `flags` before sending.
    #[serde(default, skip_serializing)]
    pub ephemeral: bool,
}

impl MessagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: Value) -> Self {
        self.embeds.get_or_insert_with(Vec::new).push(embed);
        self
    }

    pub fn component(mut self, component: Value) -> Self {
        self.components.get_or_insert_with(Vec::new).push(component);
        self
    }

    pub fn flags(mut self, flags: MessageFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

/// Anything a reply operation accepts as a message.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text(String),
    Payload(MessagePayload),
}

impl OutboundMessage {
    /// Resolve into the wire payload, setting the EPHEMERAL bit when requested.
    pub fn into_payload(self) -> MessagePayload {
        match self {
            Self::Text(content) => MessagePayload::new().content(content),
            Self::Payload(mut payload) => {
                if payload.ephemeral {
                    let flags = payload.flags.unwrap_or_default() | MessageFlags::EPHEMERAL;
                    payload.flags = Some(flags);
                }
                payload
            }
        }
    }
}

impl From<&str> for OutboundMessage {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OutboundMessage {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<MessagePayload> for OutboundMessage {
    fn from(value: MessagePayload) -> Self {
        Self::Payload(value)
    }
}
