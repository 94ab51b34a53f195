//! Interaction wire types.
//!
//! This module provides:
//! - Inbound interaction payloads with typed `data`
//! - Outbound message payloads and flag merging
//! - Immediate response bodies and their type codes

pub mod message;
pub mod response;
pub mod types;

pub use message::{MessageFlags, MessagePayload, OutboundMessage};
pub use response::{
    AutocompleteResult, CallbackData, CommandOptionChoice, InteractionResponse,
    InteractionResponseType, Modal,
};
pub use types::{
    CommandData, CommandOption, ComponentData, Interaction, InteractionData, InteractionType,
    Message, ModalField, ModalRow, ModalSubmitData,
};
