//! Slashgate - signed interaction webhooks with a one-shot reply controller.
//!
//! This library provides the pieces behind the `slashgate-web` binary:
//! - `web`: signature gate middleware, interaction endpoint, router
//! - `reply`: the per-interaction [`Reply`] controller and webhook client
//! - `interaction`: inbound interaction and outbound response types
//!
//! ## Architecture
//!
//! ```text
//! Webhook → Signature Gate → Endpoint → InteractionHandler(Reply) → immediate body
//!                                                    └→ follow-ups via messaging endpoint
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod handler;
pub mod interaction;
pub mod reply;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::ReplyError;
pub use handler::InteractionHandler;
pub use interaction::{
    AutocompleteResult, Interaction, InteractionData, InteractionType, MessagePayload, Modal,
    OutboundMessage,
};
pub use reply::{MessageHandle, Reply, WebhookClient};
pub use web::{router, AppState, Verifier};
