//! Reply lifecycle for inbound interactions.
//!
//! This module provides:
//! - The per-interaction [`Reply`] controller (one immediate response, then
//!   the messaging endpoint)
//! - The [`WebhookClient`] for follow-up, edit, fetch and delete calls
//!
//! ## Lifecycle
//!
//! ```text
//! webhook → Reply (Unsent) → immediate HTTP body → Reply (Sent) → PATCH / POST / GET / DELETE
//! ```

pub mod client;
pub mod controller;

pub use client::{MessageHandle, WebhookClient};
pub use controller::{Reply, Responder};
