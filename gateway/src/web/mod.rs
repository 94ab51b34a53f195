//! Web server module for handling interaction webhooks.
//!
//! This module provides:
//! - The signature gate middleware (Ed25519 check, ping short-circuit)
//! - The interaction endpoint that drives a [`crate::Reply`] per request
//! - A health check and the router tying them together

pub mod handlers;
pub mod signature;

pub use handlers::{health, interaction_endpoint, router, AppState, HealthResponse};
pub use signature::{verify_interaction, GateError, RawBody, Verifier};
