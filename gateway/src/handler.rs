//! Seam between the webhook endpoint and command code.

use async_trait::async_trait;

use crate::reply::Reply;

/// Command code plugged into the interaction endpoint.
///
/// `handle` runs on its own task. The endpoint answers the webhook with the
/// first immediate response the handler produces, while the handler is free
/// to keep going with follow-ups afterwards.
#[async_trait]
pub trait InteractionHandler: Send + Sync + 'static {
    async fn handle(&self, reply: Reply);
}
