//! Per-interaction reply controller.
//!
//! An inbound webhook may be answered with exactly one HTTP body. [`Reply`]
//! owns the sending half of a oneshot channel for that body while it is
//! unsent; the endpoint holds the receiving half and returns whatever
//! arrives. Once the body is spent, every further operation goes through
//! the webhook messaging endpoint instead.
//!
//! ```text
//!            reply / differ / auto / model / edit / differ_edit
//!   Unsent ─────────────────────────────────────────────────────▶ Sent
//!                                                                 │
//!            reply → PATCH {handle}    differ → no-op             │
//!            follow / get / remove → webhook endpoint (any state) ◀┘
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{error, info};

use super::client::{MessageHandle, WebhookClient};
use crate::error::ReplyError;
use crate::interaction::{
    AutocompleteResult, CommandData, CommandOption, ComponentData, Interaction, InteractionData,
    InteractionResponse, InteractionType, Message, Modal, ModalSubmitData, OutboundMessage,
};

/// Sending half of the immediate response channel.
pub type Responder = oneshot::Sender<InteractionResponse>;

enum ReplyState {
    Unsent(Responder),
    Sent,
}

/// Reply controller for one interaction and one addressed message.
pub struct Reply {
    interaction: Arc<Interaction>,
    client: WebhookClient,
    handle: MessageHandle,
    state: ReplyState,
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            ReplyState::Unsent(_) => "unsent",
            ReplyState::Sent => "sent",
        };
        f.debug_struct("Reply")
            .field("interaction_id", &self.interaction.id)
            .field("handle", &self.handle)
            .field("state", &state)
            .finish()
    }
}

impl Reply {
    /// Build a controller for an inbound interaction.
    ///
    /// Returns `None` for pings, which are answered by the gate and never
    /// reach command code.
    pub fn from_interaction(
        interaction: Interaction,
        client: WebhookClient,
        responder: Responder,
    ) -> Option<Self> {
        if interaction.kind() == InteractionType::Ping {
            return None;
        }

        Some(Self {
            interaction: Arc::new(interaction),
            client,
            handle: MessageHandle::Original,
            state: ReplyState::Unsent(responder),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn data(&self) -> &InteractionData {
        &self.interaction.data
    }

    pub fn interaction_type(&self) -> InteractionType {
        self.interaction.kind()
    }

    pub fn interaction_id(&self) -> &str {
        &self.interaction.id
    }

    pub fn application_id(&self) -> &str {
        &self.interaction.application_id
    }

    pub fn token(&self) -> &str {
        &self.interaction.token
    }

    /// Message a component was attached to.
    pub fn message(&self) -> Option<&Message> {
        self.interaction.message.as_ref()
    }

    /// Message this controller edits, fetches and deletes.
    pub fn handle(&self) -> &MessageHandle {
        &self.handle
    }

    /// Whether the immediate response has been spent.
    pub fn is_sent(&self) -> bool {
        matches!(self.state, ReplyState::Sent)
    }

    pub fn command(&self) -> Option<&CommandData> {
        self.interaction.data.command()
    }

    pub fn command_name(&self) -> Option<&str> {
        self.command().map(|c| c.name.as_str())
    }

    pub fn options(&self) -> &[CommandOption] {
        self.command().map(|c| c.options.as_slice()).unwrap_or_default()
    }

    /// Option currently being typed in an autocomplete request.
    pub fn focused_option(&self) -> Option<&CommandOption> {
        match &self.interaction.data {
            InteractionData::Autocomplete(data) => data.focused_option(),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentData> {
        self.interaction.data.component()
    }

    /// Custom id of the clicked component or submitted modal.
    pub fn custom_id(&self) -> Option<&str> {
        match &self.interaction.data {
            InteractionData::Component(data) => Some(&data.custom_id),
            InteractionData::ModalSubmit(data) => Some(&data.custom_id),
            _ => None,
        }
    }

    /// Selected values of a select menu.
    pub fn values(&self) -> &[String] {
        self.component().map(|c| c.values.as_slice()).unwrap_or_default()
    }

    pub fn modal(&self) -> Option<&ModalSubmitData> {
        self.interaction.data.modal()
    }

    pub fn modal_value(&self, custom_id: &str) -> Option<&str> {
        self.modal().and_then(|m| m.value(custom_id))
    }

    // =========================================================================
    // Immediate responses
    // =========================================================================

    /// Send a message.
    ///
    /// The first call becomes the immediate response. Later calls replace the
    /// addressed message through the messaging endpoint; a failure there is
    /// logged and swallowed since nothing else can be done about it.
    pub async fn reply(&mut self, message: impl Into<OutboundMessage>) -> Result<(), ReplyError> {
        let payload = message.into().into_payload();

        if self.is_sent() {
            if let Err(e) = self
                .client
                .edit_message(self.application_id(), self.token(), &self.handle, &payload)
                .await
            {
                error!(
                    interaction_id = %self.interaction.id,
                    handle = %self.handle,
                    error = %e,
                    "reply_patch_failed"
                );
            }
            return Ok(());
        }

        self.respond("reply", InteractionResponse::message(payload))
    }

    /// Acknowledge now and answer later with `reply` or `follow`.
    ///
    /// A no-op once the immediate response is spent.
    pub async fn differ(&mut self, ephemeral: bool) -> Result<(), ReplyError> {
        if self.is_sent() {
            info!(interaction_id = %self.interaction.id, "interaction_already_responded");
            return Ok(());
        }

        self.respond("differ", InteractionResponse::deferred_message(ephemeral))
    }

    /// Answer an autocomplete request with choices.
    pub async fn auto(&mut self, result: AutocompleteResult) -> Result<(), ReplyError> {
        self.respond("auto", InteractionResponse::autocomplete(result))
    }

    /// Open a modal. Not available when answering a modal submit.
    pub async fn model(&mut self, modal: Modal) -> Result<(), ReplyError> {
        self.require("model", self.interaction_type() != InteractionType::ModalSubmit)?;
        self.respond("model", InteractionResponse::modal(modal))
    }

    /// Update the message a component is attached to.
    pub async fn edit(&mut self, message: impl Into<OutboundMessage>) -> Result<(), ReplyError> {
        self.require("edit", self.interaction_type() == InteractionType::MessageComponent)?;
        let payload = message.into().into_payload();
        self.respond("edit", InteractionResponse::update(payload))
    }

    /// Acknowledge a component now and edit its message later.
    pub async fn differ_edit(&mut self, message: impl Into<OutboundMessage>) -> Result<(), ReplyError> {
        self.require(
            "differ_edit",
            self.interaction_type() == InteractionType::MessageComponent,
        )?;
        let payload = message.into().into_payload();
        self.respond("differ_edit", InteractionResponse::deferred_update(payload))
    }

    fn require(&self, operation: &'static str, allowed: bool) -> Result<(), ReplyError> {
        if allowed {
            return Ok(());
        }
        Err(ReplyError::InvalidOperation {
            operation,
            interaction: self.interaction_type(),
        })
    }

    /// Spend the immediate response. The state moves to `Sent` even if the
    /// request has gone away in the meantime.
    fn respond(
        &mut self,
        operation: &'static str,
        response: InteractionResponse,
    ) -> Result<(), ReplyError> {
        let responder = match std::mem::replace(&mut self.state, ReplyState::Sent) {
            ReplyState::Unsent(responder) => responder,
            ReplyState::Sent => return Err(ReplyError::AlreadyResponded(operation)),
        };

        let response_type = u8::from(response.kind);
        responder
            .send(response)
            .map_err(|_| ReplyError::ResponderClosed(operation))?;

        info!(
            interaction_id = %self.interaction.id,
            operation = operation,
            response_type = response_type,
            "interaction_responded"
        );

        Ok(())
    }

    // =========================================================================
    // Messaging endpoint
    // =========================================================================

    /// Post a follow-up message.
    ///
    /// Returns a new controller addressed at the created message; this
    /// controller is left as it was. The new controller never owns the
    /// immediate response, so `reply` on it edits the follow-up.
    pub async fn follow(&self, message: impl Into<OutboundMessage>) -> Result<Reply, ReplyError> {
        let payload = message.into().into_payload();
        let created = self
            .client
            .create_followup(self.application_id(), self.token(), &payload)
            .await?;

        info!(
            interaction_id = %self.interaction.id,
            message_id = %created.id,
            "followup_created"
        );

        Ok(Reply {
            interaction: Arc::clone(&self.interaction),
            client: self.client.clone(),
            handle: MessageHandle::Id(created.id),
            state: ReplyState::Sent,
        })
    }

    /// Fetch the addressed message.
    pub async fn get(&self) -> Result<Message, ReplyError> {
        self.client
            .get_message(self.application_id(), self.token(), &self.handle)
            .await
    }

    /// Delete the addressed message.
    pub async fn remove(&self) -> Result<(), ReplyError> {
        self.client
            .delete_message(self.application_id(), self.token(), &self.handle)
            .await
    }
}
