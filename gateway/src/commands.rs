//! Built-in demo commands served by `slashgate-web`.
//!
//! - `/ping` replies "Pong!"
//! - `/echo text:<...>` echoes privately, with autocomplete on `text`
//! - `/slow` defers, edits the placeholder and posts a follow-up
//! - `/counter` posts a button that bumps its own label when clicked
//! - `/feedback` opens a modal and thanks the user on submit

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::error::ReplyError;
use crate::handler::InteractionHandler;
use crate::interaction::{AutocompleteResult, InteractionData, MessagePayload, Modal};
use crate::reply::Reply;

const COUNTER_PREFIX: &str = "counter:";
const FEEDBACK_MODAL: &str = "feedback";
const FEEDBACK_FIELD: &str = "feedback_body";

/// Suggestions offered while typing `/echo text:`.
const ECHO_SUGGESTIONS: &[&str] = &["hello", "hello world", "good morning", "good night"];

/// Demo handler routing by interaction type and name.
pub struct DemoCommands;

#[async_trait]
impl InteractionHandler for DemoCommands {
    async fn handle(&self, mut reply: Reply) {
        let interaction_id = reply.interaction_id().to_string();

        if let Err(e) = dispatch(&mut reply).await {
            error!(interaction_id = %interaction_id, error = %e, "demo_command_failed");
        }
    }
}

async fn dispatch(reply: &mut Reply) -> Result<(), ReplyError> {
    match reply.data().clone() {
        InteractionData::Command(command) => {
            info!(command = %command.name, "demo_command");
            match command.name.as_str() {
                "ping" => reply.reply("Pong!").await,
                "echo" => {
                    let text = command
                        .option("text")
                        .and_then(|o| o.as_str())
                        .unwrap_or("(nothing)")
                        .to_string();
                    reply.reply(MessagePayload::new().content(text).ephemeral(true)).await
                }
                "slow" => slow(reply).await,
                "counter" => reply.reply(counter_message(0)).await,
                "feedback" => reply.model(feedback_modal()).await,
                other => {
                    reply
                        .reply(
                            MessagePayload::new()
                                .content(format!("Unknown command `{other}`"))
                                .ephemeral(true),
                        )
                        .await
                }
            }
        }
        InteractionData::Autocomplete(command) => {
            let typed = command
                .focused_option()
                .and_then(|o| o.as_str())
                .unwrap_or_default()
                .to_lowercase();
            let result = ECHO_SUGGESTIONS
                .iter()
                .filter(|s| s.starts_with(&typed))
                .fold(AutocompleteResult::new(), |acc, s| acc.choice(*s, *s));
            reply.auto(result).await
        }
        InteractionData::Component(component) => {
            match component.custom_id.strip_prefix(COUNTER_PREFIX) {
                Some(count) => {
                    let next = count.parse::<u64>().unwrap_or_default() + 1;
                    reply.edit(counter_message(next)).await
                }
                None => reply.differ_edit(MessagePayload::new()).await,
            }
        }
        InteractionData::ModalSubmit(modal) => {
            let body = modal.value(FEEDBACK_FIELD).unwrap_or_default();
            reply
                .reply(
                    MessagePayload::new()
                        .content(format!("Thanks for the feedback: {body}"))
                        .ephemeral(true),
                )
                .await
        }
        InteractionData::Ping => Ok(()),
    }
}

/// Defer, fill the placeholder in, then add a follow-up and clean it up.
async fn slow(reply: &mut Reply) -> Result<(), ReplyError> {
    reply.differ(false).await?;
    reply.reply("Done thinking.").await?;

    let followup = reply.follow("One more thing...").await?;
    let message = followup.get().await?;
    info!(message_id = %message.id, "demo_followup_posted");
    followup.remove().await
}

fn counter_message(count: u64) -> MessagePayload {
    MessagePayload::new()
        .content(format!("Clicked {count} times"))
        .component(json!({
            "type": 1,
            "components": [{
                "type": 2,
                "style": 1,
                "label": "Click me",
                "custom_id": format!("{COUNTER_PREFIX}{count}"),
            }]
        }))
}

fn feedback_modal() -> Modal {
    Modal {
        custom_id: FEEDBACK_MODAL.to_string(),
        title: "Send feedback".to_string(),
        components: vec![json!({
            "type": 1,
            "components": [{
                "type": 4,
                "custom_id": FEEDBACK_FIELD,
                "label": "What do you think?",
                "style": 2,
                "required": true,
            }]
        })],
    }
}
