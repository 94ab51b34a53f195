//! Errors surfaced by the reply controller.

use reqwest::StatusCode;
use thiserror::Error;

use crate::interaction::InteractionType;

#[derive(Debug, Error)]
pub enum ReplyError {
    /// The operation makes no sense for this kind of interaction, e.g. a
    /// modal in answer to a modal submit.
    #[error("{operation} cannot be used on a {interaction} interaction")]
    InvalidOperation {
        operation: &'static str,
        interaction: InteractionType,
    },

    /// The one immediate response was already spent.
    #[error("{0} needs the immediate response, which was already sent")]
    AlreadyResponded(&'static str),

    /// The webhook request went away before the response could be handed over.
    #[error("immediate response channel closed before {0} was delivered")]
    ResponderClosed(&'static str),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Api {
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl ReplyError {
    /// Whether the caller asked for something the interaction type forbids.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_operation_message() {
        let err = ReplyError::InvalidOperation {
            operation: "modal",
            interaction: InteractionType::ModalSubmit,
        };
        assert_eq!(err.to_string(), "modal cannot be used on a modal submit interaction");
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_api_error_message() {
        let err = ReplyError::Api {
            url: "http://localhost/webhooks/a/b".to_string(),
            status: StatusCode::NOT_FOUND,
            body: "Unknown Webhook".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "http://localhost/webhooks/a/b returned 404 Not Found: Unknown Webhook"
        );
        assert!(!err.is_invalid_operation());
    }
}
