//! Driven port for the outbound webhook endpoint.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::LocationCheck;

/// Errors surfaced while delivering one check to the webhook.
///
/// The delivery worker routes on [`WebhookSinkError::is_retryable`]:
/// transport faults and throttling-class statuses earn another attempt,
/// everything else goes straight to the dead letter queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookSinkError {
    /// The request never produced a response: connect, TLS, timeout, or
    /// read failure.
    #[error("webhook request failed: {message}")]
    Transport { message: String },
    /// The endpoint answered outside the 2xx range.
    #[error("webhook returned status {status}")]
    Status { status: u16 },
    /// The check payload could not be encoded.
    #[error("webhook payload encoding failed: {message}")]
    Encode { message: String },
}

impl WebhookSinkError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Return whether retrying this error is expected to help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status } => (500..600).contains(status) || *status == 429,
            Self::Encode { .. } => false,
        }
    }
}

/// Port for POSTing one check to the configured webhook URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Deliver one check; success means the endpoint answered 2xx.
    async fn deliver(&self, check: &LocationCheck) -> Result<(), WebhookSinkError>;
}
