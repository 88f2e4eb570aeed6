//! Donor notification through an external messaging relay.
//!
//! The [`NotificationGateway`] turns a phone number and a message into a
//! single relay call and reports the result as an [`Outcome`]. Relay errors
//! never escape the gateway: every failure becomes [`Outcome::Failed`].
//! There is no retry and no delivery tracking.

mod twilio;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RelayConfig;

pub use twilio::TwilioRelay;

/// Errors that can occur while talking to the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Account id, auth token or sender address is missing.
    #[error("relay credentials are not configured")]
    NotConfigured,

    /// The relay endpoint URL could not be built.
    #[error("invalid relay endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request never got a response.
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with an error status.
    #[error("relay rejected message (HTTP {status}{}): {message}", .code.map(|c| format!(", code {c}")).unwrap_or_default())]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Relay-specific error code, when the body carried one.
        code: Option<i64>,
        /// Human-readable detail from the relay.
        message: String,
    },

    /// The relay answered with a success status but an unreadable body.
    #[error("unexpected relay response: {0}")]
    Decode(String),
}

/// A messaging relay able to deliver one text message.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Submit `body` from `from` to `to`, both already in channel form.
    ///
    /// Returns the relay-assigned confirmation id.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be reached or refuses the message.
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<String, RelayError>;
}

/// Result of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The relay accepted the message.
    Sent {
        /// The phone number as the user selected it.
        recipient: String,
        /// Relay-assigned confirmation id.
        confirmation: String,
    },
    /// The message was not accepted.
    Failed {
        /// What went wrong.
        detail: String,
    },
}

impl Outcome {
    /// Check whether the relay accepted the message.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { recipient, .. } => write!(f, "Message sent to {recipient}"),
            Self::Failed { detail } => write!(f, "Failed to send message: {detail}"),
        }
    }
}

/// Sends donor notifications with a fixed sender identity.
#[derive(Debug)]
pub struct NotificationGateway<R> {
    config: RelayConfig,
    relay: R,
}

impl NotificationGateway<TwilioRelay> {
    /// Build a gateway backed by the Twilio REST API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed or the
    /// configured API base is not a usable URL.
    pub fn twilio(config: RelayConfig) -> Result<Self, RelayError> {
        let relay = TwilioRelay::new(&config)?;
        Ok(Self::new(config, relay))
    }
}

impl<R: Relay> NotificationGateway<R> {
    /// Create a gateway from explicit relay settings and a relay client.
    #[must_use]
    pub fn new(config: RelayConfig, relay: R) -> Self {
        Self { config, relay }
    }

    /// Send `body` to the donor at `recipient`.
    ///
    /// The recipient is prefixed with the configured channel scheme before
    /// submission. This never fails; relay errors come back as
    /// [`Outcome::Failed`].
    pub async fn notify(&self, recipient: &str, body: &str) -> Outcome {
        if !self.config.is_configured() {
            warn!("Notification to {recipient} skipped: relay not configured");
            return Outcome::Failed {
                detail: RelayError::NotConfigured.to_string(),
            };
        }

        let to = self.config.channel_address(recipient);
        match self.relay.send(&self.config.from_address, &to, body).await {
            Ok(confirmation) => {
                info!("Notified {to} (confirmation {confirmation})");
                Outcome::Sent {
                    recipient: recipient.to_string(),
                    confirmation,
                }
            }
            Err(err) => {
                warn!("Notification to {to} failed: {err}");
                Outcome::Failed {
                    detail: err.to_string(),
                }
            }
        }
    }
}
