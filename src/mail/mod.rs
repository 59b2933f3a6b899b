//! Outbound email.

mod draft;
mod gmail;

pub use draft::{parse_draft, validate_recipient};
pub use gmail::{build_raw_message, GmailTransport};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Acknowledgement for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    /// Transport message id.
    pub id: String,
}

/// Trait for mail transports.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a plain-text email.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<SentMessage>;
}
