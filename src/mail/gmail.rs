//! Gmail API transport.
//!
//! Expects an OAuth access token that already carries the `gmail.send`
//! scope.

use super::{MailTransport, SentMessage};
use crate::error::{DocentError, Result};
use crate::openai::http_client;
use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{json, Value};
use tracing::{info, instrument};

const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1/users";

/// Sends mail through `users.messages.send`.
pub struct GmailTransport {
    http: reqwest::Client,
    access_token: Option<String>,
    sender: String,
}

impl GmailTransport {
    /// Create a new Gmail transport sending as `sender` ("me" for the token owner).
    pub fn new(access_token: Option<&str>, sender: &str) -> Self {
        Self {
            http: http_client(),
            access_token: access_token.map(str::to_string),
            sender: sender.to_string(),
        }
    }
}

#[async_trait]
impl MailTransport for GmailTransport {
    #[instrument(skip(self, subject, body))]
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<SentMessage> {
        let token = self.access_token.as_deref().ok_or_else(|| {
            DocentError::Config(
                "Gmail is not authorized. Set GMAIL_TOKEN or mail.access_token.".to_string(),
            )
        })?;

        let raw = URL_SAFE_NO_PAD.encode(build_raw_message(to, subject, body));

        let response = self
            .http
            .post(format!("{}/{}/messages/send", GMAIL_API, self.sender))
            .bearer_auth(token)
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| DocentError::Mail(format!("send failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| DocentError::Mail(format!("unreadable response: {}", e)))?;

        if !status.is_success() {
            let message = payload["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(DocentError::Mail(format!("{} ({})", message, status)));
        }

        let id = payload["id"]
            .as_str()
            .ok_or_else(|| DocentError::Mail("response had no message id".to_string()))?
            .to_string();

        info!("Sent message {} to {}", id, to);
        Ok(SentMessage { id })
    }
}

/// Build an RFC 822 plain-text message.
///
/// Header values are stripped of line breaks; a non-ASCII subject is
/// RFC 2047 encoded.
pub fn build_raw_message(to: &str, subject: &str, body: &str) -> String {
    let to = single_line(to);
    let subject = single_line(subject);
    let subject = if subject.is_ascii() {
        subject
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(subject.as_bytes()))
    };

    format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        to, subject, body
    )
}

fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
