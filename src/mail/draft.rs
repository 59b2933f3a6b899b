//! Turning generated text into an email draft.

use crate::error::{DocentError, Result};
use regex::Regex;
use std::sync::LazyLock;

static SUBJECT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[*_#\s]*subject\s*:[*_\s]*(.*?)[*_\s]*$").unwrap());

static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s<>,;]+@[^@\s<>,;]+\.[^@\s<>,;]+$").unwrap());

/// Split generated draft text into `(subject, body)`.
///
/// The subject comes from a leading `Subject:` line (markdown emphasis
/// tolerated). Without one the topic becomes the subject and the whole text
/// is the body.
pub fn parse_draft(text: &str, topic: &str) -> (String, String) {
    let text = text.trim();
    let mut lines = text.lines();

    if let Some(first) = lines.next() {
        if let Some(caps) = SUBJECT_LINE.captures(first) {
            let subject = caps[1].trim();
            let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
            let subject = if subject.is_empty() { topic.trim() } else { subject };
            return (subject.to_string(), body);
        }
    }

    (topic.trim().to_string(), text.to_string())
}

/// Check that `to` looks like a single email address.
pub fn validate_recipient(to: &str) -> Result<&str> {
    let to = to.trim();
    if to.is_empty() {
        return Err(DocentError::InvalidInput("recipient address is empty".to_string()));
    }
    if !ADDRESS.is_match(to) {
        return Err(DocentError::InvalidInput(format!(
            "'{}' is not a valid email address",
            to
        )));
    }
    Ok(to)
}
