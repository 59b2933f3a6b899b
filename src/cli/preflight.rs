//! Pre-flight checks before talking to external services.
//!
//! Catches missing configuration up front instead of midway through a
//! conversation.

use crate::config::Settings;
use crate::error::{DocentError, Result};
use crate::openai::api_key;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat and single tool runs need the API key.
    Assistant,
    /// Building the index needs the API key.
    Index,
    /// The MCP server starts without credentials; tools report what is missing.
    Mcp,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Assistant | Operation::Index => {
            api_key()?;
        }
        Operation::Mcp => {}
    }
    Ok(())
}

/// Optional capabilities that are not configured, as human-readable hints.
pub fn missing_capabilities(settings: &Settings) -> Vec<String> {
    let mut missing = Vec::new();
    if settings.search.index_id().is_none() {
        missing.push(DocentError::IndexNotConfigured.to_string());
    }
    if settings.drive.access_token.is_none() {
        missing.push("Drive uploads disabled: set GOOGLE_DRIVE_TOKEN.".to_string());
    }
    if settings.mail.access_token.is_none() {
        missing.push("Email sending disabled: set GMAIL_TOKEN.".to_string());
    }
    missing
}
