//! OpenAI client configuration with sensible defaults.

use crate::error::{DocentError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Base URL for endpoints called directly over HTTP.
pub const API_BASE: &str = "https://api.openai.com/v1";

/// Create an OpenAI client with configured timeout.
pub fn create_client() -> Client<OpenAIConfig> {
    Client::with_config(OpenAIConfig::default()).with_http_client(http_client())
}

/// Create a plain HTTP client with the default API timeout.
///
/// Used for endpoints `async-openai` does not cover (Responses, vector stores)
/// and for the Google APIs.
pub fn http_client() -> reqwest::Client {
    http_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a plain HTTP client with a custom timeout.
pub fn http_client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Read the OpenAI API key from the environment.
pub fn api_key() -> Result<String> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(DocentError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
