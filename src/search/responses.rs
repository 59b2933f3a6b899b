//! Search backed by the OpenAI Responses API hosted tools.

use super::{SearchBackend, SearchMode, SearchOptions};
use crate::error::{DocentError, Result};
use crate::openai::{api_key, http_client, API_BASE};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Search backend that lets the model call `web_search_preview` and
/// `file_search` on its own.
pub struct ResponsesSearch {
    http: reqwest::Client,
    model: String,
    vector_store_id: Option<String>,
    context_size: String,
}

impl ResponsesSearch {
    /// Create a new search backend.
    pub fn new(model: &str, vector_store_id: Option<&str>, context_size: &str) -> Self {
        Self {
            http: http_client(),
            model: model.to_string(),
            vector_store_id: vector_store_id.map(str::to_string),
            context_size: context_size.to_string(),
        }
    }

    fn tools_for(&self, modes: &[SearchMode]) -> Result<Vec<Value>> {
        let mut tools = Vec::with_capacity(modes.len());
        for mode in modes {
            match mode {
                SearchMode::Index => {
                    let id = self
                        .vector_store_id
                        .as_deref()
                        .ok_or(DocentError::IndexNotConfigured)?;
                    tools.push(json!({
                        "type": "file_search",
                        "vector_store_ids": [id]
                    }));
                }
                SearchMode::Web => tools.push(json!({
                    "type": "web_search_preview",
                    "search_context_size": self.context_size
                })),
            }
        }
        Ok(tools)
    }
}

#[async_trait]
impl SearchBackend for ResponsesSearch {
    #[instrument(skip(self, query, modes, options), fields(modes = ?modes))]
    async fn search(&self, query: &str, modes: &[SearchMode], options: &SearchOptions) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "input": query,
            "tools": self.tools_for(modes)?,
        });
        if let Some(instructions) = &options.instructions {
            body["instructions"] = json!(instructions);
        }

        let response = self
            .http
            .post(format!("{}/responses", API_BASE))
            .bearer_auth(api_key()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocentError::Search(format!("request failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| DocentError::Search(format!("unreadable response: {}", e)))?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("unknown error");
            return Err(DocentError::Search(format!("{} ({})", message, status)));
        }

        let text = extract_output_text(&payload);
        debug!("Search returned {} chars", text.len());
        Ok(text)
    }

    fn index_configured(&self) -> bool {
        self.vector_store_id.is_some()
    }
}

/// Concatenate every `output_text` part of the message items in a
/// Responses API payload.
pub fn extract_output_text(payload: &Value) -> String {
    if let Some(text) = payload["output_text"].as_str() {
        return text.to_string();
    }

    payload["output"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item["type"] == "message")
                .filter_map(|item| item["content"].as_array())
                .flatten()
                .filter(|part| part["type"] == "output_text")
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
