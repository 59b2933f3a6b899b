//! Search over the web and the internal document index.

mod knowledge;
mod responses;

pub use knowledge::{collect_documents, KnowledgeIndex, INDEXABLE_EXTENSIONS, KNOWLEDGE_STORE_NAME};
pub use responses::{extract_output_text, ResponsesSearch};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Public web, favouring recent material.
    Web,
    /// The internal document index (vector store).
    Index,
}

/// Per-request search options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// System-level instructions for the answer.
    pub instructions: Option<String>,
}

impl SearchOptions {
    pub fn with_instructions(instructions: &str) -> Self {
        Self {
            instructions: Some(instructions.to_string()),
        }
    }
}

/// Trait for search backends that answer a query with synthesized text.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Answer `query` using every mode in `modes` in a single request.
    async fn search(&self, query: &str, modes: &[SearchMode], options: &SearchOptions) -> Result<String>;

    /// Whether an internal index is available for [`SearchMode::Index`].
    fn index_configured(&self) -> bool;
}
