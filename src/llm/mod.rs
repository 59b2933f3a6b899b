//! Text generation.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for language-model text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt` under the given system instructions.
    async fn generate(&self, instructions: &str, prompt: &str) -> Result<String>;
}
