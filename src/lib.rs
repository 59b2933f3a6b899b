//! Docent - research and outreach assistant for AI instructors
//!
//! A conversational tool layer that answers from the web and an internal
//! document index, builds formatted briefs, saves them as DOCX or PDF,
//! shares them through Google Drive and drafts email that is only sent
//! after explicit confirmation.
//!
//! # Architecture
//!
//! - `session` - Per-session report cache and email confirmation gate
//! - `orchestrator` - Tool preconditions, delegation and state updates
//! - `agent` - Tool registry and the chat loop
//! - `search`, `llm`, `report`, `storage`, `mail`, `speech` - Collaborators
//! - `mcp` - The same tools over the Model Context Protocol
//! - `config` - Settings and prompts
//!
//! # Example
//!
//! ```rust,no_run
//! use docent::agent::ToolCall;
//! use docent::config::Settings;
//! use docent::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let brief = orchestrator
//!         .execute(&ToolCall::WebSearch { query: "latest open-weight model releases".into() })
//!         .await;
//!     println!("{}", brief);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod mail;
pub mod mcp;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod search;
pub mod session;
pub mod speech;
pub mod storage;

pub use error::{DocentError, Result};
