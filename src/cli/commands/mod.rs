//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod index;
mod mcp;
mod tool;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use index::run_index;
pub use mcp::run_mcp;
pub use tool::run_tool;
