//! Conversational agent for Docent.
//!
//! Maps model tool calls onto the orchestrator and keeps the chat history
//! for a session.

mod runner;
mod tools;

pub use runner::{Conversation, ToolCallRecord, TurnReply};
pub use tools::{parse_tool_call, parse_tool_value, tool_definitions, tool_specs, ToolCall, ToolSpec};
