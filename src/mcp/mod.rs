//! MCP (Model Context Protocol) server for Docent.
//!
//! Exposes the assistant's tools to other agents over JSON-RPC 2.0 on
//! stdio. One server process holds one session.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
