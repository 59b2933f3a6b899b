//! MCP command implementation.

use crate::cli::preflight::{self, Operation};
use crate::config::Settings;
use crate::mcp::McpServer;
use anyhow::Result;

/// Run the MCP server.
pub async fn run_mcp(settings: Settings) -> Result<()> {
    preflight::check(Operation::Mcp)?;
    let server = McpServer::new(settings)?;
    server.run().await
}
