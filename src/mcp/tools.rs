//! MCP tool definitions for Docent.

use super::protocol::Tool;
use crate::agent::tool_specs;

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    tool_specs()
        .into_iter()
        .map(|spec| Tool {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            input_schema: spec.parameters,
        })
        .collect()
}
