//! Tool definitions and argument parsing.

use crate::error::{DocentError, Result};
use crate::session::ReportFormat;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Tools the conversational agent may invoke.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the web for recent information.
    WebSearch { query: String },

    /// Search the internal document index.
    FileSearch { query: String },

    /// Build a formatted brief from the index and the web.
    DeepResearchReport {
        topic: String,
        format: ReportFormat,
        /// Falls back to the configured default.
        max_sources: Option<u32>,
        /// Falls back to the configured default.
        recency_hint: Option<String>,
    },

    /// Save the cached report as docx or pdf.
    SaveLastReport { file_type: String },

    /// Upload the saved report file.
    UploadLastReportToDrive { folder_id: Option<String> },

    /// Draft an email for review.
    ComposeEmail {
        to: String,
        topic: String,
        extra_context: Option<String>,
    },

    /// Send the staged draft.
    SendEmail,
}

impl ToolCall {
    /// Tool name as exposed to the agent.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::WebSearch { .. } => "web_search",
            ToolCall::FileSearch { .. } => "file_search",
            ToolCall::DeepResearchReport { .. } => "deep_research_report",
            ToolCall::SaveLastReport { .. } => "save_last_report",
            ToolCall::UploadLastReportToDrive { .. } => "upload_last_report_to_drive",
            ToolCall::ComposeEmail { .. } => "compose_email",
            ToolCall::SendEmail => "send_email",
        }
    }
}

/// Name, description and JSON schema of one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Specs for every tool, shared by the chat agent and the MCP server.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "web_search",
            description: "Search the web for current or recent information and return direct facts.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "What to look up" }
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: "file_search",
            description: "Search the internal notes (uploaded documents) for foundational material.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "What to look up" }
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: "deep_research_report",
            description: "Combine the internal notes and the web into a formatted brief. \
                The result is kept as the current report for saving and uploading.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "topic": { "type": "string", "description": "Subject of the report" },
                    "format": {
                        "type": "string",
                        "enum": ["daily_update", "lesson_brief", "research_report"],
                        "description": "Report shape (default: lesson_brief)",
                        "default": "lesson_brief"
                    },
                    "max_sources": {
                        "type": "integer",
                        "description": "Maximum number of sources to list (default: 6)",
                        "default": 6
                    },
                    "recency_hint": {
                        "type": "string",
                        "description": "Time window for recent developments (default: 'last 30 days')",
                        "default": "last 30 days"
                    }
                },
                "required": ["topic"]
            }),
        },
        ToolSpec {
            name: "save_last_report",
            description: "Save the most recent report to a docx or pdf file.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_type": {
                        "type": "string",
                        "enum": ["docx", "pdf"],
                        "description": "File type (default: docx)",
                        "default": "docx"
                    }
                }
            }),
        },
        ToolSpec {
            name: "upload_last_report_to_drive",
            description: "Upload the saved report file to Google Drive and return a shareable link.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "folder_id": {
                        "type": "string",
                        "description": "Drive folder id (optional)"
                    }
                }
            }),
        },
        ToolSpec {
            name: "compose_email",
            description: "Draft an email and read it back for review. Never sends.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "to": { "type": "string", "description": "Recipient email address" },
                    "topic": { "type": "string", "description": "What the email is about" },
                    "extra_context": {
                        "type": "string",
                        "description": "Anything else the email should mention"
                    }
                },
                "required": ["to", "topic"]
            }),
        },
        ToolSpec {
            name: "send_email",
            description: "Send the drafted email. Call only after the user explicitly confirms the draft.",
            parameters: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    tool_specs()
        .into_iter()
        .map(|spec| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: spec.name.to_string(),
                description: Some(spec.description.to_string()),
                parameters: Some(spec.parameters),
                strict: None,
            },
        })
        .collect()
}

/// Parse a tool call from a name and JSON arguments.
///
/// Unknown tools and unknown parameters are rejected here, before any tool runs.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: Value = if arguments.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| DocentError::InvalidInput(format!("Invalid tool arguments: {}", e)))?
    };
    parse_tool_value(name, &args)
}

/// Parse a tool call from a name and already-decoded arguments.
pub fn parse_tool_value(name: &str, args: &Value) -> Result<ToolCall> {
    let empty = Map::new();
    let args = match args {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(DocentError::InvalidInput(
                "Tool arguments must be a JSON object".to_string(),
            ))
        }
    };

    match name {
        "web_search" => {
            ensure_known(name, args, &["query"])?;
            Ok(ToolCall::WebSearch {
                query: required_str(args, "query")?,
            })
        }
        "file_search" => {
            ensure_known(name, args, &["query"])?;
            Ok(ToolCall::FileSearch {
                query: required_str(args, "query")?,
            })
        }
        "deep_research_report" => {
            ensure_known(name, args, &["topic", "format", "max_sources", "recency_hint"])?;
            let format = optional_str(args, "format")?
                .map(|f| ReportFormat::parse_or_default(&f))
                .unwrap_or_default();
            Ok(ToolCall::DeepResearchReport {
                topic: required_str(args, "topic")?,
                format,
                max_sources: optional_count(args, "max_sources")?,
                recency_hint: optional_str(args, "recency_hint")?,
            })
        }
        "save_last_report" => {
            ensure_known(name, args, &["file_type"])?;
            Ok(ToolCall::SaveLastReport {
                file_type: optional_str(args, "file_type")?.unwrap_or_else(|| "docx".to_string()),
            })
        }
        "upload_last_report_to_drive" => {
            ensure_known(name, args, &["folder_id"])?;
            Ok(ToolCall::UploadLastReportToDrive {
                folder_id: optional_str(args, "folder_id")?,
            })
        }
        "compose_email" => {
            ensure_known(name, args, &["to", "topic", "extra_context"])?;
            Ok(ToolCall::ComposeEmail {
                to: required_str(args, "to")?,
                topic: required_str(args, "topic")?,
                extra_context: optional_str(args, "extra_context")?,
            })
        }
        "send_email" => {
            ensure_known(name, args, &[])?;
            Ok(ToolCall::SendEmail)
        }
        _ => Err(DocentError::UnknownTool(name.to_string())),
    }
}

fn ensure_known(tool: &str, args: &Map<String, Value>, allowed: &[&str]) -> Result<()> {
    match args.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(DocentError::InvalidInput(format!(
            "Unknown parameter '{}' for tool '{}'",
            key, tool
        ))),
        None => Ok(()),
    }
}

fn required_str(args: &Map<String, Value>, key: &str) -> Result<String> {
    match optional_str(args, key)? {
        Some(value) => Ok(value),
        None => Err(DocentError::InvalidInput(format!("Missing '{}' argument", key))),
    }
}

/// A trimmed, non-empty string argument. Null and blank count as absent.
fn optional_str(args: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(_) => Err(DocentError::InvalidInput(format!("'{}' must be a string", key))),
    }
}

fn optional_count(args: &Map<String, Value>, key: &str) -> Result<Option<u32>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .filter(|n| *n >= 1)
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| DocentError::InvalidInput(format!("'{}' must be a positive integer", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_web_search() {
        let tool = parse_tool_call("web_search", r#"{"query": "GPT releases"}"#).unwrap();
        assert_eq!(tool, ToolCall::WebSearch { query: "GPT releases".to_string() });
        assert_eq!(tool.name(), "web_search");
    }

    #[test]
    fn test_parse_research_defaults() {
        let tool = parse_tool_call("deep_research_report", r#"{"topic": "RAG"}"#).unwrap();
        match tool {
            ToolCall::DeepResearchReport { topic, format, max_sources, recency_hint } => {
                assert_eq!(topic, "RAG");
                assert_eq!(format, ReportFormat::LessonBrief);
                assert_eq!(max_sources, None);
                assert_eq!(recency_hint, None);
            }
            _ => panic!("Expected DeepResearchReport tool"),
        }
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let tool = parse_tool_call(
            "deep_research_report",
            r#"{"topic": "RAG", "format": "limerick", "max_sources": 3}"#,
        )
        .unwrap();
        match tool {
            ToolCall::DeepResearchReport { format, max_sources, .. } => {
                assert_eq!(format, ReportFormat::LessonBrief);
                assert_eq!(max_sources, Some(3));
            }
            _ => panic!("Expected DeepResearchReport tool"),
        }
    }

    #[test]
    fn test_file_type_is_not_validated_at_parse() {
        // Rejection of unsupported file types belongs to the save tool itself.
        let tool = parse_tool_call("save_last_report", r#"{"file_type": "xml"}"#).unwrap();
        assert_eq!(tool, ToolCall::SaveLastReport { file_type: "xml".to_string() });

        let tool = parse_tool_call("save_last_report", "").unwrap();
        assert_eq!(tool, ToolCall::SaveLastReport { file_type: "docx".to_string() });
    }

    #[test]
    fn test_rejects_unknown_tool_and_parameters() {
        assert!(matches!(
            parse_tool_call("delete_everything", "{}"),
            Err(DocentError::UnknownTool(_))
        ));

        let err = parse_tool_call("send_email", r#"{"force": true}"#).unwrap_err();
        assert!(err.to_string().contains("Unknown parameter 'force'"));
    }

    #[test]
    fn test_missing_and_mistyped_arguments() {
        let err = parse_tool_call("compose_email", r#"{"to": "a@x.com"}"#).unwrap_err();
        assert!(err.to_string().contains("Missing 'topic'"));

        let err = parse_tool_call("web_search", r#"{"query": "   "}"#).unwrap_err();
        assert!(err.to_string().contains("Missing 'query'"));

        let err = parse_tool_call("web_search", r#"{"query": 42}"#).unwrap_err();
        assert!(err.to_string().contains("must be a string"));

        let err =
            parse_tool_call("deep_research_report", r#"{"topic": "x", "max_sources": 0}"#).unwrap_err();
        assert!(err.to_string().contains("positive integer"));

        assert!(parse_tool_call("web_search", "[1, 2]").is_err());
    }

    #[test]
    fn test_specs_cover_every_tool() {
        let names: Vec<_> = tool_specs().iter().map(|s| s.name).collect();
        assert_eq!(names.len(), 7);
        for name in &names {
            let args = match *name {
                "web_search" | "file_search" => r#"{"query": "q"}"#,
                "deep_research_report" => r#"{"topic": "t"}"#,
                "compose_email" => r#"{"to": "a@x.com", "topic": "t"}"#,
                _ => "{}",
            };
            assert_eq!(parse_tool_call(name, args).unwrap().name(), *name);
        }
        assert_eq!(tool_definitions().len(), 7);
    }
}
