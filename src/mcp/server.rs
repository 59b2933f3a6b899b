//! MCP server implementation.

use super::protocol::*;
use super::tools::get_tools;
use crate::agent::parse_tool_value;
use crate::config::Settings;
use crate::orchestrator::{Collaborators, Orchestrator};
use crate::speech::LogSpeaker;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "docent";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for Docent.
pub struct McpServer {
    orchestrator: Orchestrator,
}

impl McpServer {
    /// Create a new MCP server. Spoken lines go to the log since stdout carries the protocol.
    pub fn new(settings: Settings) -> crate::error::Result<Self> {
        let collaborators =
            Collaborators::from_settings(&settings).with_speaker(Arc::new(LogSpeaker));
        let orchestrator = Orchestrator::with_collaborators(settings, collaborators)?;
        Ok(Self::with_orchestrator(orchestrator))
    }

    /// Create a server around an existing orchestrator.
    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Docent MCP server starting (session {})", self.orchestrator.session().id());

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"))
                }
            };

            if let Some(response) = response {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC request. Notifications get no response.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => to_response(request.id, &ToolsListResult { tools: get_tools() }),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle initialize request.
    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params.and_then(|p| serde_json::from_value::<InitializeParams>(p).ok()) {
            let client = params.client_info.map(|c| c.name).unwrap_or_default();
            info!(
                "Client '{}' connected (protocol {})",
                client,
                params.protocol_version.as_deref().unwrap_or("unknown")
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        to_response(id, &result)
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Invalid params: {}", e))
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let arguments = params.arguments.unwrap_or(Value::Null);
        let result = match parse_tool_value(&params.name, &arguments) {
            Ok(call) => {
                let outcome = self.orchestrator.run_tool(&call).await;
                if outcome.is_error {
                    ToolCallResult::error(outcome.text)
                } else {
                    ToolCallResult::text(outcome.text)
                }
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        };

        to_response(id, &result)
    }
}

fn to_response<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, &format!("Internal error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::error::{DocentError, Result};
    use crate::llm::TextGenerator;
    use crate::mail::{MailTransport, SentMessage};
    use crate::report::{FileType, ReportWriter};
    use crate::search::{SearchBackend, SearchMode, SearchOptions};
    use crate::storage::{CloudStorage, UploadedFile};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    struct Stub;

    #[async_trait]
    impl SearchBackend for Stub {
        async fn search(&self, query: &str, _modes: &[SearchMode], _options: &SearchOptions) -> Result<String> {
            Ok(format!("answer to {}", query))
        }

        fn index_configured(&self) -> bool {
            false
        }
    }

    #[async_trait]
    impl TextGenerator for Stub {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String> {
            Ok("Subject: Hi\n\nBody".to_string())
        }
    }

    #[async_trait]
    impl ReportWriter for Stub {
        async fn write(&self, _content: &str, _topic: &str, _kind: FileType) -> Result<PathBuf> {
            Err(DocentError::ReportWrite("read-only".to_string()))
        }
    }

    #[async_trait]
    impl CloudStorage for Stub {
        async fn upload(&self, _path: &Path, _folder_id: Option<&str>) -> Result<UploadedFile> {
            Err(DocentError::Upload("offline".to_string()))
        }
    }

    #[async_trait]
    impl MailTransport for Stub {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<SentMessage> {
            Ok(SentMessage { id: "m-1".to_string() })
        }
    }

    fn server() -> McpServer {
        let stub = Arc::new(Stub);
        let collaborators = Collaborators {
            search: stub.clone(),
            generator: stub.clone(),
            writer: stub.clone(),
            storage: stub.clone(),
            mail: stub,
            speaker: Arc::new(LogSpeaker),
        };
        McpServer::with_orchestrator(Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            collaborators,
        ))
    }

    async fn exchange(server: &McpServer, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_and_list() {
        let server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let responses = exchange(&server, input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "docent");
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_tool_calls_share_one_session() {
        let server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"compose_email","arguments":{"to":"a@x.com","topic":"demo"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"send_email"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"send_email","arguments":{}}}"#,
            "\n"
        );
        let responses = exchange(&server, input).await;

        assert!(responses[0]["result"]["isError"].is_null());
        assert_eq!(responses[1]["result"]["content"][0]["text"], "Email sent (message id: m-1)");
        assert_eq!(responses[2]["result"]["isError"], true);
        assert!(responses[2]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("No email draft pending"));
    }

    #[tokio::test]
    async fn test_errors() {
        let server = server();
        let input = concat!(
            "not json\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"rm_rf","arguments":{}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"file_search","arguments":{"query":"x"}}}"#,
            "\n"
        );
        let responses = exchange(&server, input).await;

        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[2]["result"]["isError"], true);
        assert!(responses[3]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("File search not configured"));
    }
}
