//! Conversation loop with tool calling.

use super::tools::{parse_tool_call, tool_definitions};
use crate::error::{DocentError, Result};
use crate::openai::create_client;
use crate::orchestrator::Orchestrator;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use std::sync::Arc;
use tracing::{debug, info};

/// A multi-turn conversation that drives the orchestrator's tools.
pub struct Conversation {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    orchestrator: Arc<Orchestrator>,
    messages: Vec<ChatCompletionRequestMessage>,
    max_tool_iterations: usize,
    max_history: usize,
}

impl Conversation {
    /// Start a conversation using the orchestrator's prompts and limits.
    pub fn new(orchestrator: Arc<Orchestrator>, model: &str) -> Result<Self> {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(orchestrator.prompts().assistant.system.clone())
            .build()
            .map_err(|e| DocentError::Agent(e.to_string()))?;

        let assistant = &orchestrator.settings().assistant;
        let max_tool_iterations = assistant.max_tool_iterations;
        let max_history = assistant.max_history;

        Ok(Self {
            client: create_client(),
            model: model.to_string(),
            orchestrator,
            messages: vec![system_message.into()],
            max_tool_iterations,
            max_history,
        })
    }

    /// Set maximum tool iterations per turn.
    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Clear conversation history (keeps system prompt).
    pub fn clear_history(&mut self) {
        self.messages.truncate(1);
    }

    /// Produce the opening line of the session.
    pub async fn greet(&mut self) -> Result<String> {
        let instruction = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.orchestrator.prompts().assistant.greeting.clone())
            .build()
            .map_err(|e| DocentError::Agent(e.to_string()))?;

        let mut messages = self.messages.clone();
        messages.push(instruction.into());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| DocentError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DocentError::OpenAI(format!("Chat API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        self.add_assistant_message(&content)?;
        Ok(content)
    }

    /// Send a user message and run tool calls until the model answers.
    pub async fn send(&mut self, user_input: &str) -> Result<TurnReply> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user_input)
            .build()
            .map_err(|e| DocentError::Agent(e.to_string()))?;
        self.messages.push(user_message.into());

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_tool_iterations {
                return Err(DocentError::Agent(format!(
                    "Exceeded maximum tool iterations ({})",
                    self.max_tool_iterations
                )));
            }

            debug!("Chat iteration {}, {} messages", iterations, self.messages.len());

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(self.messages.clone())
                .tools(tool_definitions())
                .build()
                .map_err(|e| DocentError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| DocentError::OpenAI(format!("Chat API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| DocentError::Agent("No response from model".to_string()))?;

            match choice.message.tool_calls {
                Some(ref tool_calls) if !tool_calls.is_empty() => {
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| DocentError::Agent(e.to_string()))?;
                    self.messages.push(assistant_msg.into());

                    // One at a time: each call may depend on state left by the previous one.
                    for tool_call in tool_calls {
                        let record = self.execute_tool_call(tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(record.result.clone())
                            .build()
                            .map_err(|e| DocentError::Agent(e.to_string()))?;
                        self.messages.push(tool_msg.into());

                        tool_calls_made.push(record);
                    }
                }
                _ => {
                    let content = choice.message.content.clone().unwrap_or_default();
                    self.add_assistant_message(&content)?;
                    self.trim_history();

                    return Ok(TurnReply {
                        content,
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Calling tool: {} with args: {}", name, arguments);

        let (result, succeeded) = match parse_tool_call(name, arguments) {
            Ok(tool) => {
                let outcome = self.orchestrator.run_tool(&tool).await;
                (outcome.text, !outcome.is_error)
            }
            Err(e) => (format!("Failed to parse tool call: {}", e), false),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
            succeeded,
        }
    }

    fn add_assistant_message(&mut self, content: &str) -> Result<()> {
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| DocentError::Agent(e.to_string()))?;
        self.messages.push(msg.into());
        Ok(())
    }

    fn trim_history(&mut self) {
        if let Some(start) = trim_point(&self.messages, self.max_history) {
            let mut trimmed = vec![self.messages[0].clone()];
            trimmed.extend(self.messages[start..].iter().cloned());
            self.messages = trimmed;
        }
    }
}

/// Index of the first message to keep so that the system prompt plus the
/// tail fits in `max_messages`.
///
/// The tail always starts at a user message; tool results never lose the
/// assistant message that requested them.
fn trim_point(messages: &[ChatCompletionRequestMessage], max_messages: usize) -> Option<usize> {
    if messages.len() <= max_messages || max_messages < 2 {
        return None;
    }
    let earliest = messages.len() - (max_messages - 1);
    (earliest..messages.len())
        .find(|&i| matches!(messages[i], ChatCompletionRequestMessage::User(_)))
}

/// Result of one user turn.
#[derive(Debug)]
pub struct TurnReply {
    /// The model's final answer.
    pub content: String,
    /// Tools called while producing it.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model calls used.
    pub iterations: usize,
}

/// Record of a tool call made during a turn.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Text returned to the model.
    pub result: String,
    /// Whether the tool ran without error.
    pub succeeded: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn assistant(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestAssistantMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn tool(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id("call_1")
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn system() -> ChatCompletionRequestMessage {
        ChatCompletionRequestSystemMessageArgs::default()
            .content("sys")
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "web_search".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "Found results".to_string(),
            succeeded: true,
        };
        assert_eq!(format!("{}", record), r#"web_search({"query": "test"})"#);
    }

    #[test]
    fn test_no_trim_under_limit() {
        let messages = vec![system(), user("hi"), assistant("hello")];
        assert_eq!(trim_point(&messages, 30), None);
    }

    #[test]
    fn test_trim_starts_at_user_message() {
        let messages = vec![
            system(),
            user("one"),
            assistant("a"),
            tool("result"),
            assistant("b"),
            user("two"),
            assistant("c"),
        ];
        // Room for system + 4: earliest candidate is the tool result at 3.
        assert_eq!(trim_point(&messages, 5), Some(5));
    }
}
