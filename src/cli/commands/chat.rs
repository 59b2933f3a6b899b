//! Interactive chat command.

use crate::agent::Conversation;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, no_greeting: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Assistant) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    for hint in preflight::missing_capabilities(&settings) {
        Output::warning(&hint);
    }

    let model = model.unwrap_or_else(|| settings.assistant.model.clone());
    let orchestrator = Arc::new(Orchestrator::new(settings)?);
    let mut chat = Conversation::new(orchestrator, &model)?;

    println!("\n{}", style("Docent").bold().cyan());
    println!(
        "{}\n",
        style("Type your requests, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    if !no_greeting {
        match chat.greet().await {
            Ok(greeting) => Output::reply(&greeting),
            Err(e) => Output::warning(&format!("Could not greet: {}", e)),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            chat.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        match chat.send(input).await {
            Ok(reply) => {
                for call in &reply.tool_calls {
                    Output::tool_call(&call.name, call.succeeded);
                }
                Output::reply(&reply.content);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
