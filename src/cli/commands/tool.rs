//! Run one tool without the conversational agent.

use crate::agent::parse_tool_call;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Parse and run a single tool call, printing its text result.
///
/// Each invocation is its own session, so tools that depend on earlier
/// state (save, upload, send) report their precondition errors here.
pub async fn run_tool(name: &str, args: &str, settings: Settings) -> Result<()> {
    let call = parse_tool_call(name, args)?;
    preflight::check(Operation::Assistant)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Running {}...", call.name()));
    let outcome = orchestrator.run_tool(&call).await;
    spinner.finish_and_clear();

    if outcome.is_error {
        Output::error(&outcome.text);
        anyhow::bail!("{} failed", call.name());
    }

    println!("{}", outcome.text);
    Ok(())
}
