//! CLI module for Docent.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Docent - research and outreach assistant for AI instructors
///
/// Answers questions from the web and your own notes, builds briefs,
/// saves and shares them, and drafts email that is only sent after you confirm.
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session with the assistant
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Skip the opening greeting
        #[arg(long)]
        no_greeting: bool,
    },

    /// Run a single tool directly
    Tool {
        /// Tool name (e.g. web_search, deep_research_report)
        name: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Start MCP server for AI assistant integration
    Mcp,

    /// Create a document index from a folder of PDF/TXT/MD/DOCX files
    Index {
        /// Folder containing the documents
        folder: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
