//! Configuration module for Docent.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, EmailPrompts, Prompts, ResearchPrompts};
pub use settings::{
    AssistantSettings, DriveSettings, GeneralSettings, MailSettings, PromptSettings,
    ReportSettings, SearchSettings, Settings,
};
