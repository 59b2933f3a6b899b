//! Configuration settings for Docent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub assistant: AssistantSettings,
    pub search: SearchSettings,
    pub reports: ReportSettings,
    pub drive: DriveSettings,
    pub mail: MailSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.docent".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Conversational assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Chat model that drives the conversation and drafts email.
    pub model: String,
    /// Maximum tool round-trips per user turn.
    pub max_tool_iterations: usize,
    /// Messages kept in history (system prompt excluded).
    pub max_history: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tool_iterations: 8,
            max_history: 30,
        }
    }
}

/// Web and internal-index search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Model used for search-backed answers.
    pub model: String,
    /// Vector store holding the internal notes. Search over the index is
    /// disabled when unset.
    pub vector_store_id: Option<String>,
    /// Web search context size (low, medium, high).
    pub search_context_size: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            vector_store_id: None,
            search_context_size: "medium".to_string(),
        }
    }
}

impl SearchSettings {
    /// The configured vector store id, ignoring blank values.
    pub fn index_id(&self) -> Option<&str> {
        self.vector_store_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Report generation and persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Preferred directory for saved reports.
    pub output_dir: String,
    /// Used when the preferred directory is not writable.
    pub fallback_dir: String,
    /// Characters of the first line spoken after a report is ready.
    pub preview_chars: usize,
    /// Default number of sources requested.
    pub max_sources: u32,
    /// Default recency window mentioned in the research prompt.
    pub recency_hint: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/Downloads".to_string(),
            fallback_dir: "~/.docent/reports".to_string(),
            preview_chars: 220,
            max_sources: 6,
            recency_hint: "last 30 days".to_string(),
        }
    }
}

/// Google Drive settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct DriveSettings {
    /// OAuth access token with drive.file scope.
    pub access_token: Option<String>,
    /// Folder used when a tool call names none.
    pub default_folder_id: Option<String>,
}

/// Gmail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// OAuth access token with gmail.send scope.
    pub access_token: Option<String>,
    /// Gmail user id to send as.
    pub sender: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            sender: "me".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables override file values for credentials and the
    /// index id.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Some(id) = non_empty_env("VECTOR_STORE_ID") {
            self.search.vector_store_id = Some(id);
        }
        if let Some(token) = non_empty_env("GOOGLE_DRIVE_TOKEN") {
            self.drive.access_token = Some(token);
        }
        if let Some(token) = non_empty_env("GMAIL_TOKEN") {
            self.mail.access_token = Some(token);
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::DocentError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docent")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded preferred report directory.
    pub fn report_dir(&self) -> PathBuf {
        Self::expand_path(&self.reports.output_dir)
    }

    /// Get the expanded fallback report directory.
    pub fn report_fallback_dir(&self) -> PathBuf {
        Self::expand_path(&self.reports.fallback_dir)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.reports.preview_chars, 220);
        assert_eq!(settings.reports.max_sources, 6);
        assert_eq!(settings.reports.recency_hint, "last 30 days");
        assert_eq!(settings.mail.sender, "me");
    }

    #[test]
    fn test_index_id_ignores_blank() {
        let mut search = SearchSettings::default();
        assert!(search.index_id().is_none());
        search.vector_store_id = Some("   ".to_string());
        assert!(search.index_id().is_none());
        search.vector_store_id = Some("vs_123".to_string());
        assert_eq!(search.index_id(), Some("vs_123"));
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [search]
            vector_store_id = "vs_abc"

            [reports]
            output_dir = "/srv/reports"
            "#,
        )
        .unwrap();
        assert_eq!(settings.search.index_id(), Some("vs_abc"));
        assert_eq!(settings.report_dir(), PathBuf::from("/srv/reports"));
        assert_eq!(settings.assistant.model, "gpt-4o-mini");
    }
}
