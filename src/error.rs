//! Error types for Docent.

use thiserror::Error;

/// Library-level error type for Docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File search not configured yet. Set VECTOR_STORE_ID in your .env or config file.")]
    IndexNotConfigured,

    #[error("No report cached yet. Ask for a research report first.")]
    NoReportCached,

    #[error("No saved report found. Save the report as docx or pdf before uploading.")]
    NoSavedReport,

    #[error("Saved report file not found at {0}. Save the report again before uploading.")]
    SavedReportMissing(String),

    #[error("The cached report changed while saving. Please save again.")]
    StaleReport,

    #[error("No email draft pending. Compose an email first.")]
    NoDraftPending,

    #[error("Invalid file type '{0}'. Please choose either 'docx' or 'pdf'.")]
    InvalidFileType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Search(String),

    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    ReportWrite(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Mail(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Broad classes of failure, used to decide how an error is reported back
/// to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something is not set up (index id, access token).
    Configuration,
    /// A prerequisite step has not happened yet.
    Precondition,
    /// The caller passed something we refuse to act on.
    Validation,
    /// An external system failed.
    Collaborator,
}

impl DocentError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocentError::Config(_) | DocentError::IndexNotConfigured => ErrorKind::Configuration,
            DocentError::NoReportCached
            | DocentError::NoSavedReport
            | DocentError::SavedReportMissing(_)
            | DocentError::StaleReport
            | DocentError::NoDraftPending => ErrorKind::Precondition,
            DocentError::InvalidFileType(_)
            | DocentError::InvalidInput(_)
            | DocentError::UnknownTool(_) => ErrorKind::Validation,
            _ => ErrorKind::Collaborator,
        }
    }
}

/// Result type alias for Docent operations.
pub type Result<T> = std::result::Result<T, DocentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(DocentError::NoDraftPending.kind(), ErrorKind::Precondition);
        assert_eq!(DocentError::IndexNotConfigured.kind(), ErrorKind::Configuration);
        assert_eq!(
            DocentError::InvalidFileType("xml".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DocentError::Mail("smtp down".to_string()).kind(),
            ErrorKind::Collaborator
        );
    }

    #[test]
    fn test_invalid_file_type_message() {
        let msg = DocentError::InvalidFileType("xml".to_string()).to_string();
        assert!(msg.contains("'xml'"));
        assert!(msg.contains("docx"));
        assert!(msg.contains("pdf"));
    }
}
