//! Persisting research reports to document files.

mod docx;
mod local;
mod pdf;

pub use local::LocalReportWriter;

use crate::error::{DocentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Supported report file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Pdf,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Docx => "docx",
            FileType::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for FileType {
    type Err = DocentError;

    /// Unlike report formats there is no fallback: anything other than
    /// docx or pdf is rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "docx" => Ok(FileType::Docx),
            "pdf" => Ok(FileType::Pdf),
            _ => Err(DocentError::InvalidFileType(s.to_string())),
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Trait for report writers.
#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Write `content` as a document about `topic` and return where it landed.
    async fn write(&self, content: &str, topic: &str, kind: FileType) -> Result<PathBuf>;
}

/// Title placed at the top of every saved report.
pub fn report_title(topic: &str) -> String {
    format!("Research Report: {}", topic)
}

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Turn a topic into a short, file-name-safe slug.
pub fn slugify(topic: &str) -> String {
    let lowered = topic.to_lowercase();
    let slug = NON_SLUG.replace_all(&lowered, "-");
    let slug: String = slug.trim_matches('-').chars().take(60).collect();
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "report".to_string()
    } else {
        slug.to_string()
    }
}

/// File name for a report saved at `at`.
pub fn report_file_name(topic: &str, kind: FileType, at: DateTime<Local>) -> String {
    format!(
        "research_report-{}-{}.{}",
        slugify(topic),
        at.format("%Y-%m-%d-%H-%M-%S"),
        kind.extension()
    )
}
