//! Report writer for the local file system.

use super::docx::write_docx;
use super::pdf::write_pdf;
use super::{report_file_name, report_title, FileType, ReportWriter};
use crate::error::{DocentError, Result};
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Writes reports into a preferred directory, falling back to a second
/// directory when the first cannot be written.
#[derive(Debug, Clone)]
pub struct LocalReportWriter {
    primary: PathBuf,
    fallback: PathBuf,
}

impl LocalReportWriter {
    /// Create a new writer.
    pub fn new(primary: PathBuf, fallback: PathBuf) -> Self {
        Self { primary, fallback }
    }

    fn write_into(dir: &Path, file_name: &str, title: &str, content: &str, kind: FileType) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        match kind {
            FileType::Docx => write_docx(&path, title, content)?,
            FileType::Pdf => write_pdf(&path, title, content)?,
        }
        Ok(path)
    }

    fn write_blocking(&self, content: &str, topic: &str, kind: FileType) -> Result<PathBuf> {
        let file_name = report_file_name(topic, kind, Local::now());
        let title = report_title(topic);

        match Self::write_into(&self.primary, &file_name, &title, content, kind) {
            Ok(path) => Ok(path),
            Err(primary_err) => {
                warn!(
                    "Could not write report to {}: {}. Trying {}",
                    self.primary.display(),
                    primary_err,
                    self.fallback.display()
                );
                Self::write_into(&self.fallback, &file_name, &title, content, kind).map_err(
                    |fallback_err| {
                        DocentError::ReportWrite(format!(
                            "could not write to {} ({}) or {} ({})",
                            self.primary.display(),
                            primary_err,
                            self.fallback.display(),
                            fallback_err
                        ))
                    },
                )
            }
        }
    }
}

#[async_trait]
impl ReportWriter for LocalReportWriter {
    #[instrument(skip(self, content, kind), fields(kind = %kind))]
    async fn write(&self, content: &str, topic: &str, kind: FileType) -> Result<PathBuf> {
        let writer = self.clone();
        let content = content.to_string();
        let topic = topic.to_string();

        let path = tokio::task::spawn_blocking(move || writer.write_blocking(&content, &topic, kind))
            .await
            .map_err(|e| DocentError::ReportWrite(format!("writer task failed: {}", e)))??;

        info!("Saved report to {}", path.display());
        Ok(path)
    }
}
