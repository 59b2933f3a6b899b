//! Session-scoped cache of the most recently generated report.

use crate::error::{DocentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Output shape requested for a research report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Short newsy brief with dates.
    DailyUpdate,
    /// Weekly teaching brief (concepts, demos, exercises).
    #[default]
    LessonBrief,
    /// Deeper dive with landscape and sources.
    ResearchReport,
}

impl ReportFormat {
    /// Parse a format name, falling back to [`ReportFormat::LessonBrief`]
    /// for anything unrecognized.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "daily_update" => ReportFormat::DailyUpdate,
            "lesson_brief" => ReportFormat::LessonBrief,
            "research_report" => ReportFormat::ResearchReport,
            other => {
                debug!("Unrecognized report format '{}', using lesson_brief", other);
                ReportFormat::default()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::DailyUpdate => "daily_update",
            ReportFormat::LessonBrief => "lesson_brief",
            ReportFormat::ResearchReport => "research_report",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generated report held for the duration of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    /// Identifies this particular recording of a report.
    pub id: Uuid,
    pub topic: String,
    pub format: ReportFormat,
    pub content: String,
    /// Where the current content was persisted, if it has been.
    pub saved_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl ReportArtifact {
    /// Whether the recorded file still exists on disk.
    pub fn saved_file_exists(&self) -> bool {
        self.saved_path.as_deref().is_some_and(Path::exists)
    }
}

/// Holds at most one current report.
///
/// Every read and write goes through a single lock so a save always sees a
/// consistent report/path pair.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    current: Mutex<Option<ReportArtifact>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached report. Any previously saved path is dropped with
    /// the old report.
    pub fn record_report(&self, topic: &str, format: ReportFormat, content: &str) -> ReportArtifact {
        let report = ReportArtifact {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            format,
            content: content.to_string(),
            saved_path: None,
            created_at: Utc::now(),
        };

        *self.lock() = Some(report.clone());
        debug!("Recorded report {} on '{}'", report.id, report.topic);
        report
    }

    /// Mark whatever report is cached right now as saved at `path`.
    pub fn mark_saved(&self, path: &Path) -> Result<ReportArtifact> {
        let mut guard = self.lock();
        let report = guard.as_mut().ok_or(DocentError::NoReportCached)?;
        report.saved_path = Some(path.to_path_buf());
        Ok(report.clone())
    }

    /// Mark the report identified by `id` as saved at `path`.
    ///
    /// Fails with [`DocentError::StaleReport`] when a newer report replaced it
    /// while the file was being written.
    pub fn mark_saved_for(&self, id: Uuid, path: &Path) -> Result<ReportArtifact> {
        let mut guard = self.lock();
        let report = guard.as_mut().ok_or(DocentError::NoReportCached)?;
        if report.id != id {
            return Err(DocentError::StaleReport);
        }
        report.saved_path = Some(path.to_path_buf());
        Ok(report.clone())
    }

    /// Snapshot of the cached report, if any.
    pub fn current(&self) -> Option<ReportArtifact> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ReportArtifact>> {
        // State is a plain value; a panic elsewhere cannot leave it half-written.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fallback() {
        assert_eq!(ReportFormat::parse_or_default("daily_update"), ReportFormat::DailyUpdate);
        assert_eq!(ReportFormat::parse_or_default(" Research_Report "), ReportFormat::ResearchReport);
        assert_eq!(ReportFormat::parse_or_default("haiku"), ReportFormat::LessonBrief);
        assert_eq!(ReportFormat::parse_or_default(""), ReportFormat::LessonBrief);
    }

    #[test]
    fn test_mark_saved_requires_report() {
        let cache = ArtifactCache::new();
        let err = cache.mark_saved(Path::new("/tmp/x.docx")).unwrap_err();
        assert!(matches!(err, DocentError::NoReportCached));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_record_clears_saved_path() {
        let cache = ArtifactCache::new();
        cache.record_report("transformers", ReportFormat::ResearchReport, "body");
        cache.mark_saved(Path::new("/tmp/a.pdf")).unwrap();
        assert!(cache.current().unwrap().saved_path.is_some());

        cache.record_report("agents", ReportFormat::DailyUpdate, "other body");
        let current = cache.current().unwrap();
        assert_eq!(current.topic, "agents");
        assert!(current.saved_path.is_none());
    }

    #[test]
    fn test_mark_saved_for_rejects_replaced_report() {
        let cache = ArtifactCache::new();
        let first = cache.record_report("a", ReportFormat::LessonBrief, "one");
        let second = cache.record_report("b", ReportFormat::LessonBrief, "two");

        let err = cache
            .mark_saved_for(first.id, Path::new("/tmp/a.docx"))
            .unwrap_err();
        assert!(matches!(err, DocentError::StaleReport));
        assert!(cache.current().unwrap().saved_path.is_none());

        let saved = cache.mark_saved_for(second.id, Path::new("/tmp/b.docx")).unwrap();
        assert_eq!(saved.saved_path, Some(PathBuf::from("/tmp/b.docx")));
    }

    #[test]
    fn test_saved_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        std::fs::write(&path, b"x").unwrap();

        let cache = ArtifactCache::new();
        cache.record_report("t", ReportFormat::LessonBrief, "c");
        let report = cache.mark_saved(&path).unwrap();
        assert!(report.saved_file_exists());

        std::fs::remove_file(&path).unwrap();
        assert!(!cache.current().unwrap().saved_file_exists());
    }
}
