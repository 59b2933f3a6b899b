//! Tool orchestration for Docent.
//!
//! Checks each tool call against the session state, delegates to the
//! collaborators and applies state changes only after the collaborator
//! succeeded.

use crate::agent::ToolCall;
use crate::config::{Prompts, Settings};
use crate::error::{DocentError, ErrorKind, Result};
use crate::llm::{OpenAIGenerator, TextGenerator};
use crate::mail::{parse_draft, validate_recipient, GmailTransport, MailTransport, SentMessage};
use crate::report::{FileType, LocalReportWriter, ReportWriter};
use crate::search::{ResponsesSearch, SearchBackend, SearchMode, SearchOptions};
use crate::session::{PendingEmail, ReportFormat, Session};
use crate::speech::{spoken_preview, ConsoleSpeaker, Speaker};
use crate::storage::{CloudStorage, DriveStorage, UploadedFile};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Spoken when a report has no usable first line.
const FALLBACK_PREVIEW: &str = "Research ready.";

/// External systems the orchestrator delegates to.
#[derive(Clone)]
pub struct Collaborators {
    pub search: Arc<dyn SearchBackend>,
    pub generator: Arc<dyn TextGenerator>,
    pub writer: Arc<dyn ReportWriter>,
    pub storage: Arc<dyn CloudStorage>,
    pub mail: Arc<dyn MailTransport>,
    pub speaker: Arc<dyn Speaker>,
}

impl Collaborators {
    /// Build the production collaborators from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            search: Arc::new(ResponsesSearch::new(
                &settings.search.model,
                settings.search.index_id(),
                &settings.search.search_context_size,
            )),
            generator: Arc::new(OpenAIGenerator::new(&settings.assistant.model)),
            writer: Arc::new(LocalReportWriter::new(
                settings.report_dir(),
                settings.report_fallback_dir(),
            )),
            storage: Arc::new(DriveStorage::new(
                settings.drive.access_token.as_deref(),
                settings.drive.default_folder_id.as_deref(),
            )),
            mail: Arc::new(GmailTransport::new(
                settings.mail.access_token.as_deref(),
                &settings.mail.sender,
            )),
            speaker: Arc::new(ConsoleSpeaker),
        }
    }

    /// Replace the speaker.
    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }
}

/// Text result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub text: String,
    /// Whether the tool failed or was refused.
    pub is_error: bool,
}

/// The orchestrator for one conversational session.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    collaborators: Collaborators,
    session: Session,
}

impl Orchestrator {
    /// Create a new orchestrator with the default collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let collaborators = Collaborators::from_settings(&settings);
        Self::with_collaborators(settings, collaborators)
    }

    /// Create an orchestrator with the given collaborators, loading prompts from settings.
    pub fn with_collaborators(settings: Settings, collaborators: Collaborators) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        Ok(Self::with_components(settings, prompts, collaborators))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(settings: Settings, prompts: Prompts, collaborators: Collaborators) -> Self {
        let session = Session::new();
        info!("Started session {}", session.id());
        Self {
            settings,
            prompts,
            collaborators,
            session,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the prompts.
    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Get the session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Answer a question from the web.
    #[instrument(skip(self))]
    pub async fn web_search(&self, query: &str) -> Result<String> {
        let options = SearchOptions::with_instructions(&self.prompts.assistant.search);
        self.collaborators
            .search
            .search(query, &[SearchMode::Web], &options)
            .await
    }

    /// Answer a question from the internal document index.
    #[instrument(skip(self))]
    pub async fn file_search(&self, query: &str) -> Result<String> {
        self.require_index()?;
        let options = SearchOptions::with_instructions(&self.prompts.assistant.search);
        self.collaborators
            .search
            .search(query, &[SearchMode::Index], &options)
            .await
    }

    /// Build a report from the index and the web, cache it and speak its first line.
    ///
    /// `max_sources` and `recency_hint` fall back to the configured defaults.
    #[instrument(skip(self, format, max_sources, recency_hint), fields(format = %format))]
    pub async fn deep_research_report(
        &self,
        topic: &str,
        format: ReportFormat,
        max_sources: Option<u32>,
        recency_hint: Option<&str>,
    ) -> Result<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DocentError::InvalidInput("topic must not be empty".to_string()));
        }
        self.require_index()?;

        let max_sources = max_sources.unwrap_or(self.settings.reports.max_sources);
        let recency_hint = recency_hint.unwrap_or(self.settings.reports.recency_hint.as_str());
        let instruction = self
            .prompts
            .research_instruction(topic, format, max_sources, recency_hint);

        let content = self
            .collaborators
            .search
            .search(
                &instruction,
                &[SearchMode::Index, SearchMode::Web],
                &SearchOptions::default(),
            )
            .await?;

        if content.trim().is_empty() {
            return Err(DocentError::Search("the research call returned no text".to_string()));
        }

        let report = self.session.reports.record_report(topic, format, &content);
        info!("Cached {} report on '{}' ({} chars)", report.format, report.topic, content.len());

        let preview = spoken_preview(&content, self.settings.reports.preview_chars)
            .unwrap_or_else(|| FALLBACK_PREVIEW.to_string());
        self.speak(&preview).await;

        Ok(content)
    }

    /// Save the cached report as a document and record where it went.
    #[instrument(skip(self))]
    pub async fn save_last_report(&self, file_type: &str) -> Result<PathBuf> {
        let kind: FileType = file_type.parse()?;
        let report = self
            .session
            .reports
            .current()
            .ok_or(DocentError::NoReportCached)?;

        let path = self
            .collaborators
            .writer
            .write(&report.content, &report.topic, kind)
            .await?;

        self.session.reports.mark_saved_for(report.id, &path)?;
        info!("Saved report '{}' to {}", report.topic, path.display());

        self.speak(&format!("I've saved your research report to: {}", path.display()))
            .await;
        Ok(path)
    }

    /// Upload the saved report file and return its shareable link.
    #[instrument(skip(self))]
    pub async fn upload_last_report(&self, folder_id: Option<&str>) -> Result<UploadedFile> {
        let report = self
            .session
            .reports
            .current()
            .ok_or(DocentError::NoSavedReport)?;
        let path = report.saved_path.clone().ok_or(DocentError::NoSavedReport)?;
        if !report.saved_file_exists() {
            return Err(DocentError::SavedReportMissing(path.display().to_string()));
        }

        let uploaded = self.collaborators.storage.upload(&path, folder_id).await?;
        info!("Uploaded {} as {}", path.display(), uploaded.id);
        Ok(uploaded)
    }

    /// Generate an email draft and stage it for confirmation. Never sends.
    #[instrument(skip(self, extra_context))]
    pub async fn compose_email(
        &self,
        to: &str,
        topic: &str,
        extra_context: Option<&str>,
    ) -> Result<PendingEmail> {
        let to = validate_recipient(to)?;
        let prompt = self.prompts.email_request(to, topic, extra_context);

        let text = self
            .collaborators
            .generator
            .generate(&self.prompts.email.system, &prompt)
            .await?;

        let (subject, body) = parse_draft(&text, topic);
        Ok(self.session.drafts.stage_draft(to, &subject, &body))
    }

    /// Send the staged draft.
    ///
    /// The draft is consumed before the transport call and is not restored if
    /// the send fails.
    #[instrument(skip(self))]
    pub async fn send_email(&self) -> Result<SentMessage> {
        let draft = self.session.drafts.take_for_send()?;
        let sent = self
            .collaborators
            .mail
            .send(&draft.to, &draft.subject, &draft.body)
            .await?;
        info!("Sent '{}' to {} ({})", draft.subject, draft.to, sent.id);
        Ok(sent)
    }

    /// Run a tool call and render its outcome as text for the conversation.
    pub async fn execute(&self, call: &ToolCall) -> String {
        self.run_tool(call).await.text
    }

    /// Run a tool call, keeping track of whether it failed.
    #[instrument(skip(self, call), fields(tool = call.name()))]
    pub async fn run_tool(&self, call: &ToolCall) -> ToolOutcome {
        let outcome = match call {
            ToolCall::WebSearch { query } => self
                .web_search(query)
                .await
                .map_err(|e| render_error("Search error", e)),
            ToolCall::FileSearch { query } => self
                .file_search(query)
                .await
                .map_err(|e| render_error("File search error", e)),
            ToolCall::DeepResearchReport {
                topic,
                format,
                max_sources,
                recency_hint,
            } => self
                .deep_research_report(topic, *format, *max_sources, recency_hint.as_deref())
                .await
                .map_err(|e| render_error("Deep research error", e)),
            ToolCall::SaveLastReport { file_type } => self
                .save_last_report(file_type)
                .await
                .map(|path| format!("Report saved at {}", path.display()))
                .map_err(|e| render_error("Save error", e)),
            ToolCall::UploadLastReportToDrive { folder_id } => self
                .upload_last_report(folder_id.as_deref())
                .await
                .map(|file| format!("Uploaded to Google Drive: {}", file.link))
                .map_err(|e| render_error("Upload error", e)),
            ToolCall::ComposeEmail {
                to,
                topic,
                extra_context,
            } => self
                .compose_email(to, topic, extra_context.as_deref())
                .await
                .map(|draft| {
                    format!(
                        "Draft ready for review. Ask the user to confirm before sending.\n\nTo: {}\nSubject: {}\n\n{}",
                        draft.to, draft.subject, draft.body
                    )
                })
                .map_err(|e| render_error("Email draft error", e)),
            ToolCall::SendEmail => self
                .send_email()
                .await
                .map(|sent| format!("Email sent (message id: {})", sent.id))
                .map_err(|e| match e.kind() {
                    ErrorKind::Collaborator => format!(
                        "Send error: {}. The draft was discarded; compose the email again to retry.",
                        e
                    ),
                    _ => e.to_string(),
                }),
        };

        match outcome {
            Ok(text) => ToolOutcome {
                text,
                is_error: false,
            },
            Err(text) => {
                warn!("{} failed: {}", call.name(), text);
                ToolOutcome {
                    text,
                    is_error: true,
                }
            }
        }
    }

    fn require_index(&self) -> Result<()> {
        if self.collaborators.search.index_configured() {
            Ok(())
        } else {
            Err(DocentError::IndexNotConfigured)
        }
    }

    async fn speak(&self, text: &str) {
        if let Err(e) = self.collaborators.speaker.say(text).await {
            warn!("Could not speak: {}", e);
        }
    }
}

/// Precondition, configuration and validation errors read as-is; collaborator
/// failures carry the tool's label.
fn render_error(label: &str, error: DocentError) -> String {
    match error.kind() {
        ErrorKind::Collaborator => format!("{}: {}", label, error),
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeSearch {
        index: bool,
        reply: Mutex<String>,
        fail: bool,
        calls: Mutex<Vec<Vec<SearchMode>>>,
    }

    impl FakeSearch {
        fn new(index: bool, reply: &str) -> Self {
            Self {
                index,
                reply: Mutex::new(reply.to_string()),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(index: bool) -> Self {
            Self {
                fail: true,
                ..Self::new(index, "")
            }
        }
    }

    #[async_trait]
    impl SearchBackend for FakeSearch {
        async fn search(&self, _query: &str, modes: &[SearchMode], _options: &SearchOptions) -> Result<String> {
            self.calls.lock().unwrap().push(modes.to_vec());
            if self.fail {
                return Err(DocentError::Search("backend unavailable".to_string()));
            }
            Ok(self.reply.lock().unwrap().clone())
        }

        fn index_configured(&self) -> bool {
            self.index
        }
    }

    struct FakeGenerator {
        replies: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| DocentError::Generation("model unavailable".to_string()))
        }
    }

    struct FakeWriter {
        dir: PathBuf,
        fail: bool,
    }

    #[async_trait]
    impl ReportWriter for FakeWriter {
        async fn write(&self, content: &str, topic: &str, kind: FileType) -> Result<PathBuf> {
            if self.fail {
                return Err(DocentError::ReportWrite("disk full".to_string()));
            }
            let path = self.dir.join(format!("{}.{}", topic.replace(' ', "_"), kind.extension()));
            std::fs::write(&path, content)?;
            Ok(path)
        }
    }

    #[derive(Default)]
    struct FakeStorage {
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl CloudStorage for FakeStorage {
        async fn upload(&self, path: &Path, _folder_id: Option<&str>) -> Result<UploadedFile> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(UploadedFile {
                id: "file-1".to_string(),
                link: format!("https://drive.example/{}", path.display()),
            })
        }
    }

    #[derive(Default)]
    struct FakeMail {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl MailTransport for FakeMail {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<SentMessage> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(DocentError::Mail("smtp down".to_string()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(SentMessage {
                id: format!("msg-{}", sent.len()),
            })
        }
    }

    #[derive(Default)]
    struct FakeSpeaker {
        lines: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Speaker for FakeSpeaker {
        async fn say(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(DocentError::Config("no audio device".to_string()));
            }
            self.lines.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        search: Arc<FakeSearch>,
        storage: Arc<FakeStorage>,
        mail: Arc<FakeMail>,
        speaker: Arc<FakeSpeaker>,
        _dir: tempfile::TempDir,
    }

    struct Setup {
        search: FakeSearch,
        generator: FakeGenerator,
        writer_fails: bool,
        mail: FakeMail,
        speaker: FakeSpeaker,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                search: FakeSearch::new(true, "TL;DR: diffusion models denoise.\n\nDetails follow."),
                generator: FakeGenerator::new(&["Subject: Demo recap\n\nHi,\n\nThe demo went well."]),
                writer_fails: false,
                mail: FakeMail::default(),
                speaker: FakeSpeaker::default(),
            }
        }
    }

    fn harness(setup: Setup) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let search = Arc::new(setup.search);
        let storage = Arc::new(FakeStorage::default());
        let mail = Arc::new(setup.mail);
        let speaker = Arc::new(setup.speaker);

        let collaborators = Collaborators {
            search: search.clone(),
            generator: Arc::new(setup.generator),
            writer: Arc::new(FakeWriter {
                dir: dir.path().to_path_buf(),
                fail: setup.writer_fails,
            }),
            storage: storage.clone(),
            mail: mail.clone(),
            speaker: speaker.clone(),
        };

        Harness {
            orchestrator: Orchestrator::with_components(
                Settings::default(),
                Prompts::default(),
                collaborators,
            ),
            search,
            storage,
            mail,
            speaker,
            _dir: dir,
        }
    }

    fn research(topic: &str, format: &str) -> ToolCall {
        ToolCall::DeepResearchReport {
            topic: topic.to_string(),
            format: ReportFormat::parse_or_default(format),
            max_sources: None,
            recency_hint: None,
        }
    }

    fn save(file_type: &str) -> ToolCall {
        ToolCall::SaveLastReport {
            file_type: file_type.to_string(),
        }
    }

    fn compose(to: &str, topic: &str) -> ToolCall {
        ToolCall::ComposeEmail {
            to: to.to_string(),
            topic: topic.to_string(),
            extra_context: None,
        }
    }

    #[tokio::test]
    async fn test_save_before_report_fails() {
        let h = harness(Setup::default());
        let err = h.orchestrator.save_last_report("docx").await.unwrap_err();
        assert!(matches!(err, DocentError::NoReportCached));

        let text = h.orchestrator.execute(&save("docx")).await;
        assert!(text.contains("No report cached"));
    }

    #[tokio::test]
    async fn test_research_save_scenario() {
        let h = harness(Setup::default());
        let o = &h.orchestrator;

        let text = o.execute(&research("diffusion models", "research_report")).await;
        assert!(text.starts_with("TL;DR"));

        let cached = o.session().reports.current().unwrap();
        assert_eq!(cached.topic, "diffusion models");
        assert_eq!(cached.format, ReportFormat::ResearchReport);
        assert!(cached.saved_path.is_none());
        assert_eq!(h.search.calls.lock().unwrap()[0], vec![SearchMode::Index, SearchMode::Web]);
        assert_eq!(
            h.speaker.lines.lock().unwrap()[0],
            "TL;DR: diffusion models denoise."
        );

        let text = o.execute(&save("docx")).await;
        assert!(text.starts_with("Report saved at "));
        let saved = o.session().reports.current().unwrap().saved_path.unwrap();
        assert!(saved.exists());
        assert_eq!(saved.extension().unwrap(), "docx");

        let text = o.execute(&save("xml")).await;
        assert!(text.contains("Invalid file type 'xml'"));
        assert_eq!(o.session().reports.current().unwrap().saved_path, Some(saved));
    }

    #[tokio::test]
    async fn test_invalid_file_type_checked_before_cache() {
        let h = harness(Setup::default());
        let err = h.orchestrator.save_last_report("txt").await.unwrap_err();
        assert!(matches!(err, DocentError::InvalidFileType(_)));
    }

    #[tokio::test]
    async fn test_unknown_format_falls_back_to_lesson_brief() {
        let h = harness(Setup::default());
        h.orchestrator.execute(&research("agents", "sonnet")).await;
        let cached = h.orchestrator.session().reports.current().unwrap();
        assert_eq!(cached.format, ReportFormat::LessonBrief);
    }

    #[tokio::test]
    async fn test_research_requires_index() {
        let h = harness(Setup {
            search: FakeSearch::new(false, "text"),
            ..Setup::default()
        });
        let text = h.orchestrator.execute(&research("agents", "daily_update")).await;
        assert!(text.contains("File search not configured"));
        assert!(h.search.calls.lock().unwrap().is_empty());
        assert!(h.orchestrator.session().reports.is_empty());

        let text = h
            .orchestrator
            .execute(&ToolCall::FileSearch { query: "q".to_string() })
            .await;
        assert!(text.contains("File search not configured"));
    }

    #[tokio::test]
    async fn test_research_failure_leaves_cache_untouched() {
        let h = harness(Setup::default());
        h.orchestrator.execute(&research("first", "lesson_brief")).await;

        let failing = harness(Setup {
            search: FakeSearch::failing(true),
            ..Setup::default()
        });
        let text = failing.orchestrator.execute(&research("second", "lesson_brief")).await;
        assert_eq!(text, "Deep research error: backend unavailable");
        assert!(failing.orchestrator.session().reports.is_empty());

        *h.search.reply.lock().unwrap() = "   ".to_string();
        let text = h.orchestrator.execute(&research("second", "lesson_brief")).await;
        assert!(text.starts_with("Deep research error"));
        assert_eq!(h.orchestrator.session().reports.current().unwrap().topic, "first");
    }

    #[tokio::test]
    async fn test_speaker_failure_does_not_fail_research() {
        let h = harness(Setup {
            speaker: FakeSpeaker {
                fail: true,
                ..FakeSpeaker::default()
            },
            ..Setup::default()
        });
        let content = h
            .orchestrator
            .deep_research_report("agents", ReportFormat::DailyUpdate, Some(3), Some("last week"))
            .await
            .unwrap();
        assert!(content.starts_with("TL;DR"));
    }

    #[tokio::test]
    async fn test_writer_failure_does_not_mark_saved() {
        let h = harness(Setup {
            writer_fails: true,
            ..Setup::default()
        });
        h.orchestrator.execute(&research("agents", "lesson_brief")).await;
        let text = h.orchestrator.execute(&save("pdf")).await;
        assert_eq!(text, "Save error: disk full");
        assert!(h.orchestrator.session().reports.current().unwrap().saved_path.is_none());
    }

    #[tokio::test]
    async fn test_upload_requires_existing_saved_file() {
        let h = harness(Setup::default());
        let o = &h.orchestrator;
        let upload = ToolCall::UploadLastReportToDrive { folder_id: None };

        assert!(matches!(
            o.upload_last_report(None).await.unwrap_err(),
            DocentError::NoSavedReport
        ));

        o.execute(&research("agents", "lesson_brief")).await;
        assert!(o.execute(&upload).await.contains("No saved report"));

        let path = o.save_last_report("pdf").await.unwrap();
        let text = o.execute(&upload).await;
        assert!(text.starts_with("Uploaded to Google Drive: https://drive.example/"));

        std::fs::remove_file(&path).unwrap();
        let err = o.upload_last_report(None).await.unwrap_err();
        assert!(matches!(err, DocentError::SavedReportMissing(_)));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(o.session().reports.current().unwrap().saved_path, Some(path));
    }

    #[tokio::test]
    async fn test_new_report_clears_saved_path() {
        let h = harness(Setup::default());
        let o = &h.orchestrator;

        o.execute(&research("agents", "lesson_brief")).await;
        o.save_last_report("docx").await.unwrap();
        o.execute(&research("transformers", "daily_update")).await;

        assert!(o.session().reports.current().unwrap().saved_path.is_none());
        let err = o.upload_last_report(None).await.unwrap_err();
        assert!(matches!(err, DocentError::NoSavedReport));
        assert_eq!(h.storage.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compose_send_scenario() {
        let h = harness(Setup::default());
        let o = &h.orchestrator;

        let text = o.execute(&compose("a@x.com", "demo")).await;
        assert!(text.contains("Subject: Demo recap"));
        assert!(h.mail.sent.lock().unwrap().is_empty());

        let text = o.execute(&ToolCall::SendEmail).await;
        assert_eq!(text, "Email sent (message id: msg-1)");
        assert!(o.session().drafts.is_empty());

        let text = o.execute(&ToolCall::SendEmail).await;
        assert!(text.contains("No email draft pending"));
        assert_eq!(h.mail.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_newest_draft_is_sent() {
        let h = harness(Setup {
            generator: FakeGenerator::new(&[
                "Subject: First\n\nOld body",
                "Subject: Second\n\nNew body",
            ]),
            ..Setup::default()
        });
        let o = &h.orchestrator;

        o.compose_email("a@x.com", "one", None).await.unwrap();
        o.compose_email("b@y.com", "two", Some("mention Friday")).await.unwrap();
        o.send_email().await.unwrap();

        let sent = h.mail.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            ("b@y.com".to_string(), "Second".to_string(), "New body".to_string())
        );
    }

    #[tokio::test]
    async fn test_compose_failures_leave_gate_untouched() {
        let h = harness(Setup {
            generator: FakeGenerator::new(&[]),
            ..Setup::default()
        });
        let o = &h.orchestrator;

        let text = o.execute(&compose("a@x.com", "demo")).await;
        assert_eq!(text, "Email draft error: model unavailable");
        assert!(o.session().drafts.is_empty());

        let err = o.compose_email("not-an-address", "demo", None).await.unwrap_err();
        assert!(matches!(err, DocentError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_send_failure_consumes_draft() {
        let h = harness(Setup {
            mail: FakeMail {
                fail: true,
                ..FakeMail::default()
            },
            ..Setup::default()
        });
        let o = &h.orchestrator;

        o.compose_email("a@x.com", "demo", None).await.unwrap();
        let text = o.execute(&ToolCall::SendEmail).await;
        assert!(text.starts_with("Send error: smtp down"));
        assert!(text.contains("compose the email again"));
        assert!(o.session().drafts.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sends_deliver_once() {
        let h = harness(Setup {
            mail: FakeMail {
                delay: Some(Duration::from_millis(20)),
                ..FakeMail::default()
            },
            ..Setup::default()
        });
        let o = &h.orchestrator;
        o.compose_email("a@x.com", "demo", None).await.unwrap();

        let (first, second) = tokio::join!(o.send_email(), o.send_email());
        let outcomes = [first, second];

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(DocentError::NoDraftPending))));
        assert_eq!(h.mail.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_tool_flags_errors() {
        let h = harness(Setup::default());
        let outcome = h.orchestrator.run_tool(&ToolCall::SendEmail).await;
        assert!(outcome.is_error);

        let outcome = h
            .orchestrator
            .run_tool(&ToolCall::WebSearch { query: "news".to_string() })
            .await;
        assert!(!outcome.is_error);
        assert!(outcome.text.starts_with("TL;DR"));
    }

    #[tokio::test]
    async fn test_web_search_error_is_labelled() {
        let h = harness(Setup {
            search: FakeSearch::failing(false),
            ..Setup::default()
        });
        let text = h
            .orchestrator
            .execute(&ToolCall::WebSearch { query: "news".to_string() })
            .await;
        assert_eq!(text, "Search error: backend unavailable");
        assert_eq!(h.search.calls.lock().unwrap()[0], vec![SearchMode::Web]);
    }
}
