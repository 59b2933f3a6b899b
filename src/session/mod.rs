//! Per-conversation state.
//!
//! A session owns the latest research report and the pending email draft.
//! Both start empty and are dropped with the session.

mod artifact;
mod gate;

pub use artifact::{ArtifactCache, ReportArtifact, ReportFormat};
pub use gate::{ConfirmationGate, PendingEmail};

use uuid::Uuid;

/// State for one conversational session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    /// Most recent report and its save state.
    pub reports: ArtifactCache,
    /// Draft awaiting send confirmation.
    pub drafts: ConfirmationGate,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            reports: ArtifactCache::new(),
            drafts: ConfirmationGate::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
