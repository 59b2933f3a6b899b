//! Confirmation gate for outbound email.

use crate::error::{DocentError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// An email draft waiting for the user to confirm sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Holds at most one unsent draft.
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    pending: Mutex<Option<PendingEmail>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a draft, silently replacing any unsent one.
    pub fn stage_draft(&self, to: &str, subject: &str, body: &str) -> PendingEmail {
        let draft = PendingEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        let previous = self.lock().replace(draft.clone());
        if let Some(old) = previous {
            debug!("Discarded unsent draft to {}", old.to);
        }
        draft
    }

    /// Remove and return the staged draft.
    ///
    /// The gate is empty as soon as this returns, so a concurrent caller
    /// cannot obtain the same draft.
    pub fn take_for_send(&self) -> Result<PendingEmail> {
        self.lock().take().ok_or(DocentError::NoDraftPending)
    }

    /// Peek at the staged draft without consuming it.
    pub fn current(&self) -> Option<PendingEmail> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingEmail>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_once() {
        let gate = ConfirmationGate::new();
        gate.stage_draft("a@x.com", "Hi", "Body");

        let draft = gate.take_for_send().unwrap();
        assert_eq!(draft.to, "a@x.com");
        assert!(gate.is_empty());
        assert!(matches!(gate.take_for_send(), Err(DocentError::NoDraftPending)));
    }

    #[test]
    fn test_newest_draft_wins() {
        let gate = ConfirmationGate::new();
        gate.stage_draft("old@x.com", "Old", "old body");
        gate.stage_draft("new@x.com", "New", "new body");

        assert_eq!(gate.current().unwrap().subject, "New");
        assert_eq!(gate.take_for_send().unwrap().to, "new@x.com");
    }

    #[test]
    fn test_current_does_not_consume() {
        let gate = ConfirmationGate::new();
        assert!(gate.current().is_none());
        gate.stage_draft("a@x.com", "S", "B");
        assert!(gate.current().is_some());
        assert!(gate.current().is_some());
    }
}
