//! Speaking short lines back to the user.
//!
//! The real voice transport lives outside this crate; these speakers cover
//! the terminal and headless modes.

use crate::error::Result;
use async_trait::async_trait;
use console::style;
use tracing::info;

/// Trait for anything that can say a line aloud.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn say(&self, text: &str) -> Result<()>;
}

/// Prints spoken lines to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

#[async_trait]
impl Speaker for ConsoleSpeaker {
    async fn say(&self, text: &str) -> Result<()> {
        println!("{} {}", style("Docent (speaking):").magenta().bold(), text);
        Ok(())
    }
}

/// Records spoken lines in the log. Used when stdout is reserved for a protocol.
#[derive(Debug, Default)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn say(&self, text: &str) -> Result<()> {
        info!(spoken = %text, "say");
        Ok(())
    }
}

/// First line of `text`, cut to at most `max_chars` characters.
pub fn spoken_preview(text: &str, max_chars: usize) -> Option<String> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(first.chars().take(max_chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_preview() {
        assert_eq!(spoken_preview("TL;DR\nmore", 220).as_deref(), Some("TL;DR"));
        assert_eq!(spoken_preview("\n\n  Hello  \nx", 220).as_deref(), Some("Hello"));
        assert_eq!(spoken_preview("abcdef", 3).as_deref(), Some("abc"));
        assert_eq!(spoken_preview("ééééé", 2).as_deref(), Some("éé"));
        assert!(spoken_preview("   \n ", 10).is_none());
    }

    #[test]
    fn test_log_speaker_never_fails() {
        assert!(tokio_test::block_on(LogSpeaker.say("Research ready.")).is_ok());
    }
}
