//! Local mirrors of the server documents.
//!
//! Each manager validates an incoming snapshot before accepting it, renders
//! it, and only then replaces its cache. A rejected snapshot leaves both the
//! cache and the rendered output untouched.

use tracing::{debug, info};

use crchat_db::document::check_sequence;
use crchat_db::{Backend, Document};
use crchat_types::models::{Action, Message};

use crate::Result;
use crate::render::{console_line, render_transcript};

/// Mirrors the actions log and turns new entries into console lines.
pub struct ConsoleStateManager {
    cache: Document<Vec<Action>>,
}

impl ConsoleStateManager {
    pub fn open(cache: impl Backend + 'static) -> Result<Self> {
        Ok(Self {
            cache: Document::open(cache, Vec::new())?,
        })
    }

    /// Accept a fresh actions log and return the lines for actions not seen
    /// before. The log only grows, so "new" means past the cached length.
    pub fn update(&self, actions: Vec<Action>) -> Result<Vec<String>> {
        check_sequence("server actions", &actions)?;
        let seen = self.cache.load()?.len();
        let lines: Vec<String> = actions.iter().skip(seen).map(console_line).collect();
        if !lines.is_empty() {
            debug!("{} new actions", lines.len());
        }
        self.cache.replace(&actions)?;
        Ok(lines)
    }

    /// Lines for the last `n` cached actions.
    pub fn load_last(&self, n: usize) -> Result<Vec<String>> {
        let actions = self.cache.load()?;
        let start = actions.len().saturating_sub(n);
        Ok(actions[start..].iter().map(console_line).collect())
    }
}

/// Mirrors the messages document and rewrites the transcript on every update.
pub struct FileStateManager {
    transcript: Box<dyn Backend>,
    cache: Document<Vec<Message>>,
}

impl FileStateManager {
    pub fn open(transcript: impl Backend + 'static, cache: impl Backend + 'static) -> Result<Self> {
        Ok(Self {
            transcript: Box::new(transcript),
            cache: Document::open(cache, Vec::new())?,
        })
    }

    pub fn update(&self, messages: Vec<Message>) -> Result<()> {
        check_sequence("server messages", &messages)?;
        self.transcript
            .write(render_transcript(&messages).as_bytes())?;
        info!(
            "Transcript {} rewritten with {} messages",
            self.transcript.describe(),
            messages.len()
        );
        self.cache.replace(&messages)?;
        Ok(())
    }

    pub fn cached(&self) -> Result<Vec<Message>> {
        Ok(self.cache.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use crchat_db::{MemoryBackend, StoreError};
    use crchat_types::models::{NewAction, ReactionKind};

    fn log(items: &[NewAction]) -> Vec<Action> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| item.to_action(i as u64))
            .collect()
    }

    #[test]
    fn console_shows_only_new_actions() {
        let manager = ConsoleStateManager::open(MemoryBackend::new("actions")).unwrap();
        let mut items = vec![NewAction::sign_up("alice", "p1")];

        let lines = manager.update(log(&items)).unwrap();
        assert_eq!(lines, vec!["alice joined the Comment-Reaction Chat!"]);

        assert!(manager.update(log(&items)).unwrap().is_empty());

        items.push(NewAction::message("alice", 0, "hello"));
        items.push(NewAction::reaction("alice", 0, ReactionKind::Fire));
        let lines = manager.update(log(&items)).unwrap();
        assert_eq!(
            lines,
            vec![
                "[#0][alice]: hello",
                "[alice reacted with Fire emoji on message 0]"
            ]
        );
    }

    #[test]
    fn console_resumes_from_cache() {
        let cache = MemoryBackend::new("actions");
        let items = vec![NewAction::sign_up("alice", "p1"), NewAction::message("alice", 0, "hi")];
        ConsoleStateManager::open(cache.clone())
            .unwrap()
            .update(log(&items))
            .unwrap();

        let restarted = ConsoleStateManager::open(cache).unwrap();
        assert!(restarted.update(log(&items)).unwrap().is_empty());
        assert_eq!(restarted.load_last(10).unwrap().len(), 2);
        assert_eq!(restarted.load_last(1).unwrap(), vec!["[#0][alice]: hi"]);
    }

    #[test]
    fn invalid_snapshot_is_rejected() {
        let cache = MemoryBackend::new("actions");
        let manager = ConsoleStateManager::open(cache.clone()).unwrap();
        let mut actions = log(&[NewAction::sign_up("alice", "p1")]);
        actions[0].id = 4;

        let err = manager.update(actions).unwrap_err();
        assert!(matches!(err, ClientError::Store(StoreError::Corrupt { .. })));
        assert_eq!(cache.bytes().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn transcript_is_rewritten_wholesale() {
        let transcript = MemoryBackend::new("ui.txt");
        let manager = FileStateManager::open(transcript.clone(), MemoryBackend::new("messages")).unwrap();

        manager
            .update(vec![Message::new(0, "alice".into(), "hello".into())])
            .unwrap();
        let first = String::from_utf8(transcript.bytes().unwrap()).unwrap();
        assert!(first.starts_with("[#0][alice]: hello\n"));

        let mut messages = manager.cached().unwrap();
        messages.push(Message::new(1, "bob".into(), "later".into()));
        manager.update(messages).unwrap();
        let second = String::from_utf8(transcript.bytes().unwrap()).unwrap();
        assert!(second.starts_with("[#1][bob]: later\n"));
        assert_eq!(manager.cached().unwrap().len(), 2);
    }
}
