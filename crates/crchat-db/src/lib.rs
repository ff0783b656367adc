pub mod actions;
pub mod document;
pub mod error;
pub mod members;
pub mod messages;

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::info;

use crchat_types::models::{Action, NewAction};

pub use actions::Actions;
pub use document::{Backend, Document, FileBackend, MemoryBackend};
pub use error::{Result, StoreError};
pub use members::Members;
pub use messages::{MessageOutcome, Messages, SkipReason};

/// Where the three chat documents live.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub members: PathBuf,
    pub actions: PathBuf,
    pub messages: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            members: "data/members.json".into(),
            actions: "data/actions.json".into(),
            messages: "data/messages.json".into(),
        }
    }
}

/// The server's three collections. Each owns its own document.
pub struct ChatStore {
    pub members: Members,
    pub actions: Actions,
    pub messages: Messages,
    /// Held across a messages write and its action append, so the log order
    /// matches the order changes reached the messages document.
    write_order: Mutex<()>,
}

impl ChatStore {
    pub fn open(paths: &DataPaths) -> Result<Self> {
        let store = Self {
            members: Members::open(FileBackend::new(&paths.members))?,
            actions: Actions::open(FileBackend::new(&paths.actions))?,
            messages: Messages::open(FileBackend::new(&paths.messages))?,
            write_order: Mutex::new(()),
        };
        info!(
            "Chat store opened ({} messages, {} actions)",
            store.messages.size()?,
            store.actions.size()?
        );
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            members: Members::open(MemoryBackend::new("members"))?,
            actions: Actions::open(MemoryBackend::new("actions"))?,
            messages: Messages::open(MemoryBackend::new("messages"))?,
            write_order: Mutex::new(()),
        })
    }

    /// Apply `item` to the messages, then log it. The action is logged even
    /// when the messages document skipped it. A posted message is logged
    /// under the id it actually received.
    pub fn record(&self, item: &NewAction) -> Result<(MessageOutcome, Action)> {
        let _order = self
            .write_order
            .lock()
            .map_err(|_| StoreError::LockPoisoned("chat store".into()))?;

        let outcome = self.messages.add(item)?;
        let action = match outcome {
            MessageOutcome::Posted { id } => self.actions.add(&NewAction {
                message_id: Some(id as i64),
                ..item.clone()
            })?,
            _ => self.actions.add(item)?,
        };
        Ok((outcome, action))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crchat_types::models::ActionType;

    use super::*;

    #[test]
    fn record_logs_posted_message_under_its_real_id() {
        let store = ChatStore::in_memory().unwrap();
        let (outcome, action) = store.record(&NewAction::message("alice", 42, "hi")).unwrap();

        assert_eq!(outcome, MessageOutcome::Posted { id: 0 });
        assert_eq!(action.message_id.as_deref(), Some("0"));
    }

    #[test]
    fn record_logs_skipped_comment() {
        let store = ChatStore::in_memory().unwrap();
        let (outcome, action) = store.record(&NewAction::comment("alice", 3, "hello?")).unwrap();

        assert!(matches!(outcome, MessageOutcome::Skipped(_)));
        assert_eq!(action.action_type, ActionType::AddComment);
        assert_eq!(store.messages.size().unwrap(), 0);
        assert_eq!(store.actions.size().unwrap(), 1);
    }

    #[test]
    fn concurrent_records_keep_log_in_message_order() {
        let store = Arc::new(ChatStore::in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        let text = format!("{}-{}", t, i);
                        store.record(&NewAction::message("alice", 0, text)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let messages = store.messages.get().unwrap();
        let actions = store.actions.get().unwrap();
        assert_eq!(messages.len(), 80);
        assert_eq!(actions.len(), 80);
        for (message, action) in messages.iter().zip(&actions) {
            assert_eq!(action.message_id, Some(message.id.to_string()));
            assert_eq!(action.content, message.content);
        }
    }
}
