use tracing::info;

use crchat_types::models::{ActionType, Comment, Message, NewAction, ReactionKind};

use crate::document::{Backend, Document, check_sequence};
use crate::error::Result;

/// What applying an action did to the messages document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Posted { id: u64 },
    Commented { id: u64 },
    Reacted { id: u64, kind: ReactionKind },
    /// The document was left unchanged.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `message_id` is absent or outside `[0, size)`.
    UnknownMessage { message_id: Option<i64>, size: usize },
    UnsupportedReaction(String),
    /// The action does not touch messages (sign-ups).
    NotAMessageAction,
}

/// The materialized chat: messages with their comments and reaction counts.
pub struct Messages {
    doc: Document<Vec<Message>>,
}

impl Messages {
    pub fn open(backend: impl Backend + 'static) -> Result<Self> {
        Ok(Self {
            doc: Document::open(backend, Vec::new())?,
        })
    }

    /// Apply `item` according to its action type.
    ///
    /// Comments and reactions that reference a missing message, and reactions
    /// of an unsupported kind, are logged and skipped.
    pub fn add(&self, item: &NewAction) -> Result<MessageOutcome> {
        let resource = self.doc.name().to_string();
        self.doc.transact(|messages| {
            check_sequence(&resource, messages)?;
            Ok(match item.action_type {
                ActionType::AddMessage => add_message(messages, item),
                ActionType::AddComment => add_comment(messages, item),
                ActionType::AddReaction => add_reaction(messages, item),
                ActionType::SignUp => MessageOutcome::Skipped(SkipReason::NotAMessageAction),
            })
        })
    }

    pub fn get(&self) -> Result<Vec<Message>> {
        self.doc.load()
    }

    pub fn get_serialized(&self) -> Result<String> {
        self.doc.load_raw()
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.doc.load()?.len())
    }
}

fn add_message(messages: &mut Vec<Message>, item: &NewAction) -> MessageOutcome {
    let id = messages.len() as u64;
    messages.push(Message::new(id, item.login.clone(), item.content.clone()));
    info!("New message \"{}\" with id {} by {}", item.content, id, item.login);
    MessageOutcome::Posted { id }
}

fn add_comment(messages: &mut [Message], item: &NewAction) -> MessageOutcome {
    let Some(index) = resolve(messages, item.message_id) else {
        return unknown_message(messages, item.message_id);
    };

    let message = &mut messages[index];
    message.comments.push(Comment {
        login: item.login.clone(),
        content: item.content.clone(),
    });
    info!("Comment \"{}\" for message {} by {}", item.content, message.id, item.login);
    MessageOutcome::Commented { id: message.id }
}

fn add_reaction(messages: &mut [Message], item: &NewAction) -> MessageOutcome {
    let Some(index) = resolve(messages, item.message_id) else {
        return unknown_message(messages, item.message_id);
    };
    let Ok(kind) = item.content.parse::<ReactionKind>() else {
        info!("Reaction \"{}\" is not supported, skipping", item.content);
        return MessageOutcome::Skipped(SkipReason::UnsupportedReaction(item.content.clone()));
    };

    let message = &mut messages[index];
    message.reactions.increment(kind);
    info!("Reaction \"{}\" for message {} by {}", kind, message.id, item.login);
    MessageOutcome::Reacted { id: message.id, kind }
}

fn resolve(messages: &[Message], message_id: Option<i64>) -> Option<usize> {
    let index = usize::try_from(message_id?).ok()?;
    (index < messages.len()).then_some(index)
}

fn unknown_message(messages: &[Message], message_id: Option<i64>) -> MessageOutcome {
    info!(
        "Message id {:?} is incorrect: storage's size is {}",
        message_id,
        messages.len()
    );
    MessageOutcome::Skipped(SkipReason::UnknownMessage {
        message_id,
        size: messages.len(),
    })
}
