//! Pure text rendering of server documents.

use crchat_types::models::{Action, ActionType, Comment, Message, ReactionCounts, ReactionKind};

/// An action as the console shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent<'a> {
    SignUp {
        login: &'a str,
    },
    Message {
        login: &'a str,
        message_id: &'a str,
        content: &'a str,
    },
    Comment {
        login: &'a str,
        message_id: &'a str,
        content: &'a str,
    },
    /// `kind` is `None` when the log holds a reaction we do not know.
    Reaction {
        login: &'a str,
        message_id: &'a str,
        kind: Option<ReactionKind>,
    },
}

impl<'a> From<&'a Action> for ChatEvent<'a> {
    fn from(action: &'a Action) -> Self {
        let login = action.login.as_str();
        let message_id = action.message_id.as_deref().unwrap_or("?");
        let content = action.content.as_str();
        match action.action_type {
            ActionType::SignUp => Self::SignUp { login },
            ActionType::AddMessage => Self::Message {
                login,
                message_id,
                content,
            },
            ActionType::AddComment => Self::Comment {
                login,
                message_id,
                content,
            },
            ActionType::AddReaction => Self::Reaction {
                login,
                message_id,
                kind: content.parse().ok(),
            },
        }
    }
}

impl ChatEvent<'_> {
    pub fn console_line(&self) -> String {
        match self {
            Self::SignUp { login } => format!("{} joined the Comment-Reaction Chat!", login),
            Self::Message {
                login,
                message_id,
                content,
            } => format!("[#{}][{}]: {}", message_id, login, content),
            Self::Comment {
                login,
                message_id,
                content,
            } => format!("[{} commented on message #{}]: {}", login, message_id, content),
            Self::Reaction {
                login,
                message_id,
                kind,
            } => match kind {
                Some(ReactionKind::ThumbsUp) => format!("[{} liked message {}]", login, message_id),
                Some(ReactionKind::ThumbsDown) => format!("[{} disliked message {}]", login, message_id),
                Some(kind) => format!("[{} reacted with {} emoji on message {}]", login, kind, message_id),
                None => "Unsupported emoji".to_string(),
            },
        }
    }
}

pub fn console_line(action: &Action) -> String {
    ChatEvent::from(action).console_line()
}

/// The full transcript, newest message first.
pub fn render_transcript(messages: &[Message]) -> String {
    let blocks: Vec<String> = messages.iter().rev().map(message_block).collect();
    format!("{}\n", blocks.join("\n\n"))
}

fn message_block(message: &Message) -> String {
    let comments: Vec<String> = message.comments.iter().map(comment_line).collect();
    format!(
        "[#{}][{}]: {}\n{}\n{}",
        message.id,
        message.login,
        message.content,
        reactions_line(&message.reactions),
        comments.join("\n")
    )
}

fn reactions_line(reactions: &ReactionCounts) -> String {
    format!(
        "[Like: {} | Dislike: {} | Love: {} | Fire: {} | Pile of Poo: {} ]",
        reactions.get(ReactionKind::ThumbsUp),
        reactions.get(ReactionKind::ThumbsDown),
        reactions.get(ReactionKind::Love),
        reactions.get(ReactionKind::Fire),
        reactions.get(ReactionKind::PileOfPoo),
    )
}

fn comment_line(comment: &Comment) -> String {
    format!("- - - [{}]: {}", comment.login, comment.content)
}
