use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// -- Reactions --

/// The fixed set of reactions a message can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "Thumbs Up")]
    ThumbsUp,
    #[serde(rename = "Thumbs Down")]
    ThumbsDown,
    Love,
    Fire,
    #[serde(rename = "Pile of Poo")]
    PileOfPoo,
}

impl ReactionKind {
    /// All kinds, in the order they are stored and rendered.
    pub const ALL: [ReactionKind; 5] = [
        Self::ThumbsUp,
        Self::ThumbsDown,
        Self::Love,
        Self::Fire,
        Self::PileOfPoo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "Thumbs Up",
            Self::ThumbsDown => "Thumbs Down",
            Self::Love => "Love",
            Self::Fire => "Fire",
            Self::PileOfPoo => "Pile of Poo",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported reaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported reaction '{0}'")]
pub struct UnsupportedReaction(pub String);

impl FromStr for ReactionKind {
    type Err = UnsupportedReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnsupportedReaction(s.to_string()))
    }
}

/// Per-kind counters. Serialized as an object whose keys always appear in
/// [`ReactionKind::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    #[serde(rename = "Thumbs Up")]
    pub thumbs_up: u64,
    #[serde(rename = "Thumbs Down")]
    pub thumbs_down: u64,
    #[serde(rename = "Love")]
    pub love: u64,
    #[serde(rename = "Fire")]
    pub fire: u64,
    #[serde(rename = "Pile of Poo")]
    pub pile_of_poo: u64,
}

impl ReactionCounts {
    pub fn get(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::ThumbsUp => self.thumbs_up,
            ReactionKind::ThumbsDown => self.thumbs_down,
            ReactionKind::Love => self.love,
            ReactionKind::Fire => self.fire,
            ReactionKind::PileOfPoo => self.pile_of_poo,
        }
    }

    pub fn increment(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::ThumbsUp => &mut self.thumbs_up,
            ReactionKind::ThumbsDown => &mut self.thumbs_down,
            ReactionKind::Love => &mut self.love,
            ReactionKind::Fire => &mut self.fire,
            ReactionKind::PileOfPoo => &mut self.pile_of_poo,
        };
        *counter += 1;
    }
}

// -- Messages --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub login: String,
    pub content: String,
}

/// A chat post. `id` always equals the message's position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub login: String,
    pub content: String,
    pub comments: Vec<Comment>,
    pub reactions: ReactionCounts,
}

impl Message {
    pub fn new(id: u64, login: String, content: String) -> Self {
        Self {
            id,
            login,
            content,
            comments: Vec::new(),
            reactions: ReactionCounts::default(),
        }
    }
}

// -- Actions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SignUp,
    AddMessage,
    AddComment,
    AddReaction,
}

/// One entry of the append-only audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    pub action_type: ActionType,
    pub login: String,
    /// Decimal string, `null` for sign-ups. Integer values are accepted on
    /// read since older documents stored the add-message id as a number.
    #[serde(deserialize_with = "string_or_number")]
    pub message_id: Option<String>,
    pub content: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

/// A write intent, before it is given an id and applied to the collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAction {
    pub action_type: ActionType,
    pub login: String,
    pub message_id: Option<i64>,
    pub content: String,
}

impl NewAction {
    /// The password travels in `content`, as the members document expects.
    pub fn sign_up(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            action_type: ActionType::SignUp,
            login: login.into(),
            message_id: None,
            content: password.into(),
        }
    }

    pub fn message(login: impl Into<String>, next_id: i64, content: impl Into<String>) -> Self {
        Self {
            action_type: ActionType::AddMessage,
            login: login.into(),
            message_id: Some(next_id),
            content: content.into(),
        }
    }

    pub fn comment(login: impl Into<String>, message_id: i64, content: impl Into<String>) -> Self {
        Self {
            action_type: ActionType::AddComment,
            login: login.into(),
            message_id: Some(message_id),
            content: content.into(),
        }
    }

    pub fn reaction(login: impl Into<String>, message_id: i64, kind: ReactionKind) -> Self {
        Self {
            action_type: ActionType::AddReaction,
            login: login.into(),
            message_id: Some(message_id),
            content: kind.as_str().to_string(),
        }
    }

    /// The audit record for this intent at position `id`.
    pub fn to_action(&self, id: u64) -> Action {
        Action {
            id,
            action_type: self.action_type,
            login: self.login.clone(),
            message_id: self.message_id.map(|id| id.to_string()),
            content: self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_message_serializes_with_zeroed_reactions_in_order() {
        let message = Message::new(0, "alice".into(), "hello".into());
        let json = serde_json::to_string(&vec![message]).unwrap();
        assert_eq!(
            json,
            r#"[{"id":0,"login":"alice","content":"hello","comments":[],"reactions":{"Thumbs Up":0,"Thumbs Down":0,"Love":0,"Fire":0,"Pile of Poo":0}}]"#
        );
    }

    #[test]
    fn reaction_kind_parses_display_names_only() {
        assert_eq!("Pile of Poo".parse::<ReactionKind>(), Ok(ReactionKind::PileOfPoo));
        assert_eq!("Thumbs Up".parse::<ReactionKind>(), Ok(ReactionKind::ThumbsUp));
        assert!("thumbs up".parse::<ReactionKind>().is_err());
        assert!("Heart".parse::<ReactionKind>().is_err());
    }

    #[test]
    fn unsupported_reaction_names_the_input() {
        let err = "Heart".parse::<ReactionKind>().unwrap_err();
        assert_eq!(err, UnsupportedReaction("Heart".into()));
        assert_eq!(err.to_string(), "unsupported reaction 'Heart'");
    }

    #[test]
    fn counts_increment_only_their_kind() {
        let mut counts = ReactionCounts::default();
        counts.increment(ReactionKind::Fire);
        counts.increment(ReactionKind::Fire);
        counts.increment(ReactionKind::Love);
        assert_eq!(counts.get(ReactionKind::Fire), 2);
        assert_eq!(counts.get(ReactionKind::Love), 1);
        assert_eq!(counts.get(ReactionKind::ThumbsUp), 0);
    }

    #[test]
    fn action_accepts_numeric_and_null_message_id() {
        let raw = r#"[
            {"id":0,"action_type":"sign_up","login":"a","message_id":null,"content":"pw"},
            {"id":1,"action_type":"add_message","login":"a","message_id":0,"content":"hi"},
            {"id":2,"action_type":"add_comment","login":"a","message_id":"0","content":"yo"}
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(raw).unwrap();
        assert_eq!(actions[0].message_id, None);
        assert_eq!(actions[1].message_id.as_deref(), Some("0"));
        assert_eq!(actions[2].message_id.as_deref(), Some("0"));
        assert_eq!(actions[2].action_type, ActionType::AddComment);
    }

    #[test]
    fn action_without_message_id_key_is_rejected() {
        let raw = r#"{"id":0,"action_type":"sign_up","login":"a","content":"pw"}"#;
        assert!(serde_json::from_str::<Action>(raw).is_err());
    }

    #[test]
    fn new_action_records_message_id_as_string() {
        let action = NewAction::reaction("bob", 3, ReactionKind::ThumbsDown).to_action(7);
        assert_eq!(action.id, 7);
        assert_eq!(action.message_id.as_deref(), Some("3"));
        assert_eq!(action.content, "Thumbs Down");
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"id":7,"action_type":"add_reaction","login":"bob","message_id":"3","content":"Thumbs Down"}"#
        );
    }
}
