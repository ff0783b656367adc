use thiserror::Error;

use crchat_types::models::ReactionKind;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Message(String),
    Comment { message_id: i64, text: String },
    React { message_id: i64, kind: ReactionKind },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("there should be a message id after '{0}'")]
    MissingMessageId(String),
    #[error("'{0}' is not a message id")]
    InvalidMessageId(String),
    #[error("could not parse special command '{0}'")]
    UnknownCommand(String),
}

impl UserCommand {
    /// Plain text is a message. Commands start with `/`:
    /// `/c <id> <text>` (or `/comment`) comments, and
    /// `/like` `/l`, `/dislike` `/d`, `/love`, `/fire` `/f`, `/poo` `/p`
    /// followed by an id react.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        if !line.starts_with('/') {
            return Ok(Self::Message(line.to_string()));
        }

        let mut tokens = line.split(' ');
        let code = tokens.next().unwrap_or_default();
        let raw_id = tokens
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CommandError::MissingMessageId(code.to_string()))?;

        if matches!(code, "/c" | "/comment") {
            let message_id = parse_id(raw_id)?;
            let text = tokens.collect::<Vec<_>>().join(" ");
            return Ok(Self::Comment { message_id, text });
        }

        let kind = reaction_for(code).ok_or_else(|| CommandError::UnknownCommand(code.to_string()))?;
        Ok(Self::React {
            message_id: parse_id(raw_id)?,
            kind,
        })
    }
}

fn reaction_for(code: &str) -> Option<ReactionKind> {
    match code {
        "/like" | "/l" => Some(ReactionKind::ThumbsUp),
        "/dislike" | "/d" => Some(ReactionKind::ThumbsDown),
        "/love" => Some(ReactionKind::Love),
        "/fire" | "/f" => Some(ReactionKind::Fire),
        "/poo" | "/p" => Some(ReactionKind::PileOfPoo),
        _ => None,
    }
}

fn parse_id(raw: &str) -> Result<i64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidMessageId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            UserCommand::parse("hello there"),
            Ok(UserCommand::Message("hello there".into()))
        );
    }

    #[test]
    fn comments_keep_the_rest_of_the_line() {
        assert_eq!(
            UserCommand::parse("/c 3 nice one, really"),
            Ok(UserCommand::Comment {
                message_id: 3,
                text: "nice one, really".into()
            })
        );
        assert_eq!(
            UserCommand::parse("/comment 0"),
            Ok(UserCommand::Comment {
                message_id: 0,
                text: String::new()
            })
        );
    }

    #[test]
    fn reaction_aliases() {
        for (code, kind) in [
            ("/like", ReactionKind::ThumbsUp),
            ("/l", ReactionKind::ThumbsUp),
            ("/dislike", ReactionKind::ThumbsDown),
            ("/d", ReactionKind::ThumbsDown),
            ("/love", ReactionKind::Love),
            ("/fire", ReactionKind::Fire),
            ("/f", ReactionKind::Fire),
            ("/poo", ReactionKind::PileOfPoo),
            ("/p", ReactionKind::PileOfPoo),
        ] {
            assert_eq!(
                UserCommand::parse(&format!("{} 7", code)),
                Ok(UserCommand::React { message_id: 7, kind })
            );
        }
    }

    #[test]
    fn malformed_commands() {
        assert_eq!(
            UserCommand::parse("/like"),
            Err(CommandError::MissingMessageId("/like".into()))
        );
        assert_eq!(
            UserCommand::parse("/wave 1"),
            Err(CommandError::UnknownCommand("/wave".into()))
        );
        assert_eq!(
            UserCommand::parse("/c first hi"),
            Err(CommandError::InvalidMessageId("first".into()))
        );
    }
}
