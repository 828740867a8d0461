//! Slash command parsing.

use olly_core::Instructions;

/// A parsed inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join,
    Leave,
    SetHome,
    ResetHistory,
    EditInstructions(Instructions),
    ResetInstructions,
    ViewInstructions,
    /// Anything that is not a slash command.
    Chat(String),
}

/// Command parse failure. The display text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: /{0}")]
    Unknown(String),

    #[error("Usage: /edit-instructions <personality> | <goal> | <restriction>")]
    EditUsage,
}

/// Parse a message. Text not starting with `/` is chat.
pub fn parse(text: &str) -> Result<Command, CommandError> {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Chat(text.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "join-conversation" => Ok(Command::Join),
        "leave-conversation" => Ok(Command::Leave),
        "set-home" => Ok(Command::SetHome),
        "reset-conversation-history" => Ok(Command::ResetHistory),
        "edit-instructions" => parse_instructions(args).map(Command::EditInstructions),
        "reset-instructions" => Ok(Command::ResetInstructions),
        "view-instructions" => Ok(Command::ViewInstructions),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_instructions(args: &str) -> Result<Instructions, CommandError> {
    let fields: Vec<&str> = args.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [personality, goal, restriction] => Ok(Instructions::new(*personality, *goal, *restriction)),
        _ => Err(CommandError::EditUsage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let cases = [
            ("/join-conversation", Command::Join),
            ("/leave-conversation", Command::Leave),
            ("/set-home", Command::SetHome),
            ("/reset-conversation-history", Command::ResetHistory),
            ("/reset-instructions", Command::ResetInstructions),
            ("  /view-instructions  ", Command::ViewInstructions),
        ];
        for (input, expected) in cases {
            assert_eq!(parse(input).unwrap(), expected, "input: {input}");
        }
    }

    #[test]
    fn chat_is_passed_through_verbatim() {
        assert_eq!(parse(">hello there").unwrap(), Command::Chat(">hello there".into()));
        assert_eq!(parse("just talking").unwrap(), Command::Chat("just talking".into()));
    }

    #[test]
    fn edit_instructions_splits_on_pipes() {
        let cmd = parse("/edit-instructions cheerful | keep it going | no politics").unwrap();
        assert_eq!(
            cmd,
            Command::EditInstructions(Instructions::new("cheerful", "keep it going", "no politics"))
        );
    }

    #[test]
    fn edit_instructions_allows_empty_fields() {
        let cmd = parse("/edit-instructions | | ").unwrap();
        assert_eq!(cmd, Command::EditInstructions(Instructions::default()));
    }

    #[test]
    fn edit_instructions_needs_three_fields() {
        assert_eq!(parse("/edit-instructions only one"), Err(CommandError::EditUsage));
        assert_eq!(parse("/edit-instructions"), Err(CommandError::EditUsage));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse("/dance"), Err(CommandError::Unknown("dance".into())));
    }
}
