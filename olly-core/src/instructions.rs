//! Editable model instructions.

use olly_common::error::ResultExt;
use olly_common::{Error, Result};
use std::fs;
use std::path::Path;

/// Fixed preamble placed ahead of the editable instructions in the pinned turn.
pub const FRAMING: &str = concat!(
    "You are taking part in a group chat with several people. ",
    "Each message you receive starts with the speaker's name followed by said: and what they wrote. ",
    "Call people by the name shown unless they ask for something else. ",
    "The instructions below, if present, were written by the people running this chat ",
    "and you should follow them carefully, even when they seem odd.",
);

/// Personality, goal and restriction text that shapes the model's behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instructions {
    pub personality: String,
    pub goal: String,
    pub restriction: String,
}

impl Instructions {
    pub fn new(
        personality: impl Into<String>,
        goal: impl Into<String>,
        restriction: impl Into<String>,
    ) -> Self {
        Self {
            personality: personality.into(),
            goal: goal.into(),
            restriction: restriction.into(),
        }
    }

    /// Parse the defaults file format: one field per line, in order
    /// personality, goal, restriction. Extra lines are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines().map(str::trim);
        match (lines.next(), lines.next(), lines.next()) {
            (Some(personality), Some(goal), Some(restriction)) => {
                Ok(Self::new(personality, goal, restriction))
            }
            _ => Err(Error::Config(
                "instructions file needs three lines: personality, goal, restriction".into(),
            )),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("reading instructions from {}", path.display()))?;
        Self::parse(&content)
    }

    /// The three fields as shown to users and to the model.
    pub fn render(&self) -> String {
        format!(
            "PERSONALITY: {}\n\nGOAL: {}\n\nRESTRICTION: {}",
            self.personality, self.goal, self.restriction
        )
    }

    /// Framing followed by the rendered instructions.
    pub fn pinned_turn(&self) -> String {
        format!("{FRAMING}{}", self.render())
    }
}

/// Pinned turn for optional instructions; with none it is the framing alone.
pub fn pinned_turn(instructions: Option<&Instructions>) -> String {
    instructions.map_or_else(|| FRAMING.to_string(), Instructions::pinned_turn)
}
