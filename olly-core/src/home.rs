//! Home channel designation.

/// Where a channel stands relative to the designated home channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeCheck {
    /// No home channel has been designated yet.
    Unset,
    /// The channel is the home channel.
    Match,
    /// A home channel exists and this is not it.
    Mismatch,
}

/// The single channel in which the conversation takes place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeChannel {
    id: Option<String>,
}

impl HomeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Designate `channel_id` as home, replacing any previous choice.
    pub fn set(&mut self, channel_id: impl Into<String>) {
        self.id = Some(channel_id.into());
    }

    pub fn get(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn check(&self, channel_id: &str) -> HomeCheck {
        match self.id.as_deref() {
            None => HomeCheck::Unset,
            Some(home) if home == channel_id => HomeCheck::Match,
            Some(_) => HomeCheck::Mismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_way_check() {
        let mut home = HomeChannel::new();
        assert_eq!(home.check("general"), HomeCheck::Unset);

        home.set("general");
        assert_eq!(home.check("general"), HomeCheck::Match);
        assert_eq!(home.check("random"), HomeCheck::Mismatch);
        assert_eq!(home.get(), Some("general"));
    }

    #[test]
    fn set_replaces_previous_home() {
        let mut home = HomeChannel::new();
        home.set("general");
        home.set("random");
        assert_eq!(home.check("general"), HomeCheck::Mismatch);
        assert_eq!(home.check("random"), HomeCheck::Match);
    }
}
