//! Per-member activity record.

use chrono::{DateTime, TimeDelta, Utc};

/// A member admitted into the conversation.
///
/// The window is tracked as `[last_activity_at, deadline)`. The reaper moves
/// `last_activity_at` forward to its tick time; once it reaches the deadline
/// the member is evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    id: String,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    ttl: TimeDelta,
    deadline: DateTime<Utc>,
}

impl SessionEntry {
    pub(crate) fn new(id: impl Into<String>, ttl: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: now,
            last_activity_at: now,
            ttl,
            deadline: add_saturating(now, ttl),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time left in the window as of the last recorded activity.
    pub fn remaining(&self) -> TimeDelta {
        self.deadline - self.last_activity_at
    }

    /// Whether the window has run out.
    pub fn is_expired(&self) -> bool {
        self.last_activity_at >= self.deadline
    }

    /// Extend the window, carrying the unused slack forward.
    ///
    /// The new window starts at the old deadline and is shortened by whatever
    /// was still remaining, so bursts of activity cannot stack full windows.
    pub(crate) fn touch(&mut self) {
        let remaining = self.remaining();
        self.last_activity_at = self.deadline;
        self.deadline = add_saturating(self.last_activity_at, self.ttl - remaining);
    }

    /// Record the reaper's view of the current time.
    pub(crate) fn advance_to(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
    }
}

fn add_saturating(at: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
