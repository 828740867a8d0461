//! Capacity-bounded membership table.

use super::entry::SessionEntry;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

/// Membership errors. None of these are fatal; callers report them to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0} is already a member")]
    AlreadyMember(String),

    #[error("conversation is full ({capacity} members)")]
    Full { capacity: usize },

    #[error("{0} is not a member")]
    NotFound(String),
}

/// Members of the conversation, keyed by user id.
///
/// Not synchronized on its own; share it as [`super::SharedSessions`].
#[derive(Debug, Clone)]
pub struct SessionTable {
    capacity: usize,
    entries: HashMap<String, SessionEntry>,
}

impl SessionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Admit `id` with a fresh window starting now.
    pub fn admit(&mut self, id: &str, ttl: TimeDelta) -> Result<SessionEntry, SessionError> {
        self.admit_at(id, ttl, Utc::now())
    }

    /// Admit `id` with a window starting at `now`.
    pub fn admit_at(
        &mut self,
        id: &str,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<SessionEntry, SessionError> {
        if self.entries.contains_key(id) {
            return Err(SessionError::AlreadyMember(id.to_string()));
        }
        if self.entries.len() >= self.capacity {
            return Err(SessionError::Full {
                capacity: self.capacity,
            });
        }

        let entry = SessionEntry::new(id, ttl, now);
        self.entries.insert(id.to_string(), entry.clone());
        Ok(entry)
    }

    /// Copy of the member's record, if present.
    pub fn find(&self, id: &str) -> Option<SessionEntry> {
        self.entries.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Extend the member's window using the slack-preserving rule.
    pub fn touch(&mut self, id: &str) -> Result<(), SessionError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        entry.touch();
        Ok(())
    }

    /// Remove the member. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occupancy label shown alongside membership notices.
    pub fn remaining_capacity(&self) -> String {
        format!("Space left: {} / {}", self.entries.len(), self.capacity)
    }

    /// Time left before the member would be evicted, as of their last recorded activity.
    pub fn time_left(&self, id: &str) -> Option<TimeDelta> {
        self.entries.get(id).map(SessionEntry::remaining)
    }

    /// Owned copy of every entry, oldest admission first.
    pub fn snapshot(&self) -> Vec<SessionEntry> {
        let mut entries: Vec<SessionEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        entries
    }

    /// Move the member's activity clock to `now` and report whether the window ran out.
    ///
    /// Returns `None` if the member is no longer present.
    pub(crate) fn advance(&mut self, id: &str, now: DateTime<Utc>) -> Option<bool> {
        let entry = self.entries.get_mut(id)?;
        entry.advance_to(now);
        Some(entry.is_expired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn ttl() -> TimeDelta {
        TimeDelta::seconds(600)
    }

    #[test]
    fn admit_five_then_full() {
        let mut table = SessionTable::new(5);
        for id in ["a", "b", "c", "d", "e"] {
            assert!(table.admit_at(id, ttl(), at(0)).is_ok());
        }
        assert_eq!(table.size(), 5);
        assert_eq!(
            table.admit_at("f", ttl(), at(0)),
            Err(SessionError::Full { capacity: 5 })
        );
        assert_eq!(table.size(), 5);
    }

    #[test]
    fn admit_duplicate_is_rejected() {
        let mut table = SessionTable::new(5);
        table.admit_at("a", ttl(), at(0)).unwrap();
        assert_eq!(
            table.admit_at("a", ttl(), at(10)),
            Err(SessionError::AlreadyMember("a".into()))
        );
        // first window untouched
        assert_eq!(table.find("a").unwrap().deadline(), at(600));
    }

    #[test]
    fn duplicate_wins_over_full() {
        let mut table = SessionTable::new(1);
        table.admit_at("a", ttl(), at(0)).unwrap();
        assert_eq!(
            table.admit_at("a", ttl(), at(0)),
            Err(SessionError::AlreadyMember("a".into()))
        );
    }

    #[test]
    fn admit_sets_deadline() {
        let mut table = SessionTable::new(5);
        let entry = table.admit_at("a", ttl(), at(100)).unwrap();
        assert_eq!(entry.last_activity_at(), at(100));
        assert_eq!(entry.deadline(), at(700));
    }

    #[test]
    fn touch_missing_leaves_table_unchanged() {
        let mut table = SessionTable::new(5);
        table.admit_at("a", ttl(), at(0)).unwrap();
        let before = table.snapshot();

        assert_eq!(table.touch("ghost"), Err(SessionError::NotFound("ghost".into())));
        assert_eq!(table.snapshot(), before);
    }

    #[test]
    fn touch_preserves_slack() {
        let mut table = SessionTable::new(5);
        table.admit_at("a", ttl(), at(0)).unwrap();
        assert_eq!(table.advance("a", at(120)), Some(false));

        let before = table.find("a").unwrap();
        let remaining = before.remaining();
        table.touch("a").unwrap();
        let after = table.find("a").unwrap();

        assert_eq!(after.last_activity_at(), before.deadline());
        assert_eq!(after.deadline(), after.last_activity_at() + ttl() - remaining);
        assert_eq!(after.deadline(), at(720));
    }

    #[test]
    fn remove_reports_presence() {
        let mut table = SessionTable::new(5);
        table.admit_at("a", ttl(), at(0)).unwrap();
        assert!(table.remove("a"));
        assert!(!table.remove("a"));
        assert!(table.is_empty());
    }

    #[test]
    fn remaining_capacity_label() {
        let mut table = SessionTable::new(5);
        assert_eq!(table.remaining_capacity(), "Space left: 0 / 5");
        table.admit_at("a", ttl(), at(0)).unwrap();
        table.admit_at("b", ttl(), at(0)).unwrap();
        assert_eq!(table.remaining_capacity(), "Space left: 2 / 5");
    }

    #[test]
    fn snapshot_is_ordered_by_admission() {
        let mut table = SessionTable::new(5);
        table.admit_at("carol", ttl(), at(20)).unwrap();
        table.admit_at("alice", ttl(), at(0)).unwrap();
        table.admit_at("bob", ttl(), at(10)).unwrap();

        let ids: Vec<String> = table.snapshot().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn time_left_tracks_advance() {
        let mut table = SessionTable::new(5);
        table.admit_at("a", ttl(), at(0)).unwrap();
        table.advance("a", at(200));
        assert_eq!(table.time_left("a"), Some(TimeDelta::seconds(400)));
        assert_eq!(table.time_left("b"), None);
        assert_eq!(table.advance("b", at(200)), None);
    }
}
