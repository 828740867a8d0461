//! Rolling conversation context.

use std::collections::VecDeque;

/// A pinned framing turn followed by the most recent conversation turns.
///
/// Turns beyond `capacity` are dropped oldest first; the pinned turn is never
/// dropped. `render` produces the exact text sent to the model.
#[derive(Debug, Clone)]
pub struct ContextBuffer {
    pinned: String,
    capacity: usize,
    turns: VecDeque<String>,
    generation: u64,
}

impl ContextBuffer {
    pub fn new(pinned: impl Into<String>, capacity: usize) -> Self {
        Self {
            pinned: pinned.into(),
            capacity,
            turns: VecDeque::with_capacity(capacity + 1),
            generation: 0,
        }
    }

    /// Append a turn, returning the turn that fell off the front, if any.
    pub fn append(&mut self, turn: impl Into<String>) -> Option<String> {
        self.turns.push_back(turn.into());
        if self.turns.len() > self.capacity {
            self.turns.pop_front()
        } else {
            None
        }
    }

    /// Append only if no reset happened since `generation` was read.
    ///
    /// Returns whether the turn was kept.
    pub fn append_if_generation(&mut self, generation: u64, turn: impl Into<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.append(turn);
        true
    }

    /// Pinned turn and history joined by newlines.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.pinned.len() + self.turns.iter().map(|t| t.len() + 1).sum::<usize>(),
        );
        out.push_str(&self.pinned);
        for turn in &self.turns {
            out.push('\n');
            out.push_str(turn);
        }
        out
    }

    /// Drop all history, keeping the pinned turn.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Replace the pinned turn and drop all history.
    pub fn set_pinned(&mut self, pinned: impl Into<String>) {
        self.pinned = pinned.into();
        self.reset();
    }

    pub fn pinned(&self) -> &str {
        &self.pinned
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn turns(&self) -> impl Iterator<Item = &str> {
        self.turns.iter().map(String::as_str)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pinned_only() {
        let buffer = ContextBuffer::new("SYS", 30);
        assert_eq!(buffer.render(), "SYS");
        assert!(buffer.is_empty());
    }

    #[test]
    fn render_joins_with_newlines() {
        let mut buffer = ContextBuffer::new("SYS", 30);
        buffer.append("one");
        buffer.append("two");
        assert_eq!(buffer.render(), "SYS\none\ntwo");
    }

    #[test]
    fn append_drops_oldest_past_capacity() {
        let mut buffer = ContextBuffer::new("SYS", 30);
        for i in 0..40 {
            let dropped = buffer.append(format!("t{i}"));
            if i < 30 {
                assert_eq!(dropped, None);
            } else {
                assert_eq!(dropped, Some(format!("t{}", i - 30)));
            }
        }

        assert_eq!(buffer.len(), 30);
        assert_eq!(buffer.pinned(), "SYS");
        let turns: Vec<&str> = buffer.turns().collect();
        assert_eq!(turns.first(), Some(&"t10"));
        assert_eq!(turns.last(), Some(&"t39"));
    }

    #[test]
    fn zero_capacity_keeps_only_pinned() {
        let mut buffer = ContextBuffer::new("SYS", 0);
        assert_eq!(buffer.append("x"), Some("x".to_string()));
        assert_eq!(buffer.render(), "SYS");
    }

    #[test]
    fn reset_keeps_pinned() {
        let mut buffer = ContextBuffer::new("SYS", 30);
        for i in 0..5 {
            buffer.append(format!("t{i}"));
        }
        buffer.reset();
        assert_eq!(buffer.render(), "SYS");
        assert_eq!(buffer.generation(), 1);
    }

    #[test]
    fn set_pinned_resets() {
        let mut buffer = ContextBuffer::new("SYS", 30);
        buffer.append("hello");
        buffer.set_pinned("NEW");
        assert_eq!(buffer.render(), "NEW");
        assert_eq!(buffer.generation(), 1);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut buffer = ContextBuffer::new("SYS", 30);
        let generation = buffer.generation();
        buffer.append("prompt");
        buffer.reset();

        assert!(!buffer.append_if_generation(generation, "late response"));
        assert_eq!(buffer.render(), "SYS");

        assert!(buffer.append_if_generation(buffer.generation(), "fresh"));
        assert_eq!(buffer.render(), "SYS\nfresh");
    }
}
