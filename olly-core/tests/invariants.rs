//! Property tests for membership and context bounds.

use chrono::{DateTime, TimeDelta, Utc};
use olly_core::{ContextBuffer, SessionError, SessionTable};
use proptest::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Admit(u8),
    Touch(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12).prop_map(Op::Admit),
        (0u8..12).prop_map(Op::Touch),
        (0u8..12).prop_map(Op::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn size_never_exceeds_capacity(capacity in 1usize..8, ops in prop::collection::vec(op(), 0..64)) {
        let mut table = SessionTable::new(capacity);
        let ttl = TimeDelta::seconds(600);

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Admit(n) => {
                    let id = format!("user{n}");
                    let was_present = table.contains(&id);
                    let was_full = table.size() == capacity;
                    match table.admit_at(&id, ttl, at(step as i64)) {
                        Ok(_) => prop_assert!(!was_present && !was_full),
                        Err(SessionError::AlreadyMember(_)) => prop_assert!(was_present),
                        Err(SessionError::Full { .. }) => prop_assert!(was_full && !was_present),
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    }
                }
                Op::Touch(n) => {
                    let id = format!("user{n}");
                    let before = table.find(&id);
                    match (table.touch(&id), before) {
                        (Ok(()), Some(before)) => {
                            let after = table.find(&id).unwrap();
                            prop_assert_eq!(after.last_activity_at(), before.deadline());
                            prop_assert_eq!(
                                after.deadline(),
                                after.last_activity_at() + before.ttl() - before.remaining()
                            );
                        }
                        (Err(SessionError::NotFound(_)), None) => {}
                        (result, before) => prop_assert!(false, "touch {result:?} with {before:?}"),
                    }
                }
                Op::Remove(n) => {
                    let id = format!("user{n}");
                    let was_present = table.contains(&id);
                    prop_assert_eq!(table.remove(&id), was_present);
                }
            }
            prop_assert!(table.size() <= capacity);
        }
    }

    #[test]
    fn buffer_keeps_newest_turns(capacity in 0usize..40, count in 0usize..100) {
        let mut buffer = ContextBuffer::new("SYS", capacity);
        for i in 0..count {
            buffer.append(format!("t{i}"));
            prop_assert!(buffer.len() <= capacity);
            prop_assert_eq!(buffer.pinned(), "SYS");
        }

        let kept: Vec<String> = buffer.turns().map(str::to_string).collect();
        let expected: Vec<String> = (count.saturating_sub(capacity)..count).map(|i| format!("t{i}")).collect();
        prop_assert_eq!(kept, expected);
        prop_assert!(buffer.render().starts_with("SYS"));
    }

    #[test]
    fn chunks_reassemble(text in "\\PC{0,5000}", limit in 1usize..3000) {
        let chunks = olly_core::split_message(&text, limit);
        prop_assert_eq!(chunks.concat(), text.clone());
        prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= limit));
        if let Some((last, rest)) = chunks.split_last() {
            prop_assert!(rest.iter().all(|c| c.chars().count() == limit));
            prop_assert!(!last.is_empty());
        }
    }
}
