//! Outbound message chunking.

/// Split `text` into chunks of at most `limit` characters.
///
/// Chunks are cut on character boundaries, never inside a code point, and
/// concatenate back to the input. Empty input yields no chunks. A `limit` of
/// zero is treated as one.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 2000), vec!["hello"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split_message("", 2000).is_empty());
    }

    #[test]
    fn exact_limit_is_one_chunk() {
        let text = "a".repeat(2000);
        assert_eq!(split_message(&text, 2000).len(), 1);
    }

    #[test]
    fn long_text_splits_in_order() {
        let text = format!("{}{}{}", "a".repeat(2000), "b".repeat(2000), "c".repeat(5));
        let chunks = split_message(&text, 2000);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].chars().all(|c| c == 'a'));
        assert!(chunks[1].chars().all(|c| c == 'b'));
        assert_eq!(chunks[2], "ccccc");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn multibyte_counts_characters() {
        let text = "é".repeat(5);
        let chunks = split_message(&text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn zero_limit_does_not_loop() {
        assert_eq!(split_message("abc", 0), vec!["a", "b", "c"]);
    }
}
