//! Text normalization and the mismatch-hint comparator.
//!
//! Matching is intentionally strict word-for-word: the hint walks the two
//! word sequences in lockstep and stops at the first mismatch, with no
//! realignment. An inserted or dropped word therefore masks everything
//! after the hint even when later words are individually correct. That is
//! the pedagogical contract, not a shortcut.

/// Punctuation stripped before comparison.
const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']', '{', '}', '…', '‘', '’', '“',
    '”', '«', '»',
];

/// Canonicalize text for comparison: lowercase, strip punctuation,
/// collapse whitespace runs, trim.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Exact equality after normalization.
pub fn matches(expected: &str, input: &str) -> bool {
    normalize(expected) == normalize(input)
}

/// Feedback for an incorrect answer: the matched word prefix, the first
/// mismatched target word as a hint, and a mask for the remainder.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MismatchHint {
    /// Target words the input got right, in order, up to the first mismatch.
    pub matched: Vec<String>,

    /// The first target word the input missed. `None` only when the input
    /// is a proper prefix extension mismatch (all target words matched but
    /// the strings still differ).
    pub hint: Option<String>,

    /// Count of target words masked after the hint.
    pub masked: usize,
}

/// Compare normalized word sequences position by position, stopping at the
/// first mismatch. O(n), no skipping or realignment.
pub fn mismatch_hint(expected: &str, input: &str) -> MismatchHint {
    let target = normalize(expected);
    let attempt = normalize(input);

    let target_words: Vec<&str> = target.split_whitespace().collect();
    let attempt_words: Vec<&str> = attempt.split_whitespace().collect();

    let mut matched = Vec::new();
    for (i, word) in target_words.iter().enumerate() {
        if attempt_words.get(i) == Some(word) {
            matched.push(word.to_string());
        } else {
            return MismatchHint {
                masked: target_words.len() - i - 1,
                hint: Some(word.to_string()),
                matched,
            };
        }
    }

    // Input carried extra words past a fully matched target.
    MismatchHint {
        matched,
        hint: None,
        masked: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_case_punctuation_and_extra_whitespace() {
        assert_eq!(normalize("Hello, World!"), "hello world");
        assert_eq!(normalize("  a   b "), "a b");
        assert_eq!(normalize("\"Don't stop!\""), "don t stop");
    }

    #[test]
    fn matching_is_exact_after_normalization() {
        assert!(matches("Hello, World!", "hello world"));
        assert!(!matches("hello world", "hello worlds"));
    }

    #[test]
    fn hint_reveals_first_mismatch_and_masks_the_rest() {
        let hint = mismatch_hint("the quick brown fox", "the quick red fox");
        assert_eq!(hint.matched, vec!["the", "quick"]);
        assert_eq!(hint.hint.as_deref(), Some("brown"));
        assert_eq!(hint.masked, 1);
    }

    #[test]
    fn missing_word_mismatches_at_its_position() {
        let hint = mismatch_hint("one two three", "one two");
        assert_eq!(hint.matched, vec!["one", "two"]);
        assert_eq!(hint.hint.as_deref(), Some("three"));
        assert_eq!(hint.masked, 0);
    }

    #[test]
    fn inserted_word_masks_the_remainder() {
        // No realignment: "very" shifts everything and the rest stays masked.
        let hint = mismatch_hint("the quick brown fox", "the very quick brown fox");
        assert_eq!(hint.matched, vec!["the"]);
        assert_eq!(hint.hint.as_deref(), Some("quick"));
        assert_eq!(hint.masked, 2);
    }

    #[test]
    fn extra_trailing_words_yield_no_hint_word() {
        let hint = mismatch_hint("one two", "one two three");
        assert_eq!(hint.matched, vec!["one", "two"]);
        assert_eq!(hint.hint, None);
        assert_eq!(hint.masked, 0);
    }
}
