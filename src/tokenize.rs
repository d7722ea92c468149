//! Word tokenization for page content.
//!
//! Splits raw text into maximal runs of ASCII letters and counts them
//! case-insensitively. Digits, punctuation and markup are separators,
//! never part of a word.

use crate::models::WordCount;

/// Count word occurrences in raw page text.
///
/// Words are maximal runs of ASCII letters; case is folded to lower before
/// counting. Empty or all-non-letter input yields an empty map.
pub fn word_counts(text: &str) -> WordCount {
    let mut counts = WordCount::new();

    for word in text.split(|c: char| !c.is_ascii_alphabetic()) {
        if word.is_empty() {
            continue;
        }
        *counts.entry(word.to_ascii_lowercase()).or_insert(0) += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_simple_text() {
        let counts = word_counts("cat cat dog");
        assert_eq!(counts.get("cat"), Some(&2));
        assert_eq!(counts.get("dog"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_case_folding() {
        let counts = word_counts("Cat CAT cat");
        assert_eq!(counts.get("cat"), Some(&3));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_non_letters_split_words() {
        // Digits and punctuation are boundaries, never merged into words.
        let counts = word_counts("cat2dog, cat-dog; [[cat]] 42");
        assert_eq!(counts.get("cat"), Some(&3));
        assert_eq!(counts.get("dog"), Some(&2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_markup_is_discarded() {
        let counts = word_counts("{{Infobox|name=Cat}} '''The cat''' <ref>x</ref>");
        assert_eq!(counts.get("cat"), Some(&2));
        assert_eq!(counts.get("infobox"), Some(&1));
        assert_eq!(counts.get("the"), Some(&1));
        assert_eq!(counts.get("name"), Some(&1));
        assert_eq!(counts.get("ref"), Some(&2));
        assert_eq!(counts.get("x"), Some(&1));
    }

    #[test]
    fn test_empty_and_non_letter_input() {
        assert!(word_counts("").is_empty());
        assert!(word_counts("123 !?& 456").is_empty());
    }

    #[test]
    fn test_tokenization_is_idempotent() {
        let text = "It was the best of times, it was the worst of times.";
        assert_eq!(word_counts(text), word_counts(text));
    }
}
