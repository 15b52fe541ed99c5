//! Tokenization shared by the metric functions

/// Lowercase word tokens with punctuation removed
///
/// Tokens are split on whitespace; characters that are neither alphanumeric
/// nor `_` are dropped, and tokens left empty are skipped.
pub(crate) fn clean_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Cleaned tokens joined by single spaces
pub(crate) fn normalized(text: &str) -> String {
    clean_tokens(text).join(" ")
}

/// Count non-overlapping substring occurrences of `phrase` in `haystack`
///
/// Both sides are expected to be normalized already. A phrase may match
/// inside a longer word (`mouse` in `mousepad`).
pub(crate) fn count_phrase(haystack: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    haystack.matches(phrase).count()
}

/// Raw whitespace word count
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        clean_tokens(text)
    }

    #[test]
    fn test_clean_tokens_strips_punctuation() {
        assert_eq!(
            tokens("The Wireless-Mouse, ergonomic! (2.4GHz) -- done."),
            ["the", "wirelessmouse", "ergonomic", "24ghz", "done"]
        );
    }

    #[test]
    fn test_normalized_collapses_whitespace() {
        assert_eq!(normalized("  Wireless\n\n  Mouse,  here "), "wireless mouse here");
        assert_eq!(normalized("..."), "");
    }

    #[test]
    fn test_count_phrase_multi_word() {
        let haystack = normalized("A wireless mouse. Another Wireless Mouse, and a mouse.");
        assert_eq!(count_phrase(&haystack, &normalized("wireless mouse")), 2);
        assert_eq!(count_phrase(&haystack, &normalized("mouse")), 3);
        assert_eq!(count_phrase(&haystack, &normalized("mouse pad")), 0);
        assert_eq!(count_phrase(&haystack, ""), 0);
    }

    #[test]
    fn test_count_phrase_is_non_overlapping() {
        let haystack = normalized("go go go");
        assert_eq!(count_phrase(&haystack, &normalized("go go")), 1);
    }

    #[test]
    fn test_count_phrase_matches_inside_words() {
        let haystack = normalized("A mousepad for a mouse. Wireless mice, ergonomic designs.");
        assert_eq!(count_phrase(&haystack, &normalized("mouse")), 2);
        assert_eq!(count_phrase(&haystack, &normalized("ergonomic design")), 1);
        assert_eq!(count_phrase(&haystack, &normalized("wireless mice")), 1);
    }
}
