//! Word-level split and join within a single sentence.

use crate::is_delimiter;

/// Splits `sentence` into words.
///
/// Words are whitespace-separated, except that a delimiter character
/// is always its own single-character word. `"hello."` splits to
/// `["hello", "."]`, not `["hello."]`, even though nothing separates
/// them by whitespace.
#[must_use]
pub fn split_into_words(sentence: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in sentence.chars() {
        if c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if is_delimiter(c) {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            words.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Joins `words` back into a sentence, the inverse of
/// [`split_into_words`].
///
/// A single space separates successive words, unless the next word is
/// itself a delimiter. Suppressing that space is what keeps
/// `join_words(split_into_words("hello."))` equal to `"hello."`
/// instead of drifting to `"hello ."`.
#[must_use]
pub fn join_words(words: &[String]) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        let is_delim_word = word.chars().next().is_some_and(is_delimiter);
        if i > 0 && !is_delim_word {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_is_its_own_word_when_adjacent_to_a_letter() {
        assert_eq!(split_into_words("hello."), vec!["hello", "."]);
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(split_into_words("hello world"), vec!["hello", "world"]);
    }

    #[test]
    fn multiple_delimiters_each_become_a_word() {
        assert_eq!(split_into_words("wait... really?!"), vec!["wait", ".", ".", ".", "really", "?", "!"]);
    }

    #[test]
    fn empty_sentence_has_no_words() {
        assert!(split_into_words("").is_empty());
        assert!(split_into_words("   ").is_empty());
    }

    #[test]
    fn join_words_suppresses_space_before_delimiter() {
        let words = vec!["hello".to_string(), "world".to_string(), ".".to_string()];
        assert_eq!(join_words(&words), "hello world.");
    }

    #[test]
    fn join_words_round_trips_a_simple_sentence() {
        let words = split_into_words("hello world.");
        assert_eq!(join_words(&words), "hello world.");
    }

    #[test]
    fn join_words_handles_empty_list() {
        assert_eq!(join_words(&[]), "");
    }
}
