//! Sentence-level split, join, and the phase-0 valid-index computation.

use crate::is_delimiter;

/// Splits `content` into sentences.
///
/// A sentence is a maximal run of bytes ending at (and including) a
/// delimiter, or, for the last piece of `content` only, if any bytes
/// remain after the final delimiter, the trailing incomplete
/// sentence. Whitespace immediately following a delimiter is consumed
/// as the inter-sentence separator and does not begin the next
/// sentence.
#[must_use]
pub fn split_into_sentences(content: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if is_delimiter(c) {
            sentences.push(std::mem::take(&mut current));
            while matches!(chars.peek(), Some(next) if next.is_whitespace()) {
                chars.next();
            }
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

/// Joins `sentences` back into content, the inverse of
/// [`split_into_sentences`].
///
/// A single space separates successive sentences, unless the next
/// sentence already begins with whitespace (which should not happen
/// for sentences produced by [`split_into_sentences`], but callers may
/// construct sentences by hand during a commit).
#[must_use]
pub fn join_sentences(sentences: &[String]) -> String {
    let mut out = String::new();
    for (i, sentence) in sentences.iter().enumerate() {
        if i > 0 && !sentence.starts_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push_str(sentence);
    }
    out
}

/// Computes the highest sentence index a `WRITE` session may legally
/// target.
///
/// A file with no sentences may only be appended to at index 0. A
/// file whose last sentence is complete (ends in a delimiter, modulo
/// trailing whitespace) may be appended to at `count`; otherwise the
/// trailing incomplete sentence is the only legal target and the
/// ceiling is `count - 1`.
#[must_use]
pub fn max_valid_write_index(sentences: &[String]) -> usize {
    match sentences.last() {
        None => 0,
        Some(last) => match last.trim_end().chars().next_back() {
            Some(c) if is_delimiter(c) => sentences.len(),
            _ => sentences.len() - 1,
        },
    }
}
