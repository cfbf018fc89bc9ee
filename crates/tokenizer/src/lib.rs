#![deny(unsafe_code)]

//! # Overview
//!
//! `scribe_tokenizer` defines what an edit means: how a file's bytes
//! split into sentences and words, and how those pieces join back into
//! bytes. Every other crate that touches file content, the storage
//! server's write-session engine above all, goes through here rather
//! than re-deriving the delimiter rules.
//!
//! # Design
//!
//! Three characters end a sentence: `.`, `!`, `?` ([`is_delimiter`]).
//! The delimiter belongs to the sentence it ends; whitespace
//! immediately following it is inter-sentence filler and is discarded.
//! Within a sentence, words split on whitespace, except that a
//! delimiter character is always its own one-character word, even
//! when it directly abuts a letter (`"hello."` is `["hello", "."]`,
//! not `["hello."]`).
//!
//! [`join_sentences`] and [`join_words`] are the inverses used at
//! commit time. Both suppress the space they would otherwise insert
//! when the next piece already starts with the kind of character that
//! made the split happen in the first place (whitespace for
//! sentences, a delimiter for words). This is what keeps
//! `join(split(x))` close to `x` rather than growing stray spaces on
//! every round trip.
//!
//! # Invariants
//!
//! - [`split_into_sentences`] never drops a non-whitespace byte: every
//!   sentence it returns is non-empty, and concatenating them with
//!   single spaces reproduces the input modulo exactly the
//!   whitespace that was collapsed between sentences.
//! - [`split_into_words`] never returns an empty word.
//! - `split_into_sentences(join_sentences(split_into_sentences(c)))`
//!   has the same sentence count as `split_into_sentences(c)` for any
//!   `c`: splitting, rejoining, and splitting again is idempotent on
//!   the sentence count.

mod sentence;
mod word;

pub use sentence::{join_sentences, max_valid_write_index, split_into_sentences};
pub use word::{join_words, split_into_words};

/// The three characters that end a sentence.
pub const DELIMITERS: [char; 3] = ['.', '!', '?'];

/// Whether `c` is one of [`DELIMITERS`].
#[must_use]
pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}
