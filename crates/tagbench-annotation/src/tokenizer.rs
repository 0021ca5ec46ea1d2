//! Sentence tokenizer
//!
//! Splits raw sentence text into [`Token`]s. Maximal runs of word characters
//! become one token; every other non-whitespace character is emitted on its
//! own. Whitespace separates tokens and is never emitted.
//!
//! Word characters are the Devanagari block (U+0900..=U+097F) minus the two
//! dandas, plus ASCII letters and digits.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display, Formatter};

/// Word runs first, then any single non-space character.
///
/// `।` (U+0964) and `॥` (U+0965) sit inside the Devanagari block but close
/// sentences, so the word class skips them.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{0900}-\u{0963}\u{0966}-\u{097F}A-Za-z0-9]+|\S")
        .expect("token pattern is valid")
});

/// A token and its ordinal position within the sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    text: String,
    position: usize,
}

impl Token {
    /// Create a token at `position`
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// Token text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Zero-based ordinal within the sentence
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Tokenize a sentence
///
/// Empty or whitespace-only input yields an empty vector.
///
/// # Examples
///
/// ```rust
/// use tagbench_annotation::tokenize_text;
///
/// assert_eq!(tokenize_text("राम घर गया।"), vec!["राम", "घर", "गया", "।"]);
/// assert!(tokenize_text("").is_empty());
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_PATTERN
        .find_iter(text)
        .enumerate()
        .map(|(position, m)| Token::new(m.as_str(), position))
        .collect()
}

/// Tokenize a sentence, returning only the token strings
#[must_use]
pub fn tokenize_text(text: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
