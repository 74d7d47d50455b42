//! Query tokenization.
//!
//! A raw query string is tokenized once on the query side (to build a
//! storage predicate) and once on the display side (to highlight matched
//! rows). Both paths go through this module so the two can never drift
//! apart.

use once_cell::sync::Lazy;
use regex::Regex;

/// Scans a query left to right: a double-quoted run wins over a maximal
/// run of non-whitespace.
static TERM_SCANNER: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)"|(\S+)"#).unwrap());

/// A single search term extracted from a raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Quoted text, matched as a contiguous case-insensitive substring.
    Phrase(String),
    /// Bare text, matched as a case-insensitive whole word.
    Word(String),
}

impl Token {
    /// The term text with quoting removed.
    pub fn text(&self) -> &str {
        match self {
            Token::Phrase(text) | Token::Word(text) => text,
        }
    }
}

/// Split a raw query into tokens, preserving source order.
///
/// Quoted runs become [`Token::Phrase`] with their inner whitespace intact;
/// everything else splits on whitespace into [`Token::Word`]s. An unpaired
/// quote is not an error: one dangling quote is stripped from each end of
/// the term and the rest is kept as a word, so `foo "bar` yields `foo` and
/// `bar`. Tokens that end up empty (a bare `""`) are dropped.
pub fn tokenize(raw: &str) -> Vec<Token> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    for caps in TERM_SCANNER.captures_iter(raw) {
        if let Some(phrase) = caps.get(1) {
            tokens.push(Token::Phrase(phrase.as_str().to_string()));
        } else if let Some(bare) = caps.get(2) {
            let text = bare.as_str();
            let text = text.strip_prefix('"').unwrap_or(text);
            let text = text.strip_suffix('"').unwrap_or(text);
            if !text.is_empty() {
                tokens.push(Token::Word(text.to_string()));
            }
        }
    }
    tokens
}

/// Case-insensitive literal pattern for one term's text.
///
/// Escaped so regex metacharacters typed into a query match themselves.
/// Shared by the predicate builder and the highlighter.
pub(crate) fn literal_pattern(text: &str) -> String {
    format!("(?i){}", regex::escape(text))
}
