//! Predicate construction for record search.
//!
//! Each token becomes an OR across the searched fields; terms are then
//! combined AND- or OR-wise, with exact filters always ANDed in front.
//! The tree carries no storage vocabulary: the SQLite adapter in
//! `database` translates it, and [`Predicate::matches`] evaluates it
//! directly against in-memory records.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::query::{literal_pattern, Token};

/// A searchable record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Drive,
    Metadata,
    Reporter,
}

impl Field {
    /// The searchable fields, in display order.
    pub const ALL: [Field; 4] = [Field::Id, Field::Drive, Field::Metadata, Field::Reporter];

    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Field::Id => &record.id,
            Field::Drive => &record.drive,
            Field::Metadata => &record.metadata,
            Field::Reporter => &record.reporter,
        }
    }
}

/// How multiple terms combine: every term must match somewhere (`And`,
/// the default) or at least one must (`Or`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    #[default]
    And,
    Or,
}

/// Optional exact-equality filters, always ANDed into the final predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactFilters {
    pub id: Option<String>,
    pub drive: Option<String>,
    pub reporter: Option<String>,
}

/// A logical condition tree over records, built once per search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// One token matched against one field.
    FieldMatch { field: Field, token: Token },
    /// Case-sensitive exact equality on one field.
    ExactEq { field: Field, value: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// The universal predicate: matches every record.
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn is_universal(&self) -> bool {
        matches!(self, Predicate::And(children) if children.is_empty())
    }

    /// Evaluate this predicate against a record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::FieldMatch { field, token } => {
                token_regex(token).is_match(field.value_of(record))
            }
            Predicate::ExactEq { field, value } => field.value_of(record) == value,
            Predicate::And(children) => children.iter().all(|child| child.matches(record)),
            Predicate::Or(children) => children.iter().any(|child| child.matches(record)),
        }
    }
}

/// Regex pattern for one token.
///
/// Phrases match anywhere; words only between `[A-Za-z0-9_]` boundaries,
/// hence the ASCII `\b`.
pub(crate) fn token_pattern(token: &Token) -> String {
    match token {
        Token::Phrase(text) => literal_pattern(text),
        Token::Word(text) => format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(text)),
    }
}

fn token_regex(token: &Token) -> Regex {
    Regex::new(&token_pattern(token)).expect("escaped token pattern is always valid")
}

/// Build the predicate for one search request.
///
/// Zero tokens and zero filters yield the universal predicate (browse
/// mode). A term list that produces no per-term nodes (possible only
/// when `fields` is empty) is treated the same way rather than matching
/// nothing.
pub fn build_predicate(
    tokens: &[Token],
    fields: &[Field],
    filters: &ExactFilters,
    mode: CombineMode,
) -> Predicate {
    let mut parts = Vec::new();

    if let Some(id) = &filters.id {
        parts.push(Predicate::ExactEq { field: Field::Id, value: id.clone() });
    }
    if let Some(drive) = &filters.drive {
        parts.push(Predicate::ExactEq { field: Field::Drive, value: drive.clone() });
    }
    if let Some(reporter) = &filters.reporter {
        parts.push(Predicate::ExactEq { field: Field::Reporter, value: reporter.clone() });
    }

    let term_nodes: Vec<Predicate> = tokens
        .iter()
        .map(|token| {
            Predicate::Or(
                fields
                    .iter()
                    .map(|&field| Predicate::FieldMatch { field, token: token.clone() })
                    .collect(),
            )
        })
        .filter(|node| !matches!(node, Predicate::Or(children) if children.is_empty()))
        .collect();

    if !term_nodes.is_empty() {
        parts.push(match mode {
            CombineMode::And => Predicate::And(term_nodes),
            CombineMode::Or => Predicate::Or(term_nodes),
        });
    }

    match parts.len() {
        0 => Predicate::all(),
        1 => parts.remove(0),
        _ => Predicate::And(parts),
    }
}
