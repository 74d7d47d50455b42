//! Match highlighting for display text.
//!
//! Re-tokenizes the raw query with [`crate::query::tokenize`] (the same
//! rules the predicate builder uses) and splits the text into segments
//! tagged matched or plain. Every token is applied as a case-insensitive
//! literal probe: even whole-word terms highlight all their literal
//! occurrences, so a search for `red` still marks the `red` inside
//! `reduction` on screen.

use regex::Regex;
use serde::Serialize;

use crate::query::{literal_pattern, tokenize};

/// A contiguous run of display text, tagged when it matched a query term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), matched: false }
    }

    fn hit(text: &str) -> Self {
        Self { text: text.to_string(), matched: true }
    }
}

/// Split `text` into segments that cover it exactly, marking every
/// case-insensitive occurrence of each query term.
///
/// Terms are applied in query order against the accumulated segment list.
/// A span already marked matched is skipped whole, so a later term never
/// re-splits an earlier highlight. Concatenating the returned segment
/// texts always reproduces `text`.
pub fn highlight(text: &str, raw_query: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let tokens = tokenize(raw_query);
    if tokens.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = vec![Segment::plain(text)];
    for token in &tokens {
        let probe = literal_probe(token.text());
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.matched {
                next.push(segment);
                continue;
            }
            split_plain(&segment.text, &probe, &mut next);
        }
        segments = next;
    }
    segments
}

/// Case-insensitive literal matcher for one term.
fn literal_probe(term: &str) -> Regex {
    Regex::new(&literal_pattern(term)).expect("escaped literal is always a valid pattern")
}

fn split_plain(text: &str, probe: &Regex, out: &mut Vec<Segment>) {
    let mut cursor = 0;
    for hit in probe.find_iter(text) {
        if hit.start() > cursor {
            out.push(Segment::plain(&text[cursor..hit.start()]));
        }
        out.push(Segment::hit(hit.as_str()));
        cursor = hit.end();
    }
    if cursor == 0 {
        // No occurrence; keep the segment as one piece.
        out.push(Segment::plain(text));
    } else if cursor < text.len() {
        out.push(Segment::plain(&text[cursor..]));
    }
}
