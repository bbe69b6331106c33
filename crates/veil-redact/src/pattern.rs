//! Literal-to-matcher compilation
//!
//! A sensitive string is matched differently depending on its provenance:
//! - Detected entities (any non-"MANUAL" category) are matched
//!   case-insensitively with word boundaries on both sides, so "Ana" never
//!   matches inside "Anabela".
//! - Manual selections are user-delimited, so no word boundaries apply; they
//!   are matched case-insensitively across lines, with any run of whitespace
//!   around an embedded newline matching any amount of whitespace around a
//!   newline in the target. This accommodates selections copied across
//!   line-wrapped text.
//!
//! All regex metacharacters in the literal are escaped before either
//! transformation, so punctuation-heavy strings match literally.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use veil_core::{Error, Result};

/// A run of whitespace containing at least one newline, in the original.
static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").expect("newline-run pattern is valid"));

fn validate(literal: &str) -> Result<()> {
    if literal.trim().is_empty() {
        return Err(Error::InvalidEntity(
            "entity strings must be non-empty".to_string(),
        ));
    }
    Ok(())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Compile a detected-entity literal: case-insensitive, word-bounded.
///
/// A `\b` is only anchored on a side whose edge character is a word
/// character; against a punctuation edge (`"Acme Corp."`) the assertion can
/// never hold and would silently leave the span unredacted.
pub fn entity_pattern(literal: &str) -> Result<Regex> {
    validate(literal)?;
    let mut body = String::new();
    if literal.chars().next().is_some_and(is_word_char) {
        body.push_str(r"\b");
    }
    body.push_str(&regex::escape(literal));
    if literal.chars().last().is_some_and(is_word_char) {
        body.push_str(r"\b");
    }
    RegexBuilder::new(&body)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Pattern(e.to_string()))
}

/// The manual-selection pattern body for `literal`, without flags.
///
/// Segments between whitespace-wrapped newlines are escaped individually and
/// rejoined with `\s*\n\s*`.
pub(crate) fn manual_pattern_body(literal: &str) -> Result<String> {
    validate(literal)?;
    let segments: Vec<String> = NEWLINE_RUN
        .split(literal)
        .map(regex::escape)
        .collect();
    Ok(segments.join(r"\s*\n\s*"))
}

/// Compile a manual-selection literal: case-insensitive, newline-tolerant,
/// no word boundaries.
pub fn manual_pattern(literal: &str) -> Result<Regex> {
    let body = manual_pattern_body(literal)?;
    RegexBuilder::new(&body)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .multi_line(true)
        .build()
        .map_err(|e| Error::Pattern(e.to_string()))
}
