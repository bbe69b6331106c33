//! Combined matcher over every stored original
//!
//! Reapplication masks all historically known sensitive values in new text.
//! Instead of rescanning the text once per stored original, all originals
//! are compiled into a single alternation (descending length, one capture
//! group each) and applied in one pass. The compiled matcher is cached by
//! the engine and rebuilt whenever the stored entry set changes.

use regex::{Regex, RegexBuilder};
use veil_core::{Error, Result};

use crate::pattern::manual_pattern_body;

pub(crate) struct StoredMatcher {
    /// (original, tag) entries the pattern was built from, in pattern order.
    /// Doubles as the cache key: a differing store snapshot forces a rebuild.
    entries: Vec<(String, String)>,
    pattern: Regex,
}

impl StoredMatcher {
    /// Build a matcher from store entries sorted by descending original
    /// length. Returns `None` for an empty store.
    pub(crate) fn build(entries: Vec<(String, String)>) -> Result<Option<Self>> {
        if entries.is_empty() {
            return Ok(None);
        }

        let alternation = entries
            .iter()
            .map(|(original, _)| Ok(format!("({})", manual_pattern_body(original)?)))
            .collect::<Result<Vec<_>>>()?
            .join("|");

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .multi_line(true)
            .build()
            .map_err(|e| Error::Pattern(e.to_string()))?;

        Ok(Some(Self { entries, pattern }))
    }

    pub(crate) fn covers(&self, entries: &[(String, String)]) -> bool {
        self.entries == entries
    }

    /// Replace every match with the tag of whichever original matched.
    pub(crate) fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &regex::Captures| {
                for (index, (_, tag)) in self.entries.iter().enumerate() {
                    if caps.get(index + 1).is_some() {
                        return tag.clone();
                    }
                }
                // Every alternative is a capture group, so one always matched
                caps[0].to_string()
            })
            .into_owned()
    }
}
