//! Plain-text cleanup for ingested documents

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<]+?>").expect("html-tag pattern is valid"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("blank-run pattern is valid"));

/// Normalize extracted text before detection/redaction: strip HTML-like
/// tags, collapse blank-line runs to a single newline, trim the ends.
pub fn clean_text(text: &str) -> String {
    let text = HTML_TAG.replace_all(text, "");
    let text = BLANK_RUN.replace_all(&text, "\n");
    text.trim().to_string()
}
