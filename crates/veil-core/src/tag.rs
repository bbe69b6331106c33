//! Tag minting and shape recognition
//!
//! Tags have the fixed lexical shape `<ANON_xxxxxxxx>` where `xxxxxxxx` is
//! 8 lowercase hex characters, so they are machine-recognizable in plain
//! text with high probability.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Matches any well-formed tag embedded in text.
pub static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<ANON_[0-9a-f]{8}>").expect("tag pattern is valid"));

/// Mint a fresh tag from a v4 UUID.
///
/// Uniqueness is not guaranteed by construction; the mapping store enforces
/// it with a UNIQUE constraint and callers retry on collision.
pub fn mint_tag() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("<ANON_{}>", &hex[..8])
}

/// Whether `s` is exactly one well-formed tag.
pub fn is_tag(s: &str) -> bool {
    TAG_PATTERN
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}
