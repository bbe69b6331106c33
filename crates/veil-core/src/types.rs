//! Shared type aliases for redaction inputs and outputs

use std::collections::{BTreeMap, BTreeSet};

/// Category label reserved for user-selected spans.
///
/// Strings filed under this category are matched with relaxed whitespace
/// rules and without word boundaries; every other label is treated as a
/// detected-entity category (e.g. "PERSON", "ORG", "GPE").
pub const MANUAL_CATEGORY: &str = "MANUAL";

/// Sensitive strings grouped by category label.
///
/// Ordered maps/sets so a redaction pass visits entities in a deterministic
/// order regardless of how the caller assembled them.
pub type EntityMap = BTreeMap<String, BTreeSet<String>>;

/// The original→tag assignments produced by a single redaction call.
///
/// This is the transient, per-operation map handed back to the caller so a
/// redaction can be reversed without touching the persistent store.
pub type RedactionMap = BTreeMap<String, String>;
