//! Veil redaction engine
//!
//! This crate provides the reversible pseudonymization core:
//! - Literal-to-matcher compilation (word-bounded vs. whitespace-tolerant)
//! - Redaction of categorized entity sets with stable, persisted tags
//! - Reapplication of previously stored redactions to new text
//! - De-redaction via a per-call map or via the mapping store
//! - Text cleanup for freshly ingested documents

pub mod clean;
pub mod pattern;
mod reapply;
mod redactor;
mod substitute;

pub use clean::clean_text;
pub use pattern::{entity_pattern, manual_pattern};
pub use redactor::{RedactionOutcome, Redactor, unredact};
