//! Veil Core Types
//!
//! This crate provides the fundamental types used throughout Veil:
//! - The shared error type and `Result` alias
//! - Entity map and redaction map aliases
//! - Tag minting and tag-shape recognition

pub mod error;
pub mod tag;
pub mod types;

pub use error::{Error, Result};
pub use tag::{TAG_PATTERN, is_tag, mint_tag};
pub use types::{EntityMap, MANUAL_CATEGORY, RedactionMap};
