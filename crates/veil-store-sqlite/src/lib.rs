//! SQLite-backed mapping store for Veil
//!
//! Persists the original↔tag table that makes redaction stable across
//! documents and sessions, and reversible later. The store is opened per
//! logical operation and released when the operation finishes.

mod mapping_store;

pub use mapping_store::MappingStore;
