//! File-based configuration for Veil
//!
//! Provider API keys and the mapping-database location live in a TOML file
//! with an explicit lifecycle: load at startup, mutate through a setter,
//! persist on change. There is no ambient global configuration state.

mod file_store;

pub use file_store::{FileConfigStore, KeyStatus, VeilConfig};
