//! End-to-end integration tests for Veil
//!
//! The tests under `tests/` wire the redaction engine, the SQLite mapping
//! store, and the config layer together to verify the engine's properties:
//! roundtrip reversal, stable tags across sessions, idempotent
//! reapplication, and tag resolution against the persistent store.
