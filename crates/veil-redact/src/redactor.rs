//! The redaction engine
//!
//! `Redactor` owns the database location and a cached reapplication matcher.
//! Every public operation opens a `MappingStore`, does its work, and releases
//! the handle before returning; early error returns release it on drop.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use veil_core::{EntityMap, MANUAL_CATEGORY, RedactionMap, Result, TAG_PATTERN};
use veil_store_sqlite::MappingStore;

use crate::pattern::{entity_pattern, manual_pattern};
use crate::reapply::StoredMatcher;
use crate::substitute::{Candidate, substitute_all};

/// Result of one redaction call: the redacted text plus the original→tag
/// assignments actually processed, for reversal without store access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionOutcome {
    pub text: String,
    pub map: RedactionMap,
}

pub struct Redactor {
    db_path: PathBuf,
    stored_matcher: Mutex<Option<Arc<StoredMatcher>>>,
}

impl Redactor {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            stored_matcher: Mutex::new(None),
        }
    }

    async fn open_store(&self) -> Result<MappingStore> {
        MappingStore::open(&self.db_path).await
    }

    /// Redact every (category, string) pair in `entities`.
    ///
    /// Tags are reused from the current call's working map, then from the
    /// store, and only minted when the original has never been seen. All
    /// substitutions happen in one pass over the input with longer literals
    /// claiming overlapping spans first.
    ///
    /// A string with zero occurrences is not an error; its assignment is
    /// still persisted and recorded in the returned map.
    ///
    /// # Errors
    /// - `Error::InvalidEntity` / `Error::Pattern` if any string is empty or
    ///   fails to compile — the whole operation aborts rather than silently
    ///   skipping a sensitive span
    /// - `Error::Database` if the store cannot be opened or written
    pub async fn redact(&self, text: &str, entities: &EntityMap) -> Result<RedactionOutcome> {
        // Flatten to (literal, is_manual), longest first so overlapping
        // candidates cannot corrupt each other's output. The maps are
        // ordered, so the whole pass is deterministic.
        let mut literals: Vec<(&str, bool)> = Vec::new();
        for (category, strings) in entities {
            let manual = category == MANUAL_CATEGORY;
            for literal in strings {
                literals.push((literal.as_str(), manual));
            }
        }
        literals.sort_by(|a, b| {
            b.0.len()
                .cmp(&a.0.len())
                .then_with(|| a.0.cmp(&b.0))
                .then_with(|| b.1.cmp(&a.1))
        });
        literals.dedup();

        // Compile everything up front: a bad literal aborts the operation
        // before any store write
        let mut compiled = Vec::with_capacity(literals.len());
        for (literal, manual) in &literals {
            let pattern = if *manual {
                manual_pattern(literal)?
            } else {
                entity_pattern(literal)?
            };
            compiled.push(pattern);
        }

        let store = self.open_store().await?;
        let mut map = RedactionMap::new();
        let mut candidates = Vec::with_capacity(literals.len());
        for ((literal, _), pattern) in literals.iter().zip(compiled) {
            let tag = match map.get(*literal) {
                Some(tag) => tag.clone(),
                None => {
                    let tag = store.assign_tag(literal).await?;
                    map.insert((*literal).to_string(), tag.clone());
                    tag
                }
            };
            candidates.push(Candidate {
                pattern,
                replacement: tag,
            });
        }
        store.close().await;

        debug!(entities = map.len(), "Redacted entity set");
        Ok(RedactionOutcome {
            text: substitute_all(text, &candidates),
            map,
        })
    }

    /// Mask every historically stored original in `text`, using the
    /// whitespace/newline-tolerant manual rules for all of them.
    ///
    /// Used so previously redacted content stays redacted when re-ingested,
    /// before any fresh entity detection runs. Idempotent: tags never match
    /// originals, so reapplying to already-masked text changes nothing.
    pub async fn apply_stored(&self, text: &str) -> Result<String> {
        let store = self.open_store().await?;
        let originals = store.list_originals().await?;
        let mut entries = Vec::with_capacity(originals.len());
        for original in originals {
            if let Some(tag) = store.get_tag(&original).await? {
                entries.push((original, tag));
            }
        }
        store.close().await;

        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        match self.stored_matcher_for(entries)? {
            Some(matcher) => Ok(matcher.apply(text)),
            None => Ok(text.to_string()),
        }
    }

    /// Return the cached combined matcher if it still covers the store
    /// snapshot, otherwise rebuild and cache it.
    fn stored_matcher_for(
        &self,
        entries: Vec<(String, String)>,
    ) -> Result<Option<Arc<StoredMatcher>>> {
        let mut cache = self
            .stored_matcher
            .lock()
            .expect("stored matcher lock poisoned");
        if let Some(cached) = cache.as_ref()
            && cached.covers(&entries)
        {
            return Ok(Some(cached.clone()));
        }

        debug!(entries = entries.len(), "Rebuilding stored-redaction matcher");
        let built = StoredMatcher::build(entries)?.map(Arc::new);
        *cache = built.clone();
        Ok(built)
    }

    /// Persist every (original, tag) pair of an explicit map, then apply it
    /// to `text` with word-bounded case-insensitive matching.
    ///
    /// This replays a previously exported redaction map onto new text.
    pub async fn apply_map(&self, text: &str, map: &RedactionMap) -> Result<String> {
        // Compile first so a bad literal aborts before any store write
        let mut pairs: Vec<(&str, &str, regex::Regex)> = Vec::with_capacity(map.len());
        for (original, tag) in map {
            pairs.push((original.as_str(), tag.as_str(), entity_pattern(original)?));
        }
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let store = self.open_store().await?;
        for (original, tag, _) in &pairs {
            store.upsert(original, tag).await?;
        }
        store.close().await;

        let candidates: Vec<Candidate> = pairs
            .into_iter()
            .map(|(_, tag, pattern)| Candidate {
                pattern,
                replacement: tag.to_string(),
            })
            .collect();
        Ok(substitute_all(text, &candidates))
    }

    /// Resolve every well-formed tag in `text` back to its original via the
    /// store. Tags with no stored original are left in place; that is
    /// observable (logged) but never fatal.
    pub async fn resolve_tags(&self, text: &str) -> Result<String> {
        let found: BTreeSet<&str> = TAG_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
        debug!(tags = found.len(), "Resolving tags found in input");
        if found.is_empty() {
            return Ok(text.to_string());
        }

        let store = self.open_store().await?;
        let mut result = text.to_string();
        let mut unresolved = 0usize;
        for tag in found {
            match store.get_original(tag).await? {
                Some(original) => result = result.replace(tag, &original),
                None => {
                    warn!(tag, "No original stored for tag, leaving it in place");
                    unresolved += 1;
                }
            }
        }
        store.close().await;

        if unresolved > 0 {
            warn!(unresolved, "Some tags could not be resolved");
        }
        Ok(result)
    }
}

/// Reverse one redaction call's output using only its map: pure string
/// substitution of each tag back to its original, no store access.
pub fn unredact(text: &str, map: &RedactionMap) -> String {
    let mut result = text.to_string();
    for (original, tag) in map {
        result = result.replace(tag.as_str(), original.as_str());
    }
    result
}
