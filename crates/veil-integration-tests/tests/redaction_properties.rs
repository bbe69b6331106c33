//! Core engine properties: roundtrip, stability, boundaries, idempotence

use std::collections::BTreeMap;
use tempfile::TempDir;
use veil_core::{EntityMap, MANUAL_CATEGORY, RedactionMap, is_tag};
use veil_redact::{Redactor, unredact};

fn entity_map(pairs: &[(&str, &[&str])]) -> EntityMap {
    let mut map = EntityMap::new();
    for (category, strings) in pairs {
        map.insert(
            category.to_string(),
            strings.iter().map(|s| s.to_string()).collect(),
        );
    }
    map
}

fn temp_redactor() -> (TempDir, Redactor) {
    let dir = TempDir::new().unwrap();
    let redactor = Redactor::new(dir.path().join("redactions.db"));
    (dir, redactor)
}

#[tokio::test]
async fn roundtrip_restores_original_text() {
    let (_dir, redactor) = temp_redactor();
    let text = "Dr. Ana Pereira of Acme Corp. met John Smith in Lisboa.\nThey signed.";
    let entities = entity_map(&[
        ("PERSON", &["Ana Pereira", "John Smith"][..]),
        ("ORG", &["Acme Corp."][..]),
        ("GPE", &["Lisboa"][..]),
    ]);

    let outcome = redactor.redact(text, &entities).await.unwrap();

    // Everything sensitive is gone from the redacted text
    for original in outcome.map.keys() {
        assert!(!outcome.text.contains(original));
    }
    assert_eq!(outcome.map.len(), 4);
    assert!(outcome.map.values().all(|tag| is_tag(tag)));

    assert_eq!(unredact(&outcome.text, &outcome.map), text);
}

#[tokio::test]
async fn roundtrip_with_manual_selection_spanning_lines() {
    let (_dir, redactor) = temp_redactor();
    let text = "before secret phrase\nsecond line after";
    let entities = entity_map(&[(MANUAL_CATEGORY, &["secret phrase\nsecond line"][..])]);

    let outcome = redactor.redact(text, &entities).await.unwrap();
    let tag = outcome.map.get("secret phrase\nsecond line").unwrap();
    assert_eq!(outcome.text, format!("before {tag} after"));
    assert_eq!(unredact(&outcome.text, &outcome.map), text);
}

#[tokio::test]
async fn tags_are_stable_across_engine_instances() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("redactions.db");
    let entities = entity_map(&[("PERSON", &["John Smith"][..])]);

    let first = Redactor::new(&db_path)
        .redact("John Smith wrote", &entities)
        .await
        .unwrap();
    // A separate engine instance over the same database, as after a restart
    let second = Redactor::new(&db_path)
        .redact("reply to John Smith", &entities)
        .await
        .unwrap();

    assert_eq!(first.map.get("John Smith"), second.map.get("John Smith"));
}

#[tokio::test]
async fn word_boundaries_protect_longer_words() {
    let (_dir, redactor) = temp_redactor();
    let outcome = redactor
        .redact(
            "Anabela called Ana",
            &entity_map(&[("PERSON", &["Ana"][..])]),
        )
        .await
        .unwrap();

    let tag = outcome.map.get("Ana").unwrap();
    assert_eq!(outcome.text, format!("Anabela called {tag}"));
}

#[tokio::test]
async fn detected_entity_matching_is_case_insensitive() {
    let (_dir, redactor) = temp_redactor();
    let outcome = redactor
        .redact(
            "Paris, PARIS and paris",
            &entity_map(&[("GPE", &["Paris"][..])]),
        )
        .await
        .unwrap();

    let tag = outcome.map.get("Paris").unwrap();
    assert_eq!(outcome.text, format!("{tag}, {tag} and {tag}"));
}

#[tokio::test]
async fn overlapping_candidates_do_not_corrupt_each_other() {
    let (_dir, redactor) = temp_redactor();
    let outcome = redactor
        .redact(
            "John Smith and John discussed John Smith",
            &entity_map(&[("PERSON", &["John", "John Smith"][..])]),
        )
        .await
        .unwrap();

    let long_tag = outcome.map.get("John Smith").unwrap();
    let short_tag = outcome.map.get("John").unwrap();
    assert_eq!(
        outcome.text,
        format!("{long_tag} and {short_tag} discussed {long_tag}")
    );
    assert_eq!(
        unredact(&outcome.text, &outcome.map),
        "John Smith and John discussed John Smith"
    );
}

#[tokio::test]
async fn reapplication_is_idempotent() {
    let (_dir, redactor) = temp_redactor();
    redactor
        .redact(
            "Ana met John Smith",
            &entity_map(&[("PERSON", &["Ana", "John Smith"][..])]),
        )
        .await
        .unwrap();

    let fresh = "ana wrote to JOHN SMITH about Ana";
    let once = redactor.apply_stored(fresh).await.unwrap();
    let twice = redactor.apply_stored(&once).await.unwrap();

    assert_ne!(once, fresh);
    assert_eq!(once, twice);
}

#[tokio::test]
async fn reapplication_sees_store_growth() {
    let (_dir, redactor) = temp_redactor();
    redactor
        .redact("Ana was here", &entity_map(&[("PERSON", &["Ana"][..])]))
        .await
        .unwrap();

    let before = redactor.apply_stored("Ana and Porto").await.unwrap();
    assert!(before.contains("Porto"));

    // Learn a new original; the cached combined matcher must be rebuilt
    redactor
        .redact("Porto by night", &entity_map(&[("GPE", &["Porto"][..])]))
        .await
        .unwrap();

    let after = redactor.apply_stored("Ana and Porto").await.unwrap();
    assert!(!after.contains("Porto"));
    assert!(!after.contains("Ana"));
}

#[tokio::test]
async fn concurrent_redactions_agree_on_one_tag() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("redactions.db");
    let entities = entity_map(&[("ORG", &["Acme Corp"][..])]);

    let mut handles = Vec::new();
    for i in 0..6 {
        let db_path = db_path.clone();
        let entities = entities.clone();
        handles.push(tokio::spawn(async move {
            Redactor::new(db_path)
                .redact(&format!("doc {i} mentions Acme Corp"), &entities)
                .await
                .unwrap()
        }));
    }

    let mut tags = Vec::new();
    for handle in handles {
        let outcome = handle.await.unwrap();
        tags.push(outcome.map.get("Acme Corp").unwrap().clone());
    }
    tags.sort();
    tags.dedup();
    assert_eq!(tags.len(), 1, "concurrent callers saw different tags");
}

#[tokio::test]
async fn redaction_map_serializes_for_transport() {
    let (_dir, redactor) = temp_redactor();
    let outcome = redactor
        .redact("Ana was here", &entity_map(&[("PERSON", &["Ana"][..])]))
        .await
        .unwrap();

    // The per-call map crosses the engine boundary as JSON
    let json = serde_json::to_string(&outcome).unwrap();
    let round: RedactionMap = serde_json::from_value(
        serde_json::from_str::<serde_json::Value>(&json).unwrap()["map"].clone(),
    )
    .unwrap();
    assert_eq!(round, outcome.map);
}

#[tokio::test]
async fn empty_entity_map_is_a_no_op() {
    let (_dir, redactor) = temp_redactor();
    let outcome = redactor
        .redact("plain text", &BTreeMap::new())
        .await
        .unwrap();
    assert_eq!(outcome.text, "plain text");
    assert!(outcome.map.is_empty());
}
