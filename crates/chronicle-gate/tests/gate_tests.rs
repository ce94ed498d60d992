//! End-to-end gate tests over the SQLite store
//!
//! These walk full pipeline scenarios: evidence arrives, artifacts are
//! generated, the publication gate scores, the relationship gate filters
//! extracted claims.

use chrono::{TimeZone, Utc};
use chronicle_domain::traits::{EvidenceStore, EventStore};
use chronicle_domain::{
    fingerprint, ArtifactType, ConfidenceLevel, EventId, EventStatus, EvidenceSnapshot,
    RelationshipStatus, SnapshotId, TrustTier, REQUIRED_ARTIFACTS,
};
use chronicle_gate::{
    ExtractedEntity, ExtractedRelationship, GateConfig, GateError, PublicationGate,
    RelationshipGate,
};
use chronicle_store::SqliteStore;

fn store() -> SqliteStore {
    SqliteStore::new(":memory:").unwrap()
}

/// Create an event backed by one snapshot per tier in `tiers`
fn event_with_evidence(store: &mut SqliteStore, tiers: &[TrustTier]) -> EventId {
    let occurred = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
    let fp = fingerprint("OpenAI releases GPT-5", occurred, "NEWSAPI");

    let mut event_id = None;
    for (i, tier) in tiers.iter().enumerate() {
        let url = format!("https://site-{}.example.com/story", i);
        let source = store
            .upsert_source(&url, &format!("site-{}.example.com", i), *tier)
            .unwrap();
        let snapshot_id = store
            .insert_snapshot(EvidenceSnapshot {
                id: SnapshotId::new(),
                source_id: source.id,
                content_hash: format!("{:064}", i),
                title: "OpenAI releases GPT-5".to_string(),
                full_text: "OpenAI has released GPT-5 today.".to_string(),
                published_at: Some(occurred),
                fetched_at: Utc::now(),
            })
            .unwrap();
        let outcome = store
            .create_or_link_event(&fp, occurred, snapshot_id, "pipeline:dedup")
            .unwrap();
        event_id = Some(outcome.event_id);
    }
    event_id.expect("at least one tier")
}

fn add_all_required_artifacts(store: &mut SqliteStore, event_id: EventId) {
    for artifact in REQUIRED_ARTIFACTS {
        store.put_artifact(event_id, *artifact, "generated body").unwrap();
    }
}

#[test]
fn test_authoritative_source_publishes() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Authoritative]);
    add_all_required_artifacts(&mut store, event_id);

    let outcome = PublicationGate::default_config()
        .score_event(&mut store, event_id)
        .unwrap();

    assert_eq!(outcome.confidence, ConfidenceLevel::High);
    assert_eq!(outcome.to_status, EventStatus::Published);
}

#[test]
fn test_missing_artifact_forces_quarantine_despite_high_confidence() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Authoritative]);
    // Everything but "what happened"
    for artifact in [ArtifactType::Headline, ArtifactType::Summary, ArtifactType::WhyItMatters] {
        store.put_artifact(event_id, artifact, "body").unwrap();
    }

    let outcome = PublicationGate::default_config()
        .score_event(&mut store, event_id)
        .unwrap();

    assert_eq!(outcome.confidence, ConfidenceLevel::High);
    assert_eq!(outcome.to_status, EventStatus::Quarantined);

    // The audit reason names the missing artifact
    let history = store.status_history(event_id).unwrap();
    let last = history.last().unwrap();
    assert!(last.reason.contains("what_happened"), "reason was: {}", last.reason);
}

#[test]
fn test_optional_commentary_never_blocks() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Authoritative]);
    add_all_required_artifacts(&mut store, event_id);
    // No gm_commentary on purpose

    let outcome = PublicationGate::default_config()
        .score_event(&mut store, event_id)
        .unwrap();
    assert_eq!(outcome.to_status, EventStatus::Published);
}

#[test]
fn test_single_low_source_quarantines() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Low]);
    add_all_required_artifacts(&mut store, event_id);

    let outcome = PublicationGate::default_config()
        .score_event(&mut store, event_id)
        .unwrap();

    assert_eq!(outcome.confidence, ConfidenceLevel::Low);
    assert_eq!(outcome.to_status, EventStatus::Quarantined);
}

#[test]
fn test_corroboration_lifts_quarantine() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Low]);
    add_all_required_artifacts(&mut store, event_id);

    let gate = PublicationGate::default_config();
    gate.score_event(&mut store, event_id).unwrap();
    assert_eq!(
        store.get_event(event_id).unwrap().unwrap().status,
        EventStatus::Quarantined
    );

    // A second corroborating snapshot arrives
    let occurred = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
    let fp = fingerprint("OpenAI releases GPT-5", occurred, "NEWSAPI");
    let source = store
        .upsert_source("https://late.example.com/story", "late.example.com", TrustTier::Low)
        .unwrap();
    let snap = store
        .insert_snapshot(EvidenceSnapshot {
            id: SnapshotId::new(),
            source_id: source.id,
            content_hash: "f".repeat(64),
            title: "OpenAI releases GPT-5".to_string(),
            full_text: "corroboration".to_string(),
            published_at: Some(occurred),
            fetched_at: Utc::now(),
        })
        .unwrap();
    store.create_or_link_event(&fp, occurred, snap, "pipeline:dedup").unwrap();

    let outcome = gate.score_event(&mut store, event_id).unwrap();
    assert_eq!(outcome.confidence, ConfidenceLevel::Medium);
    assert_eq!(outcome.to_status, EventStatus::Published);
    assert_eq!(outcome.source_count, 2);
}

#[test]
fn test_published_is_monotonic_through_the_gate() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Standard]);
    add_all_required_artifacts(&mut store, event_id);

    let gate = PublicationGate::default_config();
    gate.score_event(&mut store, event_id).unwrap();
    assert_eq!(
        store.get_event(event_id).unwrap().unwrap().status,
        EventStatus::Published
    );
    let audit_rows = store.status_history(event_id).unwrap().len();

    // Re-scoring with an unchanged evidence set is a no-op
    let rerun = gate.score_event(&mut store, event_id).unwrap();
    assert!(!rerun.transitioned());
    assert_eq!(store.status_history(event_id).unwrap().len(), audit_rows);
}

#[test]
fn test_score_missing_event_is_not_found() {
    let mut store = store();
    let result = PublicationGate::default_config().score_event(&mut store, EventId::new());
    assert!(matches!(result, Err(GateError::NotFound(_))));
}

fn entities(names: &[&str]) -> Vec<ExtractedEntity> {
    names
        .iter()
        .map(|n| ExtractedEntity {
            name: n.to_string(),
            entity_type: "company".to_string(),
            role: None,
            confidence: 0.9,
        })
        .collect()
}

fn claim(source: &str, target: &str, rel_type: &str) -> ExtractedRelationship {
    ExtractedRelationship {
        source_entity: source.to_string(),
        target_entity: target.to_string(),
        rel_type: rel_type.to_string(),
        confidence: 0.8,
    }
}

#[test]
fn test_low_risk_claim_approved_on_low_trust_event() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Low]);

    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["OpenAI", "GPT-5"]),
            &[claim("OpenAI", "GPT-5", "released")],
        )
        .unwrap();

    assert_eq!(outcome.approved, 1);
    assert_eq!(outcome.quarantined, 0);

    let rels = store.event_relationships(event_id).unwrap();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].status, RelationshipStatus::Approved);
}

#[test]
fn test_high_risk_claim_quarantined_on_low_trust_event() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Low]);

    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["BigCorp", "SmallCorp"]),
            &[claim("BigCorp", "SmallCorp", "acquired")],
        )
        .unwrap();

    assert_eq!(outcome.quarantined, 1);
    let rels = store.event_relationships(event_id).unwrap();
    assert_eq!(rels[0].status, RelationshipStatus::Quarantined);
    assert!(rels[0].status_reason.contains("authoritative"));
}

#[test]
fn test_high_risk_claim_approved_with_authoritative_evidence() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Authoritative]);

    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["BigCorp", "SmallCorp"]),
            &[claim("BigCorp", "SmallCorp", "acquired")],
        )
        .unwrap();

    assert_eq!(outcome.approved, 1);
}

#[test]
fn test_high_risk_claim_approved_with_two_standard_sources() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Standard, TrustTier::Standard]);

    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["BigCorp", "SmallCorp"]),
            &[claim("BigCorp", "SmallCorp", "acquired")],
        )
        .unwrap();

    assert_eq!(outcome.approved, 1);
}

#[test]
fn test_unknown_relationship_type_fails_closed() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Standard]);

    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["A", "B"]),
            &[claim("A", "B", "secretly_controls")],
        )
        .unwrap();

    assert_eq!(outcome.approved, 0);
    assert_eq!(outcome.quarantined, 1);
}

#[test]
fn test_unknown_entity_skips_claim_but_batch_continues() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Authoritative]);

    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["OpenAI", "GPT-5"]),
            &[
                claim("OpenAI", "Nonexistent Corp", "acquired"),
                claim("OpenAI", "GPT-5", "released"),
            ],
        )
        .unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].reason.contains("Nonexistent Corp"));
    assert_eq!(outcome.approved, 1);
    assert_eq!(store.event_relationships(event_id).unwrap().len(), 1);
}

#[test]
fn test_relationship_gate_independent_of_event_status() {
    let mut store = store();
    // Quarantined event (single low source, no artifacts)
    let event_id = event_with_evidence(&mut store, &[TrustTier::Low]);
    PublicationGate::default_config().score_event(&mut store, event_id).unwrap();
    assert_eq!(
        store.get_event(event_id).unwrap().unwrap().status,
        EventStatus::Quarantined
    );

    // A low-risk claim is still approved under it
    let outcome = RelationshipGate::default_config()
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["OpenAI", "GPT-5"]),
            &[claim("OpenAI", "GPT-5", "announced")],
        )
        .unwrap();
    assert_eq!(outcome.approved, 1);
}

#[test]
fn test_strict_config_blocks_two_source_corroboration() {
    let mut store = store();
    let event_id = event_with_evidence(&mut store, &[TrustTier::Standard, TrustTier::Standard]);

    let outcome = RelationshipGate::new(GateConfig::strict())
        .process_extraction(
            &mut store,
            event_id,
            &entities(&["BigCorp", "SmallCorp"]),
            &[claim("BigCorp", "SmallCorp", "acquired")],
        )
        .unwrap();

    assert_eq!(outcome.quarantined, 1);
}
