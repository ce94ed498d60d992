//! End-to-end ingest tests: raw items in, deduplicated events out,
//! extraction payloads through the safety gate.

use chrono::{TimeZone, Utc};
use chronicle_domain::traits::EventStore;
use chronicle_domain::{EventStatus, RelationshipStatus, TrustTier, REQUIRED_ARTIFACTS};
use chronicle_gate::{PublicationGate, RelationshipGate};
use chronicle_ingest::{parse_extraction, IngestConfig, IngestError, IngestItem, Ingestor};
use chronicle_store::SqliteStore;

fn store() -> SqliteStore {
    SqliteStore::new(":memory:").unwrap()
}

fn item(url: &str, title: &str) -> IngestItem {
    IngestItem {
        url: url.to_string(),
        title: title.to_string(),
        content: format!("{} -- full story text", title),
        published_at: Some(Utc.with_ymd_and_hms(2025, 3, 14, 8, 30, 0).unwrap()),
        source_type: "NEWSAPI".to_string(),
    }
}

#[test]
fn test_ingest_classifies_and_creates_event() {
    let mut store = store();
    let ingestor = Ingestor::default_config();

    let outcome = ingestor
        .ingest(&mut store, item("https://openai.com/blog/gpt-5", "OpenAI releases GPT-5"))
        .unwrap();

    assert!(outcome.event_created);
    assert_eq!(outcome.trust_tier, TrustTier::Authoritative);

    let event = store.get_event(outcome.event_id).unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Raw);
    assert_eq!(event.source_count, 1);
}

#[test]
fn test_equivalent_urls_collapse_to_one_source() {
    let mut store = store();
    let ingestor = Ingestor::default_config();

    let first = ingestor
        .ingest(
            &mut store,
            item("http://techcrunch.com/story/?utm_source=tw", "Headline one"),
        )
        .unwrap();
    let second = ingestor
        .ingest(&mut store, item("https://techcrunch.com/story", "Headline two"))
        .unwrap();

    assert_eq!(first.source_id, second.source_id);
}

#[test]
fn test_same_story_corroborates_one_event() {
    let mut store = store();
    let ingestor = Ingestor::default_config();

    let first = ingestor
        .ingest(&mut store, item("https://a.example.com/1", "OpenAI releases GPT-5"))
        .unwrap();
    let second = ingestor
        .ingest(&mut store, item("https://b.example.com/2", "  OPENAI   RELEASES GPT-5 "))
        .unwrap();

    assert!(first.event_created);
    assert!(!second.event_created);
    assert_eq!(first.event_id, second.event_id);

    let event = store.get_event(first.event_id).unwrap().unwrap();
    assert_eq!(event.source_count, 2);
    // Only the creation audit row exists
    assert_eq!(store.status_history(first.event_id).unwrap().len(), 1);
}

#[test]
fn test_different_day_yields_new_event() {
    let mut store = store();
    let ingestor = Ingestor::default_config();

    let first = ingestor
        .ingest(&mut store, item("https://a.example.com/1", "OpenAI releases GPT-5"))
        .unwrap();

    let mut next_day = item("https://b.example.com/2", "OpenAI releases GPT-5");
    next_day.published_at = Some(Utc.with_ymd_and_hms(2025, 3, 15, 8, 30, 0).unwrap());
    let second = ingestor.ingest(&mut store, next_day).unwrap();

    assert!(second.event_created);
    assert_ne!(first.event_id, second.event_id);
}

#[test]
fn test_invalid_inputs_rejected() {
    let mut store = store();
    let ingestor = Ingestor::default_config();

    let mut no_title = item("https://a.example.com/1", "  ");
    no_title.title = "  ".to_string();
    assert!(matches!(
        ingestor.ingest(&mut store, no_title),
        Err(IngestError::MissingField("title"))
    ));

    let bad_url = item("definitely not a url", "Fine title");
    assert!(matches!(ingestor.ingest(&mut store, bad_url), Err(IngestError::InvalidUrl(_))));

    let ingestor = Ingestor::new(
        chronicle_domain::TrustClassifier::new(),
        IngestConfig { max_text_len: 8, ..IngestConfig::default() },
    );
    let too_long = item("https://a.example.com/1", "Fine title");
    assert!(matches!(
        ingestor.ingest(&mut store, too_long),
        Err(IngestError::TextTooLong(_, 8))
    ));
}

#[test]
fn test_full_pipeline_ingest_to_published_with_relationships() {
    let mut store = store();
    let ingestor = Ingestor::default_config();

    // An authoritative vendor post about an acquisition
    let outcome = ingestor
        .ingest(
            &mut store,
            item("https://openai.com/blog/acquisition", "OpenAI acquires Rockset"),
        )
        .unwrap();
    let event_id = outcome.event_id;

    for artifact in REQUIRED_ARTIFACTS {
        store.put_artifact(event_id, *artifact, "generated").unwrap();
    }

    let scored = PublicationGate::default_config().score_event(&mut store, event_id).unwrap();
    assert_eq!(scored.to_status, EventStatus::Published);

    let payload = parse_extraction(
        r#"{
            "entities": [
                {"name": "OpenAI", "type": "company", "confidence": 0.95},
                {"name": "Rockset", "type": "company", "confidence": 0.93}
            ],
            "relationships": [
                {"source_entity": "OpenAI", "target_entity": "Rockset", "type": "acquired", "confidence": 0.9}
            ]
        }"#,
    )
    .unwrap();

    let gated = RelationshipGate::default_config()
        .process_extraction(&mut store, event_id, &payload.entities, &payload.relationships)
        .unwrap();

    // High-risk claim, but the evidence is authoritative
    assert_eq!(gated.approved, 1);
    let rels = store.event_relationships(event_id).unwrap();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].status, RelationshipStatus::Approved);
}
