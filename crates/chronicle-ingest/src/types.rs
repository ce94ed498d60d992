//! Request and response types for ingestion

use chronicle_domain::{EventId, SnapshotId, SourceId, TrustTier};
use chronicle_gate::{ExtractedEntity, ExtractedRelationship};
use chrono::{DateTime, Utc};

/// A raw feed item handed over by a per-source fetcher
#[derive(Debug, Clone)]
pub struct IngestItem {
    /// Raw item URL (canonicalized here)
    pub url: String,

    /// Item title as fetched
    pub title: String,

    /// Full item content as fetched
    pub content: String,

    /// When the item claims to have been published; falls back to the
    /// ingest time for fingerprinting when absent
    pub published_at: Option<DateTime<Utc>>,

    /// Fetcher identifier (HACKERNEWS, GITHUB, ARXIV, NEWSAPI, RSS, ...)
    pub source_type: String,
}

/// What one ingested item became
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Source row the snapshot attached to
    pub source_id: SourceId,

    /// Trust tier of that source (assigned at its creation)
    pub trust_tier: TrustTier,

    /// The snapshot that was written
    pub snapshot_id: SnapshotId,

    /// The event the snapshot now belongs to
    pub event_id: EventId,

    /// Whether this item created the event or corroborated it
    pub event_created: bool,
}

/// A schema-validated LLM extraction payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionPayload {
    /// Entity mentions that survived per-entry validation
    pub entities: Vec<ExtractedEntity>,

    /// Relationship claims that survived per-entry validation
    pub relationships: Vec<ExtractedRelationship>,
}
