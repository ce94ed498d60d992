//! Ingest a raw feed item into the evidence pipeline

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::types::{IngestItem, IngestOutcome};
use chronicle_domain::traits::EvidenceStore;
use chronicle_domain::{canonicalize, fingerprint, EvidenceSnapshot, SnapshotId, TrustClassifier};
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Turns raw feed items into sources, snapshots, and deduplicated events
pub struct Ingestor {
    classifier: TrustClassifier,
    config: IngestConfig,
}

impl Ingestor {
    /// Create an ingestor with the given classifier and configuration
    pub fn new(classifier: TrustClassifier, config: IngestConfig) -> Self {
        Self { classifier, config }
    }

    /// Create an ingestor with built-in allow-lists and defaults
    pub fn default_config() -> Self {
        Self::new(TrustClassifier::new(), IngestConfig::default())
    }

    /// Ingest one feed item
    ///
    /// Canonicalizes the URL, classifies the source on first sight,
    /// writes an immutable snapshot, and runs create-or-link dedup.
    /// Redelivering the same item re-links the same snapshot id only if
    /// the caller reuses it; a fresh call writes a new snapshot that
    /// corroborates the same event.
    pub fn ingest<S: EvidenceStore>(
        &self,
        store: &mut S,
        item: IngestItem,
    ) -> Result<IngestOutcome, IngestError>
    where
        S::Error: std::fmt::Display,
    {
        if item.title.trim().is_empty() {
            return Err(IngestError::MissingField("title"));
        }
        if item.source_type.trim().is_empty() {
            return Err(IngestError::MissingField("source_type"));
        }
        if item.content.len() > self.config.max_text_len {
            return Err(IngestError::TextTooLong(item.content.len(), self.config.max_text_len));
        }

        let canonical = canonicalize(&item.url)?;
        let tier = self.classifier.classify(canonical.domain());

        let source = store
            .upsert_source(canonical.as_str(), canonical.domain(), tier)
            .map_err(|e| IngestError::Store(format!("Failed to upsert source: {}", e)))?;

        debug!(
            url = %canonical,
            domain = canonical.domain(),
            tier = source.trust_tier.as_str(),
            "source resolved"
        );

        let snapshot = EvidenceSnapshot {
            id: SnapshotId::new(),
            source_id: source.id,
            content_hash: content_hash(&item.content),
            title: item.title.clone(),
            full_text: item.content,
            published_at: item.published_at,
            fetched_at: Utc::now(),
        };
        let snapshot_id = store
            .insert_snapshot(snapshot)
            .map_err(|e| IngestError::Store(format!("Failed to insert snapshot: {}", e)))?;

        let occurred_at = item.published_at.unwrap_or_else(Utc::now);
        let fp = fingerprint(&item.title, occurred_at, item.source_type.trim());

        let dedup = store
            .create_or_link_event(&fp, occurred_at, snapshot_id, &self.config.changed_by)
            .map_err(|e| IngestError::Store(format!("Failed to create or link event: {}", e)))?;

        info!(
            event = %dedup.event_id,
            created = dedup.created,
            fingerprint = %fp,
            "item ingested"
        );

        Ok(IngestOutcome {
            source_id: source.id,
            trust_tier: source.trust_tier,
            snapshot_id,
            event_id: dedup.event_id,
            event_created: dedup.created,
        })
    }
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
