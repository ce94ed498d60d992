//! Trait definitions for storage interactions
//!
//! These traits define the boundary between pipeline logic and
//! infrastructure. The SQLite implementation lives in chronicle-store.

use crate::artifact::{ArtifactType, EventArtifact};
use crate::confidence::{ConfidenceLevel, EvidenceTrustProfile};
use crate::event::{Entity, Event, EventStatus, EventStatusChange, EvidenceSnapshot, EvidenceSource};
use crate::fingerprint::Fingerprint;
use crate::id::{EntityId, EventId, RelationshipId, SnapshotId};
use crate::relationship::Relationship;
use crate::trust::TrustTier;
use chrono::{DateTime, Utc};

/// Result of a create-or-link dedup round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupOutcome {
    /// The event the snapshot now belongs to
    pub event_id: EventId,

    /// True when this call created the event; false when it linked a
    /// corroborating snapshot to an existing one
    pub created: bool,
}

/// Result of one scoring run against an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// The scored event
    pub event_id: EventId,

    /// Confidence written to the cached field
    pub confidence: ConfidenceLevel,

    /// Source count written to the cached field
    pub source_count: u32,

    /// Status before the run
    pub from_status: EventStatus,

    /// Status after the run (equals `from_status` when no transition)
    pub to_status: EventStatus,
}

impl ScoreOutcome {
    /// Whether this run actually moved the status
    pub fn transitioned(&self) -> bool {
        self.from_status != self.to_status
    }
}

/// Storage operations used by the ingest edge
pub trait EvidenceStore {
    /// Error type for store operations
    type Error;

    /// Create or fetch the source for a canonical URL
    ///
    /// Must be an atomic upsert keyed on the canonical URL: two
    /// concurrent writers for the same first-seen source converge on one
    /// row. The tier is only written on creation; an existing source
    /// keeps its original classification.
    fn upsert_source(
        &mut self,
        canonical_url: &str,
        domain: &str,
        tier: TrustTier,
    ) -> Result<EvidenceSource, Self::Error>;

    /// Persist an immutable snapshot
    fn insert_snapshot(&mut self, snapshot: EvidenceSnapshot) -> Result<SnapshotId, Self::Error>;

    /// Create an event for a fingerprint, or link a corroborating
    /// snapshot to the existing one
    ///
    /// Runs inside one transaction. A uniqueness race on the fingerprint
    /// must be resolved internally by retrying as a link, never surfaced
    /// to the caller.
    fn create_or_link_event(
        &mut self,
        fingerprint: &Fingerprint,
        occurred_at: DateTime<Utc>,
        snapshot_id: SnapshotId,
        changed_by: &str,
    ) -> Result<DedupOutcome, Self::Error>;
}

/// Storage operations used by the gates and moderation surfaces
pub trait EventStore {
    /// Error type for store operations
    type Error;

    /// Get an event by id
    fn get_event(&self, id: EventId) -> Result<Option<Event>, Self::Error>;

    /// Load the trust profile of an event's linked evidence
    fn trust_profile(&self, id: EventId) -> Result<EvidenceTrustProfile, Self::Error>;

    /// Artifact types currently present for an event
    fn artifact_types(&self, id: EventId) -> Result<Vec<ArtifactType>, Self::Error>;

    /// Fetch one artifact, if present
    fn get_artifact(
        &self,
        event_id: EventId,
        artifact_type: ArtifactType,
    ) -> Result<Option<EventArtifact>, Self::Error>;

    /// Create or replace an artifact, bumping its version; returns the
    /// new version number
    fn put_artifact(
        &mut self,
        event_id: EventId,
        artifact_type: ArtifactType,
        body: &str,
    ) -> Result<u32, Self::Error>;

    /// Apply one scoring run inside a transaction
    ///
    /// Re-reads the current status immediately before writing, always
    /// refreshes the cached confidence and source count, conditionally
    /// updates the status per the transition rule, and appends an audit
    /// row only when the status actually changed.
    fn apply_score(
        &mut self,
        event_id: EventId,
        confidence: ConfidenceLevel,
        effective_gate: EventStatus,
        reason: &str,
        changed_by: &str,
    ) -> Result<ScoreOutcome, Self::Error>;

    /// Full append-only status history, oldest first
    fn status_history(&self, id: EventId) -> Result<Vec<EventStatusChange>, Self::Error>;

    /// Create or fetch an entity by canonical name
    fn upsert_entity(&mut self, name: &str, entity_type: &str) -> Result<Entity, Self::Error>;

    /// Attach an entity mention to an event (idempotent)
    fn attach_entity(&mut self, event_id: EventId, entity_id: EntityId)
        -> Result<(), Self::Error>;

    /// Entities mentioned by an event
    fn event_entities(&self, id: EventId) -> Result<Vec<Entity>, Self::Error>;

    /// Persist a relationship claim with its safety verdict
    fn insert_relationship(&mut self, rel: Relationship) -> Result<RelationshipId, Self::Error>;

    /// Relationship claims extracted from an event
    fn event_relationships(&self, id: EventId) -> Result<Vec<Relationship>, Self::Error>;

    /// Lookup a source by id (for tier display and audit tooling)
    fn get_source(&self, id: crate::id::SourceId) -> Result<Option<EvidenceSource>, Self::Error>;
}
