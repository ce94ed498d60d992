//! Chronicle Domain Layer
//!
//! This crate contains the core trust-pipeline logic for Chronicle. It
//! defines the fundamental concepts, value objects, and trait interfaces
//! that all other layers depend upon, and keeps them free of I/O.
//!
//! ## Key Concepts
//!
//! - **Trust tier**: coarse reliability rank of a source domain
//! - **Fingerprint**: deterministic dedup key derived from normalized
//!   title, calendar day, and source type
//! - **Confidence**: aggregate trust signal for an event, derived from
//!   its linked evidence
//! - **Publication gate**: the decision function turning confidence and
//!   artifact completeness into a target status
//! - **Relationship risk table**: the per-claim-type safety policy
//!
//! ## Architecture
//!
//! - Pure decision logic only; no database or network access
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all storage interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod canonical;
pub mod confidence;
pub mod event;
pub mod fingerprint;
pub mod id;
pub mod relationship;
pub mod traits;
pub mod trust;

// Re-exports for convenience
pub use artifact::{missing_required, ArtifactType, EventArtifact, REQUIRED_ARTIFACTS};
pub use canonical::{canonicalize, CanonicalUrl, CanonicalizeError};
pub use confidence::{
    confidence_gate, effective_gate, should_transition, ConfidenceLevel, EvidenceTrustProfile,
    ScoringThresholds,
};
pub use event::{
    Entity, Event, EventStatus, EventStatusChange, EvidenceRole, EvidenceSnapshot, EvidenceSource,
};
pub use fingerprint::{fingerprint, normalize_title, Fingerprint};
pub use id::{EntityId, EventId, RelationshipId, SnapshotId, SourceId};
pub use relationship::{
    validate_relationship, Relationship, RelationshipStatus, RelationshipType, RelationshipVerdict,
    RiskClass,
};
pub use traits::{DedupOutcome, EvidenceStore, EventStore, ScoreOutcome};
pub use trust::{TrustClassifier, TrustTier};
