//! Core pipeline rows: sources, snapshots, events, evidence links, audit

use crate::confidence::ConfidenceLevel;
use crate::fingerprint::Fingerprint;
use crate::id::{EntityId, EventId, SnapshotId, SourceId};
use crate::trust::TrustTier;
use chrono::{DateTime, Utc};

/// Lifecycle status of an Event
///
/// `Raw → Enriched → Verified → {Published | Quarantined}`;
/// `Quarantined → Published` is the only allowed move out of quarantine.
/// `Blocked` is terminal and reachable only through external moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// Just created from the first evidence sighting
    Raw,

    /// Entities/relationships extracted
    Enriched,

    /// Content artifacts generated
    Verified,

    /// Visible on the public feed
    Published,

    /// Held back; visible only in moderation views
    Quarantined,

    /// Removed by external moderation (terminal)
    Blocked,
}

impl EventStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Raw => "raw",
            EventStatus::Enriched => "enriched",
            EventStatus::Verified => "verified",
            EventStatus::Published => "published",
            EventStatus::Quarantined => "quarantined",
            EventStatus::Blocked => "blocked",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "raw" => Some(EventStatus::Raw),
            "enriched" => Some(EventStatus::Enriched),
            "verified" => Some(EventStatus::Verified),
            "published" => Some(EventStatus::Published),
            "quarantined" => Some(EventStatus::Quarantined),
            "blocked" => Some(EventStatus::Blocked),
            _ => None,
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid event status: {}", s))
    }
}

/// A classified source of evidence, keyed by canonical URL
///
/// The trust tier is assigned once at creation and never re-evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSource {
    /// Unique identifier
    pub id: SourceId,

    /// Canonical URL (unique source identity)
    pub canonical_url: String,

    /// Lower-cased host with leading `www.` removed
    pub domain: String,

    /// Trust tier assigned at creation
    pub trust_tier: TrustTier,

    /// When this source was first seen
    pub created_at: DateTime<Utc>,
}

/// Immutable capture of one fetch of a source at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSnapshot {
    /// Unique identifier
    pub id: SnapshotId,

    /// Owning source
    pub source_id: SourceId,

    /// SHA-256 of the fetched content
    pub content_hash: String,

    /// Title as fetched
    pub title: String,

    /// Full text as fetched
    pub full_text: String,

    /// When the item claims to have been published
    pub published_at: Option<DateTime<Utc>>,

    /// When the fetch happened
    pub fetched_at: DateTime<Utc>,
}

/// The unit of publication
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Unique identifier
    pub id: EventId,

    /// Deterministic dedup key (unique)
    pub fingerprint: Fingerprint,

    /// Current lifecycle status
    pub status: EventStatus,

    /// Cached confidence from the last scoring run
    pub confidence: ConfidenceLevel,

    /// Cached count of linked evidence rows
    pub source_count: u32,

    /// When the underlying story occurred (day granularity matters)
    pub occurred_at: DateTime<Utc>,

    /// When the event row was created
    pub created_at: DateTime<Utc>,
}

/// Role of a snapshot in an event's evidence set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceRole {
    /// The snapshot that created the event
    Primary,

    /// A later corroborating snapshot
    Supporting,
}

impl EvidenceRole {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceRole::Primary => "primary",
            EvidenceRole::Supporting => "supporting",
        }
    }

    /// Parse a role from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primary" => Some(EvidenceRole::Primary),
            "supporting" => Some(EvidenceRole::Supporting),
            _ => None,
        }
    }
}

/// Append-only audit row for one status transition
///
/// Never updated or deleted. `from_status` is `None` only for the
/// creation row; `to_status` always differs from `from_status`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStatusChange {
    /// The event that transitioned
    pub event_id: EventId,

    /// Status before the transition (None at creation)
    pub from_status: Option<EventStatus>,

    /// Status after the transition
    pub to_status: EventStatus,

    /// Human-readable explanation of the transition
    pub reason: String,

    /// Acting component or moderator
    pub changed_by: String,

    /// When the transition happened
    pub changed_at: DateTime<Utc>,
}

/// An extracted entity (company, model, person, ...) mentioned by events
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique identifier
    pub id: EntityId,

    /// Canonical display name (unique)
    pub name: String,

    /// Free-form entity type from extraction (e.g. "company", "model")
    pub entity_type: String,

    /// When this entity was first extracted
    pub created_at: DateTime<Utc>,
}
