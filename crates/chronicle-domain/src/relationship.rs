//! Extracted entity-relationship claims and the safety gate risk table

use crate::id::{EntityId, EventId, RelationshipId};
use crate::trust::TrustTier;
use chrono::{DateTime, Utc};

/// Risk class of a relationship type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskClass {
    /// Cheap to be wrong about; approved unconditionally
    Low,

    /// Consequential business claim; needs strong evidence
    High,
}

/// Type of an extracted relationship claim
///
/// The partition into low- and high-risk types is the safety gate's
/// policy table. Unmapped types land in `Other` and are treated as
/// high-risk: the gate fails closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    /// Entity released a product/model
    Released,
    /// Entity announced something
    Announced,
    /// Entity published research
    Published,
    /// Entities partnered
    Partnered,
    /// Entity integrated another's technology
    Integrated,
    /// Entity outperformed another on a benchmark
    Beats,
    /// Entity criticized another
    Criticized,
    /// Entity acquired another
    Acquired,
    /// Entity funded another
    Funded,
    /// Entity banned another
    Banned,
    /// Entity sued another
    Sued,
    /// Person departed an organization
    Departed,
    /// Unmapped type as extracted (fails closed)
    Other(String),
}

impl RelationshipType {
    /// Parse a relationship type from an extraction payload string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "released" => RelationshipType::Released,
            "announced" => RelationshipType::Announced,
            "published" => RelationshipType::Published,
            "partnered" => RelationshipType::Partnered,
            "integrated" => RelationshipType::Integrated,
            "beats" => RelationshipType::Beats,
            "criticized" => RelationshipType::Criticized,
            "acquired" => RelationshipType::Acquired,
            "funded" => RelationshipType::Funded,
            "banned" => RelationshipType::Banned,
            "sued" => RelationshipType::Sued,
            "departed" => RelationshipType::Departed,
            other => RelationshipType::Other(other.to_string()),
        }
    }

    /// Get the type name as a string
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::Released => "released",
            RelationshipType::Announced => "announced",
            RelationshipType::Published => "published",
            RelationshipType::Partnered => "partnered",
            RelationshipType::Integrated => "integrated",
            RelationshipType::Beats => "beats",
            RelationshipType::Criticized => "criticized",
            RelationshipType::Acquired => "acquired",
            RelationshipType::Funded => "funded",
            RelationshipType::Banned => "banned",
            RelationshipType::Sued => "sued",
            RelationshipType::Departed => "departed",
            RelationshipType::Other(s) => s,
        }
    }

    /// Risk class per the safety-gate policy table
    pub fn risk(&self) -> RiskClass {
        match self {
            RelationshipType::Released
            | RelationshipType::Announced
            | RelationshipType::Published
            | RelationshipType::Partnered
            | RelationshipType::Integrated
            | RelationshipType::Beats
            | RelationshipType::Criticized => RiskClass::Low,

            RelationshipType::Acquired
            | RelationshipType::Funded
            | RelationshipType::Banned
            | RelationshipType::Sued
            | RelationshipType::Departed
            | RelationshipType::Other(_) => RiskClass::High,
        }
    }
}

/// Public visibility of a relationship claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipStatus {
    /// Safe to show on the public graph
    Approved,

    /// Held back; visible only in moderation views
    Quarantined,
}

impl RelationshipStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Approved => "approved",
            RelationshipStatus::Quarantined => "quarantined",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approved" => Some(RelationshipStatus::Approved),
            "quarantined" => Some(RelationshipStatus::Quarantined),
            _ => None,
        }
    }
}

/// A persisted relationship claim between two entities
///
/// The status never flips without `status_reason` explaining why.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Unique identifier
    pub id: RelationshipId,

    /// Subject entity
    pub source_entity_id: EntityId,

    /// Object entity
    pub target_entity_id: EntityId,

    /// Claim type
    pub rel_type: RelationshipType,

    /// Event the claim was extracted from
    pub event_id: EventId,

    /// Safety-gate verdict
    pub status: RelationshipStatus,

    /// Explanation of the verdict
    pub status_reason: String,

    /// Extraction model's own confidence in [0, 1]
    pub model_confidence: f64,

    /// When the claim was extracted
    pub created_at: DateTime<Utc>,
}

/// Outcome of the safety gate for one claim
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipVerdict {
    /// Approved or quarantined
    pub status: RelationshipStatus,

    /// Why; persisted as `status_reason`
    pub reason: String,
}

/// Apply the safety-gate policy to one relationship claim
///
/// Low-risk types are approved unconditionally. High-risk types require
/// an authoritative source or at least `min_corroboration` corroborating
/// sources of any tier; otherwise the claim is quarantined with a reason
/// naming the unmet condition. Evaluated independently of the parent
/// event's own publication status.
pub fn validate_relationship(
    rel_type: &RelationshipType,
    highest_tier: Option<TrustTier>,
    source_count: u32,
    min_corroboration: u32,
) -> RelationshipVerdict {
    match rel_type.risk() {
        RiskClass::Low => RelationshipVerdict {
            status: RelationshipStatus::Approved,
            reason: format!("Low-risk relationship type '{}'", rel_type.as_str()),
        },
        RiskClass::High => {
            if highest_tier == Some(TrustTier::Authoritative) {
                RelationshipVerdict {
                    status: RelationshipStatus::Approved,
                    reason: format!(
                        "High-risk type '{}' backed by an authoritative source",
                        rel_type.as_str()
                    ),
                }
            } else if source_count >= min_corroboration {
                RelationshipVerdict {
                    status: RelationshipStatus::Approved,
                    reason: format!(
                        "High-risk type '{}' corroborated by {} sources",
                        rel_type.as_str(),
                        source_count
                    ),
                }
            } else {
                RelationshipVerdict {
                    status: RelationshipStatus::Quarantined,
                    reason: format!(
                        "High-risk type '{}' requires an authoritative source or at least {} corroborating sources (have {}, highest tier {})",
                        rel_type.as_str(),
                        min_corroboration,
                        source_count,
                        highest_tier.map(|t| t.as_str()).unwrap_or("none"),
                    ),
                }
            }
        }
    }
}
