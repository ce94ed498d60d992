//! Confidence scoring and the publication-gate decision functions
//!
//! Everything here is pure: the gate crate loads the inputs from storage
//! and applies the result inside a transaction.

use crate::artifact::ArtifactType;
use crate::event::EventStatus;
use crate::trust::TrustTier;

/// Aggregate trust signal for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    /// Single uncorroborated low-trust source
    Low,

    /// At least one standard source, or two corroborating sources
    Medium,

    /// At least one authoritative source, or three corroborating sources
    High,
}

impl ConfidenceLevel {
    /// Get the level name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }

    /// Parse a level from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(ConfidenceLevel::Low),
            "medium" => Some(ConfidenceLevel::Medium),
            "high" => Some(ConfidenceLevel::High),
            _ => None,
        }
    }
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid confidence level: {}", s))
    }
}

/// Tunable corroboration thresholds for confidence scoring
///
/// The defaults are the pipeline's contract; they are centralized here so
/// a deployment can tighten them without code changes.
#[derive(Debug, Clone, Copy)]
pub struct ScoringThresholds {
    /// Source count that yields High regardless of tiers
    pub high_source_count: u32,

    /// Source count that yields at least Medium regardless of tiers
    pub medium_source_count: u32,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self { high_source_count: 3, medium_source_count: 2 }
    }
}

/// The evidence inputs to confidence scoring: how many sources an event
/// has and what tiers they carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceTrustProfile {
    /// Number of linked evidence rows
    pub source_count: u32,

    /// Trust tier of each linked source (multiset; order irrelevant)
    pub tiers: Vec<TrustTier>,
}

impl EvidenceTrustProfile {
    /// Build a profile from a tier list
    pub fn new(tiers: Vec<TrustTier>) -> Self {
        Self { source_count: tiers.len() as u32, tiers }
    }

    /// Highest tier present, if any evidence is linked
    pub fn highest_tier(&self) -> Option<TrustTier> {
        self.tiers.iter().copied().max()
    }

    /// Score with the default thresholds
    pub fn score(&self) -> ConfidenceLevel {
        self.score_with(&ScoringThresholds::default())
    }

    /// Aggregate the profile into a confidence level
    pub fn score_with(&self, thresholds: &ScoringThresholds) -> ConfidenceLevel {
        let has_authoritative = self.tiers.contains(&TrustTier::Authoritative);
        let has_standard = self.tiers.contains(&TrustTier::Standard);

        if has_authoritative || self.source_count >= thresholds.high_source_count {
            ConfidenceLevel::High
        } else if has_standard || self.source_count >= thresholds.medium_source_count {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Map a confidence level to its target status
pub fn confidence_gate(level: ConfidenceLevel) -> EventStatus {
    match level {
        ConfidenceLevel::High | ConfidenceLevel::Medium => EventStatus::Published,
        ConfidenceLevel::Low => EventStatus::Quarantined,
    }
}

/// Apply the artifact-completeness override
///
/// Any missing required artifact forces the effective gate to Quarantined
/// regardless of confidence.
pub fn effective_gate(gate: EventStatus, missing_artifacts: &[ArtifactType]) -> EventStatus {
    if missing_artifacts.is_empty() {
        gate
    } else {
        EventStatus::Quarantined
    }
}

/// Decide whether an event may move from `current` to `effective`
///
/// - `Blocked` never transitions
/// - `Published` never regresses
/// - `Quarantined` transitions only upward, to `Published`
/// - `Raw`, `Enriched`, `Verified` always follow the effective gate
pub fn should_transition(current: EventStatus, effective: EventStatus) -> bool {
    if current == effective {
        return false;
    }

    match current {
        EventStatus::Blocked => false,
        EventStatus::Published => false,
        EventStatus::Quarantined => effective == EventStatus::Published,
        EventStatus::Raw | EventStatus::Enriched | EventStatus::Verified => true,
    }
}
