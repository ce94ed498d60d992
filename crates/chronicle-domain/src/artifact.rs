//! Generated content artifacts whose existence gates publication

use crate::id::EventId;
use chrono::{DateTime, Utc};

/// Kind of generated content attached to an event
///
/// The first four are required before an event may publish; GM commentary
/// is optional and never blocks publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactType {
    /// One-line headline
    Headline,

    /// Short summary paragraph
    Summary,

    /// "What happened" narrative
    WhatHappened,

    /// "Why it matters" analysis
    WhyItMatters,

    /// Optional color commentary
    GmCommentary,
}

/// Artifact types that must exist before an event may publish
pub const REQUIRED_ARTIFACTS: &[ArtifactType] = &[
    ArtifactType::Headline,
    ArtifactType::Summary,
    ArtifactType::WhatHappened,
    ArtifactType::WhyItMatters,
];

impl ArtifactType {
    /// Get the artifact type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Headline => "headline",
            ArtifactType::Summary => "summary",
            ArtifactType::WhatHappened => "what_happened",
            ArtifactType::WhyItMatters => "why_it_matters",
            ArtifactType::GmCommentary => "gm_commentary",
        }
    }

    /// Parse an artifact type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "headline" => Some(ArtifactType::Headline),
            "summary" => Some(ArtifactType::Summary),
            "what_happened" => Some(ArtifactType::WhatHappened),
            "why_it_matters" => Some(ArtifactType::WhyItMatters),
            "gm_commentary" => Some(ArtifactType::GmCommentary),
            _ => None,
        }
    }
}

/// Versioned generated content keyed by `(event_id, artifact_type)`
///
/// Only existence gates publication; the body is presentation-layer data.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArtifact {
    /// Owning event
    pub event_id: EventId,

    /// Kind of artifact
    pub artifact_type: ArtifactType,

    /// Regeneration counter, starts at 1
    pub version: u32,

    /// Generated content
    pub body: String,

    /// When this version was generated
    pub generated_at: DateTime<Utc>,
}

/// Compute which required artifacts are missing from a present set
pub fn missing_required(present: &[ArtifactType]) -> Vec<ArtifactType> {
    REQUIRED_ARTIFACTS
        .iter()
        .copied()
        .filter(|required| !present.contains(required))
        .collect()
}
