//! The publication gate: confidence + artifact completeness -> status

use crate::{GateConfig, GateError};
use chronicle_domain::traits::{EventStore, ScoreOutcome};
use chronicle_domain::{
    confidence_gate, effective_gate, missing_required, ArtifactType, ConfidenceLevel, EventId,
    EvidenceTrustProfile,
};
use tracing::{debug, info};

/// Scores an event from its linked evidence and applies the transition
/// rule through the store
pub struct PublicationGate {
    config: GateConfig,
}

impl PublicationGate {
    /// Create a gate with the given configuration
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Create a gate with default configuration
    pub fn default_config() -> Self {
        Self::new(GateConfig::default())
    }

    /// Run one scoring pass against an event
    ///
    /// Loads the trust profile and artifact set, computes the effective
    /// gate status, and hands the decision to the store, which re-reads
    /// the current status inside its transaction before writing. Safe to
    /// re-run at any time; an unchanged evidence set produces no new
    /// audit rows.
    pub fn score_event<S: EventStore>(
        &self,
        store: &mut S,
        event_id: EventId,
    ) -> Result<ScoreOutcome, GateError>
    where
        S::Error: std::fmt::Display,
    {
        let event = store
            .get_event(event_id)
            .map_err(|e| GateError::Store(format!("Failed to load event: {}", e)))?
            .ok_or_else(|| GateError::NotFound(event_id.to_string()))?;

        let profile = store
            .trust_profile(event_id)
            .map_err(|e| GateError::Store(format!("Failed to load trust profile: {}", e)))?;

        let present = store
            .artifact_types(event_id)
            .map_err(|e| GateError::Store(format!("Failed to load artifacts: {}", e)))?;

        let missing = missing_required(&present);

        let confidence = profile.score_with(&self.config.thresholds);
        let effective = effective_gate(confidence_gate(confidence), &missing);
        let reason = build_reason(confidence, &profile, &missing);

        debug!(
            event = %event_id,
            current = event.status.as_str(),
            confidence = confidence.as_str(),
            effective = effective.as_str(),
            "scoring event"
        );

        let outcome = store
            .apply_score(event_id, confidence, effective, &reason, &self.config.scored_by)
            .map_err(|e| GateError::Store(format!("Failed to apply score: {}", e)))?;

        if outcome.transitioned() {
            info!(
                event = %event_id,
                from = outcome.from_status.as_str(),
                to = outcome.to_status.as_str(),
                "event status transitioned"
            );
        }

        Ok(outcome)
    }
}

/// Build the audit reason: confidence, source count, tier list, and the
/// missing-artifact list when it forced the quarantine
fn build_reason(
    confidence: ConfidenceLevel,
    profile: &EvidenceTrustProfile,
    missing: &[ArtifactType],
) -> String {
    let tiers = profile
        .tiers
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut reason = format!(
        "Confidence {} from {} source(s) [{}]",
        confidence.as_str(),
        profile.source_count,
        tiers
    );

    if !missing.is_empty() {
        let names = missing.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", ");
        reason.push_str(&format!("; missing required artifacts: {}", names));
    }

    reason
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::TrustTier;

    #[test]
    fn test_reason_encodes_profile() {
        let profile =
            EvidenceTrustProfile::new(vec![TrustTier::Authoritative, TrustTier::Standard]);
        let reason = build_reason(ConfidenceLevel::High, &profile, &[]);

        assert!(reason.contains("high"));
        assert!(reason.contains("2 source(s)"));
        assert!(reason.contains("authoritative, standard"));
        assert!(!reason.contains("missing"));
    }

    #[test]
    fn test_reason_names_missing_artifacts() {
        let profile = EvidenceTrustProfile::new(vec![TrustTier::Authoritative]);
        let reason = build_reason(
            ConfidenceLevel::High,
            &profile,
            &[ArtifactType::WhatHappened, ArtifactType::WhyItMatters],
        );

        assert!(reason.contains("missing required artifacts: what_happened, why_it_matters"));
    }
}
