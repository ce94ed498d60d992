//! The relationship safety gate: per-type risk policy over extractions

use crate::{GateConfig, GateError};
use chronicle_domain::traits::EventStore;
use chronicle_domain::{
    validate_relationship, Entity, EventId, Relationship, RelationshipId, RelationshipStatus,
    RelationshipType,
};
use chrono::Utc;
use tracing::{debug, warn};

/// An extracted entity mention, already schema-validated by the ingest edge
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    /// Canonical display name
    pub name: String,

    /// Free-form type from extraction (e.g. "company", "model")
    pub entity_type: String,

    /// Role in the story, if the extractor provided one
    pub role: Option<String>,

    /// Extraction model's confidence in [0, 1]
    pub confidence: f64,
}

/// An extracted relationship claim, already schema-validated
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRelationship {
    /// Subject entity name
    pub source_entity: String,

    /// Object entity name
    pub target_entity: String,

    /// Claim type string as extracted
    pub rel_type: String,

    /// Extraction model's confidence in [0, 1]
    pub confidence: f64,
}

/// A claim the gate skipped rather than persisted
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedClaim {
    /// The claim type string as extracted
    pub rel_type: String,

    /// Why it was skipped
    pub reason: String,
}

/// Result of processing one extraction payload against an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutcome {
    /// Entities now attached to the event
    pub entities_attached: usize,

    /// Relationship claims persisted as approved
    pub approved: usize,

    /// Relationship claims persisted as quarantined
    pub quarantined: usize,

    /// Claims skipped (unknown entity names, empty fields)
    pub skipped: Vec<SkippedClaim>,
}

/// Applies the risk-table policy to extracted relationship claims
///
/// Evaluated independently of the parent event's publication status: a
/// relationship can be quarantined under a published event and vice
/// versa. One malformed claim never aborts the rest of the batch.
pub struct RelationshipGate {
    config: GateConfig,
}

impl RelationshipGate {
    /// Create a gate with the given configuration
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Create a gate with default configuration
    pub fn default_config() -> Self {
        Self::new(GateConfig::default())
    }

    /// Attach extracted entities to an event and run every relationship
    /// claim through the safety gate
    pub fn process_extraction<S: EventStore>(
        &self,
        store: &mut S,
        event_id: EventId,
        entities: &[ExtractedEntity],
        relationships: &[ExtractedRelationship],
    ) -> Result<ExtractionOutcome, GateError>
    where
        S::Error: std::fmt::Display,
    {
        store
            .get_event(event_id)
            .map_err(|e| GateError::Store(format!("Failed to load event: {}", e)))?
            .ok_or_else(|| GateError::NotFound(event_id.to_string()))?;

        let mut outcome = ExtractionOutcome::default();

        for entity in entities {
            if entity.name.trim().is_empty() {
                warn!(event = %event_id, "skipping entity with empty name");
                continue;
            }
            let stored = store
                .upsert_entity(entity.name.trim(), &entity.entity_type)
                .map_err(|e| GateError::Store(format!("Failed to upsert entity: {}", e)))?;
            store
                .attach_entity(event_id, stored.id)
                .map_err(|e| GateError::Store(format!("Failed to attach entity: {}", e)))?;
            outcome.entities_attached += 1;
        }

        // The mention list the claims must resolve against
        let mentions: Vec<Entity> = store
            .event_entities(event_id)
            .map_err(|e| GateError::Store(format!("Failed to load entities: {}", e)))?;

        let profile = store
            .trust_profile(event_id)
            .map_err(|e| GateError::Store(format!("Failed to load trust profile: {}", e)))?;

        for claim in relationships {
            let source = match resolve(&mentions, &claim.source_entity) {
                Some(e) => e,
                None => {
                    warn!(
                        event = %event_id,
                        entity = %claim.source_entity,
                        "skipping claim with unknown source entity"
                    );
                    outcome.skipped.push(SkippedClaim {
                        rel_type: claim.rel_type.clone(),
                        reason: format!("Unknown source entity '{}'", claim.source_entity),
                    });
                    continue;
                }
            };
            let target = match resolve(&mentions, &claim.target_entity) {
                Some(e) => e,
                None => {
                    warn!(
                        event = %event_id,
                        entity = %claim.target_entity,
                        "skipping claim with unknown target entity"
                    );
                    outcome.skipped.push(SkippedClaim {
                        rel_type: claim.rel_type.clone(),
                        reason: format!("Unknown target entity '{}'", claim.target_entity),
                    });
                    continue;
                }
            };

            let rel_type = RelationshipType::parse(&claim.rel_type);
            let verdict = validate_relationship(
                &rel_type,
                profile.highest_tier(),
                profile.source_count,
                self.config.min_corroboration,
            );

            debug!(
                event = %event_id,
                rel_type = rel_type.as_str(),
                status = verdict.status.as_str(),
                "relationship claim gated"
            );

            match verdict.status {
                RelationshipStatus::Approved => outcome.approved += 1,
                RelationshipStatus::Quarantined => outcome.quarantined += 1,
            }

            store
                .insert_relationship(Relationship {
                    id: RelationshipId::new(),
                    source_entity_id: source.id,
                    target_entity_id: target.id,
                    rel_type,
                    event_id,
                    status: verdict.status,
                    status_reason: verdict.reason,
                    model_confidence: claim.confidence.clamp(0.0, 1.0),
                    created_at: Utc::now(),
                })
                .map_err(|e| GateError::Store(format!("Failed to insert relationship: {}", e)))?;
        }

        Ok(outcome)
    }
}

fn resolve<'a>(mentions: &'a [Entity], name: &str) -> Option<&'a Entity> {
    let needle = name.trim().to_lowercase();
    mentions.iter().find(|e| e.name.to_lowercase() == needle)
}
