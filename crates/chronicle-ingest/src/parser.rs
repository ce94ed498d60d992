//! Parse and schema-validate LLM extraction output
//!
//! A malformed envelope is a validation failure; a malformed individual
//! entry is skipped with a warning and never aborts the batch.

use crate::error::IngestError;
use crate::types::ExtractionPayload;
use chronicle_gate::{ExtractedEntity, ExtractedRelationship};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct EntityEntry {
    name: String,
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    role: Option<String>,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RelationshipEntry {
    source_entity: String,
    target_entity: String,
    #[serde(rename = "type")]
    rel_type: String,
    confidence: f64,
}

/// Parse an LLM extraction response into a validated payload
///
/// Expects a JSON object with optional `entities` and `relationships`
/// arrays (absent arrays are treated as empty; a non-object envelope or
/// non-array field is an error).
pub fn parse_extraction(response: &str) -> Result<ExtractionPayload, IngestError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| IngestError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| IngestError::InvalidFormat("Expected JSON object".to_string()))?;

    let entities = entries(obj.get("entities"), "entities")?;
    let relationships = entries(obj.get("relationships"), "relationships")?;

    let mut payload = ExtractionPayload::default();

    for (idx, value) in entities.iter().enumerate() {
        match serde_json::from_value::<EntityEntry>((*value).clone()) {
            Ok(entry) if entry.name.trim().is_empty() => {
                warn!(index = idx, "skipping entity with empty name");
            }
            Ok(entry) => payload.entities.push(ExtractedEntity {
                name: entry.name.trim().to_string(),
                entity_type: entry.entity_type,
                role: entry.role,
                confidence: entry.confidence.clamp(0.0, 1.0),
            }),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping malformed entity entry");
            }
        }
    }

    for (idx, value) in relationships.iter().enumerate() {
        match serde_json::from_value::<RelationshipEntry>((*value).clone()) {
            Ok(entry)
                if entry.source_entity.trim().is_empty()
                    || entry.target_entity.trim().is_empty()
                    || entry.rel_type.trim().is_empty() =>
            {
                warn!(index = idx, "skipping relationship with empty field");
            }
            Ok(entry) => payload.relationships.push(ExtractedRelationship {
                source_entity: entry.source_entity.trim().to_string(),
                target_entity: entry.target_entity.trim().to_string(),
                rel_type: entry.rel_type.trim().to_string(),
                confidence: entry.confidence.clamp(0.0, 1.0),
            }),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping malformed relationship entry");
            }
        }
    }

    Ok(payload)
}

fn entries<'a>(field: Option<&'a Value>, name: &str) -> Result<Vec<&'a Value>, IngestError> {
    match field {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(_) => Err(IngestError::InvalidFormat(format!("'{}' is not an array", name))),
    }
}

/// Extract JSON from a response, handling markdown code blocks
///
/// LLMs sometimes wrap JSON in ```json fences despite instructions.
fn extract_json(response: &str) -> Result<String, IngestError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(IngestError::InvalidFormat("Empty code block".to_string()));
        }
        // Skip the opening fence and the closing one
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}
