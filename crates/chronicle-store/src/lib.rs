//! Chronicle Storage Layer
//!
//! Implements the domain's `EvidenceStore` and `EventStore` traits on
//! SQLite. This crate owns the two storage-level guarantees the pipeline
//! relies on:
//!
//! - the uniqueness constraint on `events.fingerprint`, with the dedup
//!   operation retrying as a link when it loses a creation race
//! - read-decide-write inside a single transaction for every status
//!   mutation, with a fresh re-read of the current status immediately
//!   before the write
//!
//! # Thread Safety
//!
//! SQLite connections are not thread-safe. Each worker should have its
//! own `SqliteStore` instance; the fingerprint constraint serializes the
//! only racy operation across connections.

#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use chronicle_domain::traits::{DedupOutcome, EvidenceStore, EventStore, ScoreOutcome};
use chronicle_domain::{
    should_transition, ArtifactType, ConfidenceLevel, Entity, EntityId, Event, EventArtifact,
    EventId, EventStatus, EventStatusChange, EvidenceRole, EvidenceSnapshot, EvidenceSource,
    Fingerprint, Relationship, RelationshipId, RelationshipStatus, RelationshipType, SnapshotId,
    SourceId, TrustTier,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error (includes transient storage failures, which the
    /// caller propagates to the queue for redelivery)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced row absent; treat as already-deleted and skip
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness race surfaced to a caller that cannot resolve it
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored value failed to map back to a domain type
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of the pipeline stores
pub struct SqliteStore {
    conn: Connection,
    /// Runs between the fingerprint lookup and the event insert; lets
    /// tests interleave a competing writer at the race window.
    #[cfg(test)]
    before_event_insert: Option<Box<dyn FnMut(&Connection)>>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn,
            #[cfg(test)]
            before_event_insert: None,
        })
    }

    fn event_exists(&self, id: EventId) -> Result<bool, StoreError> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM events WHERE id = ?1",
                params![id_bytes(id.value())],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    /// One create-or-link round; a fingerprint uniqueness violation from
    /// the INSERT escapes to the caller for the retry-as-link pass
    fn create_or_link_once(
        &mut self,
        fp: &Fingerprint,
        occurred_at: DateTime<Utc>,
        snapshot_id: SnapshotId,
        changed_by: &str,
    ) -> Result<DedupOutcome, StoreError> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        let existing: Option<Vec<u8>> = tx
            .query_row(
                "SELECT id FROM events WHERE fingerprint = ?1",
                params![fp.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            None => {
                #[cfg(test)]
                if let Some(hook) = self.before_event_insert.as_mut() {
                    hook(&tx);
                }

                let event_id = EventId::new();
                tx.execute(
                    "INSERT INTO events (id, fingerprint, status, confidence, source_count, occurred_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
                    params![
                        id_bytes(event_id.value()),
                        fp.as_str(),
                        EventStatus::Raw.as_str(),
                        ConfidenceLevel::Low.as_str(),
                        to_millis(occurred_at),
                        to_millis(now),
                    ],
                )?;
                tx.execute(
                    "INSERT INTO event_evidence (event_id, snapshot_id, role, linked_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        id_bytes(event_id.value()),
                        id_bytes(snapshot_id.value()),
                        EvidenceRole::Primary.as_str(),
                        to_millis(now),
                    ],
                )?;
                tx.execute(
                    "INSERT INTO event_status_changes (event_id, from_status, to_status, reason, changed_by, changed_at)
                     VALUES (?1, NULL, ?2, ?3, ?4, ?5)",
                    params![
                        id_bytes(event_id.value()),
                        EventStatus::Raw.as_str(),
                        "Initial creation",
                        changed_by,
                        to_millis(now),
                    ],
                )?;
                DedupOutcome { event_id, created: true }
            }
            Some(bytes) => {
                let event_id = EventId::from_value(id_from_bytes(&bytes)?);
                // Re-linking the same snapshot is a no-op
                tx.execute(
                    "INSERT OR IGNORE INTO event_evidence (event_id, snapshot_id, role, linked_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        id_bytes(event_id.value()),
                        id_bytes(snapshot_id.value()),
                        EvidenceRole::Supporting.as_str(),
                        to_millis(now),
                    ],
                )?;
                // Keep the cached count equal to the evidence row count
                tx.execute(
                    "UPDATE events
                     SET source_count = (SELECT COUNT(*) FROM event_evidence WHERE event_id = ?1)
                     WHERE id = ?1",
                    params![id_bytes(event_id.value())],
                )?;
                DedupOutcome { event_id, created: false }
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn map_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Vec<u8>, String, String, String, u32, i64, i64)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn event_from_parts(
        parts: (Vec<u8>, String, String, String, u32, i64, i64),
    ) -> Result<Event, StoreError> {
        let (id, fingerprint, status, confidence, source_count, occurred_at, created_at) = parts;
        Ok(Event {
            id: EventId::from_value(id_from_bytes(&id)?),
            fingerprint: Fingerprint::from_stored(fingerprint),
            status: EventStatus::parse(&status)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown event status: {}", status)))?,
            confidence: ConfidenceLevel::parse(&confidence).ok_or_else(|| {
                StoreError::InvalidData(format!("Unknown confidence level: {}", confidence))
            })?,
            source_count,
            occurred_at: from_millis(occurred_at)?,
            created_at: from_millis(created_at)?,
        })
    }
}

impl EvidenceStore for SqliteStore {
    type Error = StoreError;

    fn upsert_source(
        &mut self,
        canonical_url: &str,
        domain: &str,
        tier: TrustTier,
    ) -> Result<EvidenceSource, Self::Error> {
        // Atomic upsert keyed on canonical_url: a concurrent first-seen
        // writer wins and this call reads its row back. The tier is never
        // rewritten for an existing source.
        self.conn.execute(
            "INSERT INTO sources (id, canonical_url, domain, trust_tier, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(canonical_url) DO NOTHING",
            params![
                id_bytes(SourceId::new().value()),
                canonical_url,
                domain,
                tier.as_str(),
                to_millis(Utc::now()),
            ],
        )?;

        let (id, domain, tier_str, created_at): (Vec<u8>, String, String, i64) = self.conn.query_row(
            "SELECT id, domain, trust_tier, created_at FROM sources WHERE canonical_url = ?1",
            params![canonical_url],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(EvidenceSource {
            id: SourceId::from_value(id_from_bytes(&id)?),
            canonical_url: canonical_url.to_string(),
            domain,
            trust_tier: TrustTier::parse(&tier_str)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown trust tier: {}", tier_str)))?,
            created_at: from_millis(created_at)?,
        })
    }

    fn insert_snapshot(&mut self, snapshot: EvidenceSnapshot) -> Result<SnapshotId, Self::Error> {
        self.conn.execute(
            "INSERT INTO snapshots (id, source_id, content_hash, title, full_text, published_at, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id_bytes(snapshot.id.value()),
                id_bytes(snapshot.source_id.value()),
                &snapshot.content_hash,
                &snapshot.title,
                &snapshot.full_text,
                snapshot.published_at.map(to_millis),
                to_millis(snapshot.fetched_at),
            ],
        )?;
        Ok(snapshot.id)
    }

    fn create_or_link_event(
        &mut self,
        fingerprint: &Fingerprint,
        occurred_at: DateTime<Utc>,
        snapshot_id: SnapshotId,
        changed_by: &str,
    ) -> Result<DedupOutcome, Self::Error> {
        match self.create_or_link_once(fingerprint, occurred_at, snapshot_id, changed_by) {
            Err(StoreError::Database(ref e)) if is_unique_violation(e) => {
                // Lost the creation race: the event exists now, so the
                // second pass takes the link branch.
                match self.create_or_link_once(fingerprint, occurred_at, snapshot_id, changed_by) {
                    Err(StoreError::Database(ref e)) if is_unique_violation(e) => {
                        Err(StoreError::Conflict(format!(
                            "Fingerprint {} contested on both dedup passes",
                            fingerprint
                        )))
                    }
                    other => other,
                }
            }
            other => other,
        }
    }
}

impl EventStore for SqliteStore {
    type Error = StoreError;

    fn get_event(&self, id: EventId) -> Result<Option<Event>, Self::Error> {
        let parts = self
            .conn
            .query_row(
                "SELECT id, fingerprint, status, confidence, source_count, occurred_at, created_at
                 FROM events WHERE id = ?1",
                params![id_bytes(id.value())],
                Self::map_event,
            )
            .optional()?;

        parts.map(Self::event_from_parts).transpose()
    }

    fn trust_profile(&self, id: EventId) -> Result<chronicle_domain::EvidenceTrustProfile, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT s.trust_tier
             FROM event_evidence ee
             JOIN snapshots sn ON ee.snapshot_id = sn.id
             JOIN sources s ON sn.source_id = s.id
             WHERE ee.event_id = ?1",
        )?;

        let tiers = stmt
            .query_map(params![id_bytes(id.value())], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|t| {
                TrustTier::parse(&t)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown trust tier: {}", t)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(chronicle_domain::EvidenceTrustProfile::new(tiers))
    }

    fn artifact_types(&self, id: EventId) -> Result<Vec<ArtifactType>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT artifact_type FROM event_artifacts WHERE event_id = ?1")?;

        let types = stmt
            .query_map(params![id_bytes(id.value())], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|t| {
                ArtifactType::parse(&t)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown artifact type: {}", t)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(types)
    }

    fn get_artifact(
        &self,
        event_id: EventId,
        artifact_type: ArtifactType,
    ) -> Result<Option<EventArtifact>, Self::Error> {
        let parts = self
            .conn
            .query_row(
                "SELECT version, body, generated_at FROM event_artifacts
                 WHERE event_id = ?1 AND artifact_type = ?2",
                params![id_bytes(event_id.value()), artifact_type.as_str()],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        parts
            .map(|(version, body, generated_at)| {
                Ok(EventArtifact {
                    event_id,
                    artifact_type,
                    version,
                    body,
                    generated_at: from_millis(generated_at)?,
                })
            })
            .transpose()
    }

    fn put_artifact(
        &mut self,
        event_id: EventId,
        artifact_type: ArtifactType,
        body: &str,
    ) -> Result<u32, Self::Error> {
        if !self.event_exists(event_id)? {
            return Err(StoreError::NotFound(format!("Event {}", event_id)));
        }

        self.conn.execute(
            "INSERT INTO event_artifacts (event_id, artifact_type, version, body, generated_at)
             VALUES (?1, ?2, 1, ?3, ?4)
             ON CONFLICT(event_id, artifact_type) DO UPDATE SET
             version = version + 1, body = excluded.body, generated_at = excluded.generated_at",
            params![
                id_bytes(event_id.value()),
                artifact_type.as_str(),
                body,
                to_millis(Utc::now()),
            ],
        )?;

        let version: u32 = self.conn.query_row(
            "SELECT version FROM event_artifacts WHERE event_id = ?1 AND artifact_type = ?2",
            params![id_bytes(event_id.value()), artifact_type.as_str()],
            |row| row.get(0),
        )?;

        Ok(version)
    }

    fn apply_score(
        &mut self,
        event_id: EventId,
        confidence: ConfidenceLevel,
        effective_gate: EventStatus,
        reason: &str,
        changed_by: &str,
    ) -> Result<ScoreOutcome, Self::Error> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        // Fresh re-read of the mutable field immediately before the
        // write: a concurrent scorer may have moved the status since the
        // caller computed its decision.
        let current_str: Option<String> = tx
            .query_row(
                "SELECT status FROM events WHERE id = ?1",
                params![id_bytes(event_id.value())],
                |row| row.get(0),
            )
            .optional()?;

        let current = match current_str {
            Some(s) => EventStatus::parse(&s)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown event status: {}", s)))?,
            None => return Err(StoreError::NotFound(format!("Event {}", event_id))),
        };

        let source_count: u32 = tx.query_row(
            "SELECT COUNT(*) FROM event_evidence WHERE event_id = ?1",
            params![id_bytes(event_id.value())],
            |row| row.get(0),
        )?;

        // Cached fields refresh unconditionally; scoring is idempotent
        tx.execute(
            "UPDATE events SET confidence = ?2, source_count = ?3 WHERE id = ?1",
            params![id_bytes(event_id.value()), confidence.as_str(), source_count],
        )?;

        let to_status = if should_transition(current, effective_gate) {
            effective_gate
        } else {
            current
        };

        if to_status != current {
            tx.execute(
                "UPDATE events SET status = ?2 WHERE id = ?1",
                params![id_bytes(event_id.value()), to_status.as_str()],
            )?;
            tx.execute(
                "INSERT INTO event_status_changes (event_id, from_status, to_status, reason, changed_by, changed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id_bytes(event_id.value()),
                    current.as_str(),
                    to_status.as_str(),
                    reason,
                    changed_by,
                    to_millis(now),
                ],
            )?;
        }

        tx.commit()?;

        Ok(ScoreOutcome { event_id, confidence, source_count, from_status: current, to_status })
    }

    fn status_history(&self, id: EventId) -> Result<Vec<EventStatusChange>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT from_status, to_status, reason, changed_by, changed_at
             FROM event_status_changes WHERE event_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map(params![id_bytes(id.value())], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(from, to, reason, changed_by, changed_at)| {
                Ok(EventStatusChange {
                    event_id: id,
                    from_status: from
                        .map(|s| {
                            EventStatus::parse(&s).ok_or_else(|| {
                                StoreError::InvalidData(format!("Unknown event status: {}", s))
                            })
                        })
                        .transpose()?,
                    to_status: EventStatus::parse(&to).ok_or_else(|| {
                        StoreError::InvalidData(format!("Unknown event status: {}", to))
                    })?,
                    reason,
                    changed_by,
                    changed_at: from_millis(changed_at)?,
                })
            })
            .collect()
    }

    fn upsert_entity(&mut self, name: &str, entity_type: &str) -> Result<Entity, Self::Error> {
        self.conn.execute(
            "INSERT INTO entities (id, name, entity_type, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO NOTHING",
            params![
                id_bytes(EntityId::new().value()),
                name,
                entity_type,
                to_millis(Utc::now()),
            ],
        )?;

        let (id, entity_type, created_at): (Vec<u8>, String, i64) = self.conn.query_row(
            "SELECT id, entity_type, created_at FROM entities WHERE name = ?1",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(Entity {
            id: EntityId::from_value(id_from_bytes(&id)?),
            name: name.to_string(),
            entity_type,
            created_at: from_millis(created_at)?,
        })
    }

    fn attach_entity(&mut self, event_id: EventId, entity_id: EntityId) -> Result<(), Self::Error> {
        if !self.event_exists(event_id)? {
            return Err(StoreError::NotFound(format!("Event {}", event_id)));
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO event_entities (event_id, entity_id) VALUES (?1, ?2)",
            params![id_bytes(event_id.value()), id_bytes(entity_id.value())],
        )?;
        Ok(())
    }

    fn event_entities(&self, id: EventId) -> Result<Vec<Entity>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.name, e.entity_type, e.created_at
             FROM event_entities ee
             JOIN entities e ON ee.entity_id = e.id
             WHERE ee.event_id = ?1",
        )?;

        let rows = stmt
            .query_map(params![id_bytes(id.value())], |row| {
                Ok((
                    row.get::<_, Vec<u8>>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, entity_type, created_at)| {
                Ok(Entity {
                    id: EntityId::from_value(id_from_bytes(&id)?),
                    name,
                    entity_type,
                    created_at: from_millis(created_at)?,
                })
            })
            .collect()
    }

    fn insert_relationship(&mut self, rel: Relationship) -> Result<RelationshipId, Self::Error> {
        self.conn.execute(
            "INSERT INTO relationships
             (id, source_entity_id, target_entity_id, rel_type, event_id, status, status_reason, model_confidence, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id_bytes(rel.id.value()),
                id_bytes(rel.source_entity_id.value()),
                id_bytes(rel.target_entity_id.value()),
                rel.rel_type.as_str(),
                id_bytes(rel.event_id.value()),
                rel.status.as_str(),
                &rel.status_reason,
                rel.model_confidence,
                to_millis(rel.created_at),
            ],
        )?;
        Ok(rel.id)
    }

    fn event_relationships(&self, id: EventId) -> Result<Vec<Relationship>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_entity_id, target_entity_id, rel_type, status, status_reason, model_confidence, created_at
             FROM relationships WHERE event_id = ?1",
        )?;

        let rows = stmt
            .query_map(params![id_bytes(id.value())], |row| {
                Ok((
                    row.get::<_, Vec<u8>>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, f64>(6)?,
                    row.get::<_, i64>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(rid, src, tgt, rel_type, status, reason, confidence, created_at)| {
                Ok(Relationship {
                    id: RelationshipId::from_value(id_from_bytes(&rid)?),
                    source_entity_id: EntityId::from_value(id_from_bytes(&src)?),
                    target_entity_id: EntityId::from_value(id_from_bytes(&tgt)?),
                    rel_type: RelationshipType::parse(&rel_type),
                    event_id: id,
                    status: RelationshipStatus::parse(&status).ok_or_else(|| {
                        StoreError::InvalidData(format!("Unknown relationship status: {}", status))
                    })?,
                    status_reason: reason,
                    model_confidence: confidence,
                    created_at: from_millis(created_at)?,
                })
            })
            .collect()
    }

    fn get_source(&self, id: SourceId) -> Result<Option<EvidenceSource>, Self::Error> {
        let parts = self
            .conn
            .query_row(
                "SELECT canonical_url, domain, trust_tier, created_at FROM sources WHERE id = ?1",
                params![id_bytes(id.value())],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        parts
            .map(|(canonical_url, domain, tier, created_at)| {
                Ok(EvidenceSource {
                    id,
                    canonical_url,
                    domain,
                    trust_tier: TrustTier::parse(&tier).ok_or_else(|| {
                        StoreError::InvalidData(format!("Unknown trust tier: {}", tier))
                    })?,
                    created_at: from_millis(created_at)?,
                })
            })
            .transpose()
    }
}

fn id_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn id_from_bytes(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for id, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

fn to_millis(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::InvalidData(format!("Timestamp out of range: {}", ms)))
}

// Only a UNIQUE failure means another writer won the creation race; FK
// and CHECK violations are real errors and must not trigger a retry.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::fingerprint;
    use std::cell::Cell;
    use std::rc::Rc;

    fn seeded_snapshot(store: &mut SqliteStore) -> (SnapshotId, DateTime<Utc>, Fingerprint) {
        let source = store
            .upsert_source("https://a.example.com/1", "a.example.com", TrustTier::Standard)
            .unwrap();
        let id = SnapshotId::new();
        store
            .insert_snapshot(EvidenceSnapshot {
                id,
                source_id: source.id,
                content_hash: "0".repeat(64),
                title: "Contested story".to_string(),
                full_text: "Contested story text".to_string(),
                published_at: None,
                fetched_at: Utc::now(),
            })
            .unwrap();
        let occurred = Utc::now();
        (id, occurred, fingerprint("Contested story", occurred, "RSS"))
    }

    fn insert_competing_event(conn: &Connection, fp: &str) {
        conn.execute(
            "INSERT INTO events (id, fingerprint, status, confidence, source_count, occurred_at, created_at)
             VALUES (?1, ?2, 'raw', 'low', 1, 0, 0)",
            params![id_bytes(EventId::new().value()), fp],
        )
        .unwrap();
    }

    #[test]
    fn test_lost_creation_race_resolved_internally() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (snap, occurred, fp) = seeded_snapshot(&mut store);

        // A competing writer claims the fingerprint after our lookup
        // missed, but only on the first pass
        let passes = Rc::new(Cell::new(0u32));
        let seen = passes.clone();
        let fp_str = fp.as_str().to_string();
        store.before_event_insert = Some(Box::new(move |conn| {
            if seen.get() == 0 {
                insert_competing_event(conn, &fp_str);
            }
            seen.set(seen.get() + 1);
        }));

        let outcome = store
            .create_or_link_event(&fp, occurred, snap, "dedup")
            .unwrap();

        // The UNIQUE failure on pass one never surfaced; pass two resolved it
        assert_eq!(passes.get(), 2);
        let event = store.get_event(outcome.event_id).unwrap().unwrap();
        assert_eq!(event.source_count, 1);
        assert_eq!(store.trust_profile(outcome.event_id).unwrap().source_count, 1);
    }

    #[test]
    fn test_fingerprint_contested_on_both_passes_is_conflict() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let (snap, occurred, fp) = seeded_snapshot(&mut store);

        let fp_str = fp.as_str().to_string();
        store.before_event_insert = Some(Box::new(move |conn| {
            insert_competing_event(conn, &fp_str);
        }));

        let result = store.create_or_link_event(&fp, occurred, snap, "dedup");
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn test_unique_violation_detection() {
        let unique = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            None,
        );
        assert!(is_unique_violation(&unique));

        let foreign_key = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            None,
        );
        assert!(!is_unique_violation(&foreign_key));

        let check = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_CHECK),
            None,
        );
        assert!(!is_unique_violation(&check));
    }

    #[test]
    fn test_id_bytes_round_trip() {
        let value = EventId::new().value();
        assert_eq!(id_from_bytes(&id_bytes(value)).unwrap(), value);
    }

    #[test]
    fn test_id_from_bytes_wrong_length() {
        assert!(id_from_bytes(&[0u8; 8]).is_err());
        assert!(id_from_bytes(&[]).is_err());
    }

    #[test]
    fn test_millis_round_trip() {
        let now = Utc::now();
        let back = from_millis(to_millis(now)).unwrap();
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }
}
