//! Chronicle Gate
//!
//! The decision layer between evidence and the public feed:
//!
//! - **PublicationGate** turns an event's evidence trust profile and
//!   artifact completeness into a status transition, executed through the
//!   store's transactional scoring operation
//! - **RelationshipGate** applies the per-type risk policy to extracted
//!   entity-relationship claims before they reach the public graph
//!
//! Both gates are idempotent: re-running them on unchanged inputs writes
//! no new audit rows.
//!
//! # Examples
//!
//! ```no_run
//! use chronicle_gate::{GateConfig, PublicationGate};
//!
//! let gate = PublicationGate::new(GateConfig::default());
//! // let outcome = gate.score_event(&mut store, event_id)?;
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod publication;
mod relationship;

pub use config::GateConfig;
pub use error::GateError;
pub use publication::PublicationGate;
pub use relationship::{
    ExtractedEntity, ExtractedRelationship, ExtractionOutcome, RelationshipGate, SkippedClaim,
};
