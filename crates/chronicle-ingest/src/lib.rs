//! Chronicle Ingest
//!
//! The input edge of the trust pipeline. Two kinds of input arrive here:
//!
//! - raw feed items from the per-source fetchers, which are
//!   canonicalized into EvidenceSource/EvidenceSnapshot rows and run
//!   through fingerprint dedup
//! - LLM extraction payloads, which are schema-validated before their
//!   entities and relationship claims reach the safety gate
//!
//! This crate never calls an LLM itself; it only consumes output. Every
//! stage is idempotent under at-least-once redelivery except dedup,
//! which resolves its one correctness-critical race inside the store.

#![warn(missing_docs)]

mod config;
mod error;
mod ingestor;
mod parser;
mod types;

pub use config::IngestConfig;
pub use error::IngestError;
pub use ingestor::Ingestor;
pub use parser::parse_extraction;
pub use types::{ExtractionPayload, IngestItem, IngestOutcome};
