//! Error types for the ingest edge

use chronicle_domain::CanonicalizeError;
use thiserror::Error;

/// Errors that can occur during ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// Item URL failed canonicalization
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] CanonicalizeError),

    /// Store error; transient failures propagate to the queue for
    /// redelivery
    #[error("Store error: {0}")]
    Store(String),

    /// Extraction payload violated the expected schema
    #[error("Invalid extraction format: {0}")]
    InvalidFormat(String),

    /// Item content exceeds the configured maximum
    #[error("Text too long: {0} bytes (max: {1})")]
    TextTooLong(usize, usize),

    /// Item is missing a required field
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}
