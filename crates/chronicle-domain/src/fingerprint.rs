//! Event fingerprinting for near-duplicate collapse
//!
//! The fingerprint is a pure function of normalized title, calendar day,
//! and source type. Day granularity is intentional: two stories about the
//! same topic from the same source type on the same day collide by design.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic dedup key for an Event
///
/// First 32 hex characters of the SHA-256 of
/// `"{SOURCE_TYPE}:{YYYY-MM-DD}:{normalized_title}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The 32-character hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a value read back from storage
    pub fn from_stored(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a title for fingerprinting
///
/// Lower-cases (Unicode-aware), collapses internal whitespace runs to a
/// single space, and trims. This is the whole contract: the same visible
/// headline always yields the same normalized form.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compute the fingerprint for a (title, occurred_at, source_type) triple
///
/// Time-of-day is discarded: `occurred_at` contributes only its UTC
/// calendar date.
pub fn fingerprint(title: &str, occurred_at: DateTime<Utc>, source_type: &str) -> Fingerprint {
    let day = occurred_at.date_naive().format("%Y-%m-%d");
    let input = format!("{}:{}:{}", source_type, day, normalize_title(title));

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Fingerprint(digest[..32].to_string())
}
