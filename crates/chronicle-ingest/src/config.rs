//! Ingest configuration

/// Configuration for the ingest edge
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// `changed_by` recorded on audit rows written during dedup
    pub changed_by: String,

    /// Maximum accepted content length in bytes
    pub max_text_len: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            changed_by: "pipeline:ingest".to_string(),
            max_text_len: 512 * 1024,
        }
    }
}
