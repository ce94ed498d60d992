//! Gate configuration

use chronicle_domain::ScoringThresholds;

/// Configuration for both gates
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Corroboration thresholds for confidence scoring
    pub thresholds: ScoringThresholds,

    /// Corroborating sources needed to approve a high-risk relationship
    /// claim without an authoritative source
    pub min_corroboration: u32,

    /// `changed_by` recorded on audit rows written by the scorer
    pub scored_by: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            thresholds: ScoringThresholds::default(),
            min_corroboration: 2,
            scored_by: "pipeline:scorer".to_string(),
        }
    }
}

impl GateConfig {
    /// Tighter corroboration requirements for cautious deployments
    pub fn strict() -> Self {
        Self {
            thresholds: ScoringThresholds { high_source_count: 4, medium_source_count: 3 },
            min_corroboration: 3,
            ..Self::default()
        }
    }

    /// Looser requirements for development and backfill runs
    pub fn permissive() -> Self {
        Self {
            thresholds: ScoringThresholds { high_source_count: 2, medium_source_count: 1 },
            min_corroboration: 1,
            ..Self::default()
        }
    }
}
