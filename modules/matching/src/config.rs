use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::profile_store::ProfileRules;
use crate::domain::queue::{order_by_name, CandidateOrder};
use crate::domain::service::ServiceConfig;

/// `modules.matching` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct MatchingConfig {
    pub min_photos: usize,
    pub max_photos: usize,
    /// Directory for uploaded photos; photos stay in memory when unset.
    pub blob_dir: Option<String>,
    /// Base URL under which stored photos are served.
    pub blob_public_base_url: String,
    /// `source` or `boosted_first`.
    pub candidate_order: String,
    pub max_sessions: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_photos: 2,
            max_photos: 9,
            blob_dir: None,
            blob_public_base_url: "http://127.0.0.1:8087/blobs".to_string(),
            candidate_order: "source".to_string(),
            max_sessions: 10_000,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_photos > self.max_photos {
            anyhow::bail!(
                "min_photos ({}) must not exceed max_photos ({})",
                self.min_photos,
                self.max_photos
            );
        }
        if self.max_sessions == 0 {
            anyhow::bail!("max_sessions must be positive");
        }
        if order_by_name(&self.candidate_order).is_none() {
            anyhow::bail!("unknown candidate_order '{}'", self.candidate_order);
        }
        Ok(())
    }

    pub fn order(&self) -> anyhow::Result<Arc<dyn CandidateOrder>> {
        order_by_name(&self.candidate_order)
            .ok_or_else(|| anyhow::anyhow!("unknown candidate_order '{}'", self.candidate_order))
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            rules: ProfileRules {
                min_photos: self.min_photos,
                max_photos: self.max_photos,
            },
            max_sessions: self.max_sessions,
        }
    }
}
