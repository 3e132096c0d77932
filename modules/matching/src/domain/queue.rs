//! Candidate queue: who `requester` may swipe on next.

use std::collections::HashSet;
use std::sync::Arc;

use crate::contract::model::{Identity, Profile};
use crate::domain::profile_store::ProfileRules;

/// Orders the eligible candidates. Implementations must be deterministic.
pub trait CandidateOrder: Send + Sync {
    fn name(&self) -> &'static str;
    fn order(&self, candidates: Vec<Profile>) -> Vec<Profile>;
}

/// Keeps the candidate source order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceOrder;

impl CandidateOrder for SourceOrder {
    fn name(&self) -> &'static str {
        "source"
    }

    fn order(&self, candidates: Vec<Profile>) -> Vec<Profile> {
        candidates
    }
}

/// Boosted profiles first; source order within each group.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoostedFirst;

impl CandidateOrder for BoostedFirst {
    fn name(&self) -> &'static str {
        "boosted_first"
    }

    fn order(&self, candidates: Vec<Profile>) -> Vec<Profile> {
        let (mut boosted, rest): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|p| p.is_boosted);
        boosted.extend(rest);
        boosted
    }
}

/// Resolve an ordering strategy by its config name.
pub fn order_by_name(name: &str) -> Option<Arc<dyn CandidateOrder>> {
    match name {
        "source" => Some(Arc::new(SourceOrder)),
        "boosted_first" => Some(Arc::new(BoostedFirst)),
        _ => None,
    }
}

#[derive(Clone)]
pub struct QueueBuilder {
    rules: ProfileRules,
    order: Arc<dyn CandidateOrder>,
}

impl QueueBuilder {
    pub fn new(rules: ProfileRules, order: Arc<dyn CandidateOrder>) -> Self {
        Self { rules, order }
    }

    /// Drops the requester, already-decided targets and incomplete profiles,
    /// then applies the ordering strategy. Empty means "caught up".
    pub fn build(
        &self,
        requester: &str,
        all_profiles: Vec<Profile>,
        decided: &HashSet<Identity>,
    ) -> Vec<Profile> {
        let eligible = all_profiles
            .into_iter()
            .filter(|p| p.identity != requester)
            .filter(|p| !decided.contains(&p.identity))
            .filter(|p| self.rules.is_complete(p))
            .collect();
        self.order.order(eligible)
    }
}
