//! Swipe ledger: one immutable decision per (actor, target).
//!
//! Matches are never stored. `A` and `B` match iff both `A→B like` and
//! `B→A like` are in the ledger; every read recomputes that from records.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::contract::model::{Direction, Gesture, Identity, SwipeOutcome, SwipeRecord};
use crate::domain::error::DomainError;
use crate::domain::repo::SwipeRepository;

#[derive(Clone)]
pub struct Ledger {
    repo: Arc<dyn SwipeRepository>,
}

fn storage(e: anyhow::Error) -> DomainError {
    DomainError::storage(e.to_string())
}

impl Ledger {
    pub fn new(repo: Arc<dyn SwipeRepository>) -> Self {
        Self { repo }
    }

    /// Append a decision, or return the stored one for a repeated pair.
    pub async fn record_swipe(
        &self,
        actor: &str,
        target: &str,
        gesture: Gesture,
    ) -> Result<SwipeOutcome, DomainError> {
        if target.is_empty() {
            return Err(DomainError::invalid_operation("swipe target is empty"));
        }
        if actor == target {
            return Err(DomainError::invalid_operation("cannot swipe on yourself"));
        }
        let Some(direction) = gesture.direction() else {
            return Err(DomainError::invalid_operation(format!(
                "{gesture:?} is not a swipe decision"
            )));
        };

        let record = self
            .repo
            .append_if_absent(SwipeRecord {
                actor: actor.to_string(),
                target: target.to_string(),
                direction,
                at: Utc::now(),
            })
            .await
            .map_err(storage)?;

        let matched = record.direction == Direction::Like && self.liked(target, actor).await?;
        Ok(SwipeOutcome { record, matched })
    }

    pub async fn has_decided(&self, actor: &str, target: &str) -> Result<bool, DomainError> {
        Ok(self.repo.find(actor, target).await.map_err(storage)?.is_some())
    }

    pub async fn decided_targets(&self, actor: &str) -> Result<HashSet<Identity>, DomainError> {
        let records = self.repo.by_actor(actor).await.map_err(storage)?;
        Ok(records.into_iter().map(|r| r.target).collect())
    }

    /// Actors whose like targets `identity`, minus those `identity` liked back.
    /// Append order.
    pub async fn likes_received_by(&self, identity: &str) -> Result<Vec<Identity>, DomainError> {
        let liked_back = self.liked_by(identity).await?;
        let incoming = self.repo.by_target(identity).await.map_err(storage)?;
        Ok(incoming
            .into_iter()
            .filter(|r| r.direction == Direction::Like && !liked_back.contains(&r.actor))
            .map(|r| r.actor)
            .collect())
    }

    /// Identities mutually liked with `identity`, in the order `identity` liked them.
    pub async fn matches_of(&self, identity: &str) -> Result<Vec<Identity>, DomainError> {
        let likers: HashSet<Identity> = self
            .repo
            .by_target(identity)
            .await
            .map_err(storage)?
            .into_iter()
            .filter(|r| r.direction == Direction::Like)
            .map(|r| r.actor)
            .collect();
        let outgoing = self.repo.by_actor(identity).await.map_err(storage)?;
        Ok(outgoing
            .into_iter()
            .filter(|r| r.direction == Direction::Like && likers.contains(&r.target))
            .map(|r| r.target)
            .collect())
    }

    pub async fn is_match(&self, a: &str, b: &str) -> Result<bool, DomainError> {
        Ok(a != b && self.liked(a, b).await? && self.liked(b, a).await?)
    }

    async fn liked(&self, actor: &str, target: &str) -> Result<bool, DomainError> {
        Ok(self
            .repo
            .find(actor, target)
            .await
            .map_err(storage)?
            .is_some_and(|r| r.direction == Direction::Like))
    }

    async fn liked_by(&self, actor: &str) -> Result<HashSet<Identity>, DomainError> {
        Ok(self
            .repo
            .by_actor(actor)
            .await
            .map_err(storage)?
            .into_iter()
            .filter(|r| r.direction == Direction::Like)
            .map(|r| r.target)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::memory::InMemorySwipeRepository;

    fn ledger() -> (Ledger, Arc<InMemorySwipeRepository>) {
        let repo = Arc::new(InMemorySwipeRepository::new());
        (Ledger::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn self_swipe_is_rejected_before_append() {
        let (ledger, repo) = ledger();
        let err = ledger.record_swipe("a", "a", Gesture::Like).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation { .. }));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn non_scoring_gesture_is_rejected() {
        let (ledger, repo) = ledger();
        for g in [Gesture::Up, Gesture::Down] {
            let err = ledger.record_swipe("a", "b", g).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidOperation { .. }));
        }
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn repeated_swipe_is_idempotent() {
        let (ledger, repo) = ledger();
        let first = ledger.record_swipe("a", "b", Gesture::Like).await.unwrap();
        let second = ledger.record_swipe("a", "b", Gesture::Like).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.len(), 1);

        // A different direction does not overwrite the first decision.
        let third = ledger.record_swipe("a", "b", Gesture::Pass).await.unwrap();
        assert_eq!(third.record, first.record);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn reverse_like_reports_match_in_either_order() {
        let (forward, _) = ledger();
        let first = forward.record_swipe("a", "b", Gesture::Like).await.unwrap();
        assert!(!first.matched);
        let second = forward.record_swipe("b", "a", Gesture::Like).await.unwrap();
        assert!(second.matched);
        assert!(forward.is_match("a", "b").await.unwrap());

        let (reversed, _) = ledger();
        reversed.record_swipe("b", "a", Gesture::Like).await.unwrap();
        let out = reversed.record_swipe("a", "b", Gesture::Like).await.unwrap();
        assert!(out.matched);
        assert!(reversed.is_match("b", "a").await.unwrap());
    }

    #[tokio::test]
    async fn pass_never_matches() {
        let (ledger, _) = ledger();
        ledger.record_swipe("a", "b", Gesture::Like).await.unwrap();
        let out = ledger.record_swipe("b", "a", Gesture::Pass).await.unwrap();
        assert!(!out.matched);
        assert!(!ledger.is_match("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn likes_received_excludes_mutual_matches() {
        let (ledger, _) = ledger();
        ledger.record_swipe("a", "b", Gesture::Like).await.unwrap();
        ledger.record_swipe("b", "a", Gesture::Like).await.unwrap();
        ledger.record_swipe("c", "a", Gesture::Like).await.unwrap();
        ledger.record_swipe("d", "a", Gesture::Pass).await.unwrap();

        assert_eq!(ledger.likes_received_by("a").await.unwrap(), vec!["c"]);
        assert!(ledger.likes_received_by("b").await.unwrap().is_empty());
        assert_eq!(ledger.matches_of("a").await.unwrap(), vec!["b"]);
        assert_eq!(ledger.matches_of("b").await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn decided_targets_cover_likes_and_passes() {
        let (ledger, _) = ledger();
        ledger.record_swipe("a", "b", Gesture::Like).await.unwrap();
        ledger.record_swipe("a", "c", Gesture::Pass).await.unwrap();

        let decided = ledger.decided_targets("a").await.unwrap();
        assert_eq!(decided.len(), 2);
        assert!(decided.contains("b") && decided.contains("c"));
        assert!(ledger.has_decided("a", "c").await.unwrap());
        assert!(!ledger.has_decided("c", "a").await.unwrap());
    }
}
