use async_trait::async_trait;

use crate::contract::model::{Profile, SwipeRecord};

/// Port for the domain layer: profile persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, identity: &str) -> anyhow::Result<Option<Profile>>;

    /// Insert or replace the whole record. First insert fixes the record's
    /// position in `list`.
    async fn upsert(&self, profile: Profile) -> anyhow::Result<()>;

    /// All profiles in first-insertion order.
    async fn list(&self) -> anyhow::Result<Vec<Profile>>;
}

/// Port for the append-only swipe ledger.
#[async_trait]
pub trait SwipeRepository: Send + Sync {
    /// Atomically append `record` unless one exists for (actor, target).
    /// Returns the stored record either way.
    async fn append_if_absent(&self, record: SwipeRecord) -> anyhow::Result<SwipeRecord>;

    async fn find(&self, actor: &str, target: &str) -> anyhow::Result<Option<SwipeRecord>>;

    /// Records by `actor`, in append order.
    async fn by_actor(&self, actor: &str) -> anyhow::Result<Vec<SwipeRecord>>;

    /// Records whose target is `target`, in append order.
    async fn by_target(&self, target: &str) -> anyhow::Result<Vec<SwipeRecord>>;
}

