use async_trait::async_trait;

use crate::contract::model::Profile;

/// Output port: durable photo storage. Accepts raw bytes keyed by
/// (identity, sequence) and returns the URL the photo is served from.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn put(&self, identity: &str, seq: u32, bytes: Vec<u8>) -> anyhow::Result<String>;
}

/// Input port: the full profile set enumerated at queue-build time.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn all_profiles(&self) -> anyhow::Result<Vec<Profile>>;
}
