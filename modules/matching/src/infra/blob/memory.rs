use async_trait::async_trait;
use dashmap::DashMap;
use url::Url;

use crate::domain::ports::BlobStorage;

/// Keeps photo bytes in memory; for tests and single-process demos.
pub struct InMemoryBlobStorage {
    base: Url,
    blobs: DashMap<(String, u32), Vec<u8>>,
}

impl InMemoryBlobStorage {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            base: super::parse_base(base_url)?,
            blobs: DashMap::new(),
        })
    }

    pub fn get(&self, identity: &str, seq: u32) -> Option<Vec<u8>> {
        self.blobs
            .get(&(identity.to_string(), seq))
            .map(|b| b.value().clone())
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn put(&self, identity: &str, seq: u32, bytes: Vec<u8>) -> anyhow::Result<String> {
        let url = super::photo_url(&self.base, identity, seq)?;
        self.blobs.insert((identity.to_string(), seq), bytes);
        Ok(url)
    }
}
