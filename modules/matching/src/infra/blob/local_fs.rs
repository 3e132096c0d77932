use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use url::Url;

use crate::domain::ports::BlobStorage;

/// Writes photos under `{root}/{identity}/{seq}`; the files are expected to
/// be served from `base_url` by a static host. The directory is the decoded
/// form of the URL's identity segment, so the host resolves each URL to the
/// file written for it.
pub struct LocalFsBlobStorage {
    root: PathBuf,
    base: Url,
}

impl LocalFsBlobStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            root: root.into(),
            base: super::parse_base(base_url)?,
        })
    }

    fn path_for(&self, identity: &str, seq: u32) -> anyhow::Result<PathBuf> {
        let one_component = !identity.is_empty()
            && !identity.chars().all(|c| c == '.')
            && !identity.contains(['/', '\\', '\0']);
        if !one_component {
            anyhow::bail!("identity '{identity}' cannot name a blob directory");
        }
        Ok(self.root.join(identity).join(super::object_name(seq)))
    }
}

#[async_trait]
impl BlobStorage for LocalFsBlobStorage {
    async fn put(&self, identity: &str, seq: u32, bytes: Vec<u8>) -> anyhow::Result<String> {
        let path = self.path_for(identity, seq)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "photo stored");
        super::photo_url(&self.base, identity, seq)
    }
}
