//! Blob storage adapters. Both build URLs as `{base}/{identity}/{seq}`.

pub mod local_fs;
pub mod memory;

pub use local_fs::LocalFsBlobStorage;
pub use memory::InMemoryBlobStorage;

use anyhow::Context;
use url::Url;

/// File/segment name for one photo.
pub(crate) fn object_name(seq: u32) -> String {
    format!("{seq:04}")
}

/// `{base}/{identity}/{seq}` with the identity percent-encoded as one segment.
pub(crate) fn photo_url(base: &Url, identity: &str, seq: u32) -> anyhow::Result<String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("blob base URL '{base}' cannot carry a path"))?
        .pop_if_empty()
        .push(identity)
        .push(&object_name(seq));
    Ok(url.to_string())
}

pub(crate) fn parse_base(base: &str) -> anyhow::Result<Url> {
    Url::parse(base).with_context(|| format!("invalid blob base URL '{base}'"))
}
