//! On-disk cache of embedded page resources.
//!
//! One file per resource id under the cache root. A file at the canonical path
//! is always complete: downloads are staged next to it and renamed into place.
//! Concurrent requests for the same id share a per-key mutex so only one of
//! them downloads; requests for different ids proceed independently.

mod locks;

pub use locks::KeyedLocks;

use onesync_core::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::source::ContentSource;

pub struct ResourceCache {
    root: PathBuf,
    source: Arc<dyn ContentSource>,
    locks: KeyedLocks,
}

impl ResourceCache {
    pub fn new(root: impl Into<PathBuf>, source: Arc<dyn ContentSource>) -> Self {
        Self { root: root.into(), source, locks: KeyedLocks::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cached file for `resource_id`, downloading it on a miss.
    pub async fn get_or_fetch(&self, resource_id: &str) -> Result<PathBuf, Error> {
        validate_id(resource_id)?;
        let path = self.root.join(resource_id);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(resource_id, "resource cache hit");
            return Ok(path);
        }

        let lock = self.locks.lock_for(resource_id);
        let _guard = lock.lock().await;

        // another caller may have finished the download while we waited
        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(resource_id, "resource cache hit after wait");
            return Ok(path);
        }

        tokio::fs::create_dir_all(&self.root).await?;
        let bytes = self.source.resource(resource_id).await?;

        let staging = self.root.join(staging_name(resource_id));
        if let Err(e) = write_then_rename(&staging, &path, &bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                tracing::debug!(resource_id, error = %cleanup, "staging file cleanup failed");
            }
            return Err(e);
        }

        tracing::info!(resource_id, bytes = bytes.len(), "resource cached");
        Ok(path)
    }
}

async fn write_then_rename(staging: &Path, path: &Path, bytes: &[u8]) -> Result<(), Error> {
    tokio::fs::write(staging, bytes).await?;
    tokio::fs::rename(staging, path).await?;
    Ok(())
}

fn staging_name(resource_id: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or_default();
    format!("{resource_id}.tmp-{}-{nanos}", std::process::id())
}

/// Resource ids become file names; anything that could escape the root is refused.
fn validate_id(resource_id: &str) -> Result<(), Error> {
    if resource_id.is_empty()
        || resource_id.starts_with('.')
        || resource_id.contains('/')
        || resource_id.contains('\\')
        || resource_id.contains('\0')
    {
        return Err(Error::InvalidInput(format!("invalid resource id: {resource_id:?}")));
    }
    Ok(())
}
