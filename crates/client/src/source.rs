//! Stable seam between the sync pipeline and the remote content API.

use async_trait::async_trait;
use bytes::Bytes;
use onesync_core::{Error, Section};

use crate::graph::{PageQuery, RemotePage};

/// Read access to the remote notebook hierarchy.
///
/// The sync pipeline and the resource cache depend only on this trait, so the
/// HTTP client can be replaced by an in-memory source in tests.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All sections of a notebook, unfiltered.
    async fn sections(&self, notebook_id: &str) -> Result<Vec<Section>, Error>;

    /// One batch of page metadata for a section.
    async fn pages(&self, section_id: &str, query: &PageQuery) -> Result<Vec<RemotePage>, Error>;

    /// Raw HTML body of a page.
    async fn page_content(&self, page_id: &str) -> Result<String, Error>;

    /// Binary payload of an embedded resource.
    async fn resource(&self, resource_id: &str) -> Result<Bytes, Error>;
}
