//! Section list mirror.

use onesync_client::ContentSource;
use onesync_core::{Error, Section, Store};
use std::sync::Arc;

/// Replaces the mirrored section table with the remote notebook's sections.
#[derive(Clone)]
pub struct SectionSyncer {
    store: Store,
    source: Arc<dyn ContentSource>,
    reserved_prefix: String,
}

impl SectionSyncer {
    pub fn new(store: Store, source: Arc<dyn ContentSource>, reserved_prefix: impl Into<String>) -> Self {
        Self { store, source, reserved_prefix: reserved_prefix.into() }
    }

    /// Fetch, filter out reserved sections, and replace the table in one transaction.
    ///
    /// A fetch failure leaves the stored sections untouched.
    pub async fn sync_sections(&self, notebook_id: &str) -> Result<Vec<Section>, Error> {
        let remote = self.source.sections(notebook_id).await?;
        let fetched = remote.len();

        let sections: Vec<Section> = remote.into_iter().filter(|s| !self.is_reserved(s)).collect();
        self.store.replace_sections(&sections).await?;

        tracing::info!(notebook_id, fetched, kept = sections.len(), "sections replaced");
        Ok(sections)
    }

    fn is_reserved(&self, section: &Section) -> bool {
        !self.reserved_prefix.is_empty() && section.display_name.starts_with(&self.reserved_prefix)
    }
}
