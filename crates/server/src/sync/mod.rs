//! Notebook mirror pipeline.
//!
//! A run replaces the section table first, then walks the kept sections one
//! at a time and brings each section's pages up to date.

pub mod pages;
pub mod sections;

pub use pages::{PageSyncReport, PageSyncer};
pub use sections::SectionSyncer;

use onesync_client::{ContentRewriter, ContentSource};
use onesync_core::{AppConfig, Error, Store};
use serde::Serialize;
use std::sync::Arc;

/// Totals for one notebook run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct SyncSummary {
    pub sections: u32,
    pub pages_upserted: u32,
}

#[derive(Clone)]
pub struct SyncOrchestrator {
    sections: SectionSyncer,
    pages: PageSyncer,
}

impl SyncOrchestrator {
    pub fn new(sections: SectionSyncer, pages: PageSyncer) -> Self {
        Self { sections, pages }
    }

    /// Wire both syncers from configuration.
    pub fn from_config(config: &AppConfig, store: Store, source: Arc<dyn ContentSource>) -> Self {
        let sections = SectionSyncer::new(store.clone(), source.clone(), config.reserved_section_prefix.clone());
        let pages = PageSyncer::new(store, source, ContentRewriter::from(config), config.page_size)
            .with_max_batches(config.page_batch_cap());
        Self::new(sections, pages)
    }

    /// Mirror one notebook. Stops at the first failing section; sections
    /// already processed keep their progress.
    pub async fn sync(&self, notebook_id: &str) -> Result<SyncSummary, Error> {
        let sections = self.sections.sync_sections(notebook_id).await?;

        let mut summary = SyncSummary { sections: sections.len() as u32, pages_upserted: 0 };
        for section in &sections {
            let report = self.pages.sync_pages(&section.id).await?;
            summary.pages_upserted += report.pages_upserted;
        }

        tracing::info!(
            notebook_id,
            sections = summary.sections,
            pages = summary.pages_upserted,
            "notebook sync finished"
        );
        Ok(summary)
    }
}
