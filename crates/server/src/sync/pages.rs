//! Incremental page mirror for one section.
//!
//! Only pages modified after the newest stored `updated_at` are requested.
//! A run first walks the newest-first batches until a short batch signals the
//! end, then fetches, rewrites and upserts the listed pages oldest-first, one
//! commit per page. The stored watermark therefore only ever covers pages that
//! were actually written: a failure mid-run leaves every older page stored and
//! every newer one to be listed again on the next run.

use onesync_client::{ContentRewriter, ContentSource, PageQuery, RemotePage};
use onesync_core::{Error, Page, Store};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Counters for one section run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct PageSyncReport {
    pub batches: u32,
    pub pages_upserted: u32,
    /// The batch cap was hit before the listing ended; nothing was stored.
    pub truncated: bool,
}

#[derive(Clone)]
pub struct PageSyncer {
    store: Store,
    source: Arc<dyn ContentSource>,
    rewriter: ContentRewriter,
    page_size: u32,
    max_batches: Option<u32>,
}

impl PageSyncer {
    pub fn new(store: Store, source: Arc<dyn ContentSource>, rewriter: ContentRewriter, page_size: u32) -> Self {
        Self { store, source, rewriter, page_size: page_size.max(1), max_batches: None }
    }

    /// List at most `cap` batches per run; `None` walks until a short batch.
    pub fn with_max_batches(mut self, cap: Option<u32>) -> Self {
        self.max_batches = cap;
        self
    }

    pub async fn sync_pages(&self, section_id: &str) -> Result<PageSyncReport, Error> {
        let watermark = self.store.page_watermark(section_id).await?;
        tracing::debug!(section_id, watermark = ?watermark, "page sync starting");

        let mut report = PageSyncReport::default();
        let Some(changed) = self.list_changed(section_id, watermark, &mut report).await? else {
            tracing::warn!(
                section_id,
                batches = report.batches,
                "page batch cap reached before the listing ended, section left unchanged"
            );
            report.truncated = true;
            return Ok(report);
        };

        for remote in changed {
            self.sync_page(section_id, remote).await?;
            report.pages_upserted += 1;
        }

        tracing::info!(section_id, batches = report.batches, pages = report.pages_upserted, "page sync finished");
        Ok(report)
    }

    /// Every page modified after `watermark`, oldest first.
    ///
    /// Returns `None` when the batch cap stops the walk early.
    async fn list_changed(
        &self, section_id: &str, watermark: Option<chrono::DateTime<chrono::Utc>>, report: &mut PageSyncReport,
    ) -> Result<Option<Vec<RemotePage>>, Error> {
        // keyed by id: an edit between two batches can shift a page across the boundary
        let mut listed: HashMap<String, RemotePage> = HashMap::new();
        loop {
            if let Some(cap) = self.max_batches
                && report.batches >= cap
            {
                return Ok(None);
            }

            let query = PageQuery::batch(report.batches, self.page_size, watermark);
            let batch = self.source.pages(section_id, &query).await?;
            report.batches += 1;

            let received = batch.len();
            for remote in batch {
                match listed.get(&remote.id) {
                    Some(seen) if seen.last_modified_date_time >= remote.last_modified_date_time => {}
                    _ => {
                        listed.insert(remote.id.clone(), remote);
                    }
                }
            }

            if received < self.page_size as usize {
                break;
            }
        }

        let mut changed: Vec<RemotePage> = listed.into_values().collect();
        changed.sort_by(|a, b| a.last_modified_date_time.cmp(&b.last_modified_date_time).then_with(|| a.id.cmp(&b.id)));
        Ok(Some(changed))
    }

    async fn sync_page(&self, section_id: &str, remote: RemotePage) -> Result<(), Error> {
        let html = self.source.page_content(&remote.id).await?;
        let rewritten = self.rewriter.rewrite(&html);

        let page = Page {
            id: remote.id,
            section_id: section_id.to_string(),
            title: remote.title.unwrap_or_default(),
            cover: rewritten.cover,
            summary: rewritten.summary,
            content: rewritten.content,
            created_at: remote.created_date_time,
            updated_at: remote.last_modified_date_time,
        };
        self.store.upsert_page(&page).await?;
        tracing::debug!(page_id = %page.id, section_id, "page upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSource, at};

    const BASE: &str = "https://graph.microsoft.com";

    async fn setup(page_size: u32) -> (Arc<FakeSource>, Store, PageSyncer) {
        let source = Arc::new(FakeSource::default());
        let store = Store::open_in_memory().await.unwrap();
        let syncer = PageSyncer::new(store.clone(), source.clone(), ContentRewriter::new(BASE), page_size);
        (source, store, syncer)
    }

    fn body(text: &str) -> String {
        format!("<html><body><p>{text}</p></body></html>")
    }

    #[tokio::test]
    async fn test_first_run_mirrors_all_pages() {
        let (source, store, syncer) = setup(2).await;
        for i in 0..5 {
            source.put_page("s1", &format!("p{i}"), &format!("Page {i}"), 10 + i, &body("hello"));
        }

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report, PageSyncReport { batches: 3, pages_upserted: 5, truncated: false });

        let queries = source.queries_for("s1");
        let skips: Vec<u32> = queries.iter().map(|q| q.skip).collect();
        assert_eq!(skips, vec![0, 2, 4]);
        assert!(queries.iter().all(|q| q.top == 2 && q.modified_after.is_none()));

        assert_eq!(store.page_list(Some("s1"), 1, 10).await.unwrap().total, 5);
        assert_eq!(store.page_watermark("s1").await.unwrap(), Some(at(14)));
    }

    #[tokio::test]
    async fn test_full_batch_then_empty_batch_terminates() {
        let (source, _store, syncer) = setup(2).await;
        source.put_page("s1", "p1", "One", 1, &body("a"));
        source.put_page("s1", "p2", "Two", 2, &body("b"));

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report, PageSyncReport { batches: 2, pages_upserted: 2, truncated: false });
    }

    #[tokio::test]
    async fn test_second_run_uses_watermark() {
        let (source, store, syncer) = setup(20).await;
        source.put_page("s1", "p1", "One", 1, &body("a"));
        source.put_page("s1", "p2", "Two", 2, &body("b"));
        syncer.sync_pages("s1").await.unwrap();

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report.pages_upserted, 0);
        assert_eq!(source.queries_for("s1").last().unwrap().modified_after, Some(at(2)));

        source.put_page("s1", "p1", "One edited", 5, &body("changed"));
        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report.pages_upserted, 1);

        let page = store.page_get("p1").await.unwrap().unwrap();
        assert_eq!(page.title, "One edited");
        assert_eq!(page.summary, "changed");
        assert_eq!(page.updated_at, at(5));
    }

    #[tokio::test]
    async fn test_rerun_without_changes_is_idempotent() {
        let (source, store, syncer) = setup(20).await;
        source.put_page("s1", "p1", "One", 1, &body("a"));
        syncer.sync_pages("s1").await.unwrap();
        let before = store.page_get("p1").await.unwrap();

        syncer.sync_pages("s1").await.unwrap();
        assert_eq!(store.page_get("p1").await.unwrap(), before);
        assert_eq!(store.page_list(None, 1, 10).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_content_is_rewritten() {
        let (source, store, syncer) = setup(20).await;
        let html = format!(
            r#"<html><body><p>Look</p><img src="{BASE}/v1.0/users('u')/onenote/resources/R9/$value"></body></html>"#
        );
        source.put_page("s1", "p1", "Pic", 1, &html);
        syncer.sync_pages("s1").await.unwrap();

        let page = store.page_get("p1").await.unwrap().unwrap();
        assert_eq!(page.cover, "/resources/R9");
        assert!(page.content.contains(r#"src="/resources/R9""#));
        assert_eq!(page.summary, "Look");
    }

    #[tokio::test]
    async fn test_failure_keeps_older_pages() {
        let (source, store, syncer) = setup(20).await;
        source.put_page("s1", "p-new", "Newest", 3, &body("a"));
        source.put_page("s1", "p-bad", "Broken", 2, &body("b"));
        source.put_page("s1", "p-old", "Oldest", 1, &body("c"));
        source.fail_content("p-bad");

        assert!(syncer.sync_pages("s1").await.is_err());
        assert!(store.page_get("p-old").await.unwrap().is_some());
        assert!(store.page_get("p-bad").await.unwrap().is_none());
        assert!(store.page_get("p-new").await.unwrap().is_none());
        assert_eq!(store.page_watermark("s1").await.unwrap(), Some(at(1)));
    }

    #[tokio::test]
    async fn test_retry_after_failure_converges() {
        let (source, store, syncer) = setup(2).await;
        source.put_page("s1", "p-new", "Newest", 3, &body("a"));
        source.put_page("s1", "p-bad", "Broken", 2, &body("b"));
        source.put_page("s1", "p-old", "Oldest", 1, &body("c"));
        source.fail_content("p-bad");
        assert!(syncer.sync_pages("s1").await.is_err());

        source.heal_content("p-bad");
        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report.pages_upserted, 2);
        for _ in 0..2 {
            assert_eq!(syncer.sync_pages("s1").await.unwrap().pages_upserted, 0);
        }

        for id in ["p-new", "p-bad", "p-old"] {
            assert!(store.page_get(id).await.unwrap().is_some(), "missing {id}");
        }
        assert_eq!(store.page_list(Some("s1"), 1, 10).await.unwrap().total, 3);
        assert_eq!(store.page_watermark("s1").await.unwrap(), Some(at(3)));
    }

    #[tokio::test]
    async fn test_pages_upserted_oldest_first() {
        let (source, store, syncer) = setup(1).await;
        for i in 0..3 {
            source.put_page("s1", &format!("p{i}"), "t", 10 - i, &body("x"));
        }
        source.fail_content("p0");

        assert!(syncer.sync_pages("s1").await.is_err());
        assert!(store.page_get("p2").await.unwrap().is_some());
        assert!(store.page_get("p1").await.unwrap().is_some());
        assert!(store.page_get("p0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edit_during_run_is_picked_up_next_run() {
        let (source, store, syncer) = setup(20).await;
        source.put_page("s1", "p-early", "Early", 1, &body("first draft"));
        source.put_page("s1", "p-late", "Late", 2, &body("b"));
        // fetching p-late's body races with an edit to the already stored p-early
        source.edit_on_content("p-late", "s1", "p-early", "Early v2", 5, &body("second draft"));

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report.pages_upserted, 2);
        let page = store.page_get("p-early").await.unwrap().unwrap();
        assert_eq!(page.summary, "first draft");
        assert_eq!(store.page_watermark("s1").await.unwrap(), Some(at(2)));

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report.pages_upserted, 1);
        let page = store.page_get("p-early").await.unwrap().unwrap();
        assert_eq!(page.title, "Early v2");
        assert_eq!(page.summary, "second draft");
        assert_eq!(page.updated_at, at(5));
        assert_eq!(store.page_watermark("s1").await.unwrap(), Some(at(5)));
    }

    #[tokio::test]
    async fn test_batch_cap_leaves_section_unchanged() {
        let (source, store, syncer) = setup(1).await;
        let syncer = syncer.with_max_batches(Some(2));
        for i in 0..4 {
            source.put_page("s1", &format!("p{i}"), "t", i, &body("x"));
        }

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report, PageSyncReport { batches: 2, pages_upserted: 0, truncated: true });
        assert_eq!(store.page_list(Some("s1"), 1, 10).await.unwrap().total, 0);
        assert_eq!(source.content_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_cap_not_hit_when_listing_ends() {
        let (source, store, syncer) = setup(2).await;
        let syncer = syncer.with_max_batches(Some(2));
        for i in 0..3 {
            source.put_page("s1", &format!("p{i}"), "t", i, &body("x"));
        }

        let report = syncer.sync_pages("s1").await.unwrap();
        assert_eq!(report, PageSyncReport { batches: 2, pages_upserted: 3, truncated: false });
        assert_eq!(store.page_list(Some("s1"), 1, 10).await.unwrap().total, 3);
    }

    #[tokio::test]
    async fn test_untitled_page() {
        let (source, store, syncer) = setup(20).await;
        source.put_page("s1", "p1", "", 1, &body("x"));
        syncer.sync_pages("s1").await.unwrap();
        assert_eq!(store.page_get("p1").await.unwrap().unwrap().title, "");
    }
}
