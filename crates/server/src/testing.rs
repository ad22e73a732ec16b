//! In-memory content source for pipeline tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use onesync_client::{ContentSource, PageQuery, RemotePage};
use onesync_core::{Error, Section};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn section(id: &str, name: &str) -> Section {
    Section { id: id.into(), display_name: name.into(), created_at: at(0), updated_at: at(1), is_default: false }
}

/// Remote edit applied once when `trigger`'s body is fetched.
struct PendingEdit {
    trigger: String,
    section_id: String,
    id: String,
    title: String,
    modified: i64,
    body: String,
}

#[derive(Default)]
pub struct FakeSource {
    sections: Mutex<Vec<Section>>,
    pages: Mutex<HashMap<String, Vec<RemotePage>>>,
    bodies: Mutex<HashMap<String, String>>,
    failing_pages: Mutex<HashSet<String>>,
    edits: Mutex<Vec<PendingEdit>>,
    pub queries: Mutex<Vec<(String, PageQuery)>>,
    pub content_calls: AtomicUsize,
    pub fail_sections: Mutex<bool>,
    pub revoked: Mutex<bool>,
}

impl FakeSource {
    pub fn set_sections(&self, sections: Vec<Section>) {
        *self.sections.lock().unwrap() = sections;
    }

    /// Add or replace a page; `modified` is minutes after the fixed epoch.
    pub fn put_page(&self, section_id: &str, id: &str, title: &str, modified: i64, body: &str) {
        let page = RemotePage {
            id: id.into(),
            title: Some(title.into()),
            created_date_time: at(0),
            last_modified_date_time: at(modified),
        };
        let mut pages = self.pages.lock().unwrap();
        let list = pages.entry(section_id.to_string()).or_default();
        list.retain(|p| p.id != id);
        list.push(page);
        self.bodies.lock().unwrap().insert(id.to_string(), body.to_string());
    }

    pub fn fail_content(&self, page_id: &str) {
        self.failing_pages.lock().unwrap().insert(page_id.to_string());
    }

    pub fn heal_content(&self, page_id: &str) {
        self.failing_pages.lock().unwrap().remove(page_id);
    }

    /// Edit a page the moment `trigger`'s body is fetched, as if the owner saved it mid-run.
    pub fn edit_on_content(&self, trigger: &str, section_id: &str, id: &str, title: &str, modified: i64, body: &str) {
        self.edits.lock().unwrap().push(PendingEdit {
            trigger: trigger.into(),
            section_id: section_id.into(),
            id: id.into(),
            title: title.into(),
            modified,
            body: body.into(),
        });
    }

    pub fn queries_for(&self, section_id: &str) -> Vec<PageQuery> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == section_id)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn sections(&self, _notebook_id: &str) -> Result<Vec<Section>, Error> {
        if *self.revoked.lock().unwrap() {
            return Err(Error::Auth("refresh token revoked".into()));
        }
        if *self.fail_sections.lock().unwrap() {
            return Err(Error::Remote { status: 500, body: "boom".into() });
        }
        Ok(self.sections.lock().unwrap().clone())
    }

    async fn pages(&self, section_id: &str, query: &PageQuery) -> Result<Vec<RemotePage>, Error> {
        self.queries.lock().unwrap().push((section_id.to_string(), query.clone()));

        let mut pages: Vec<RemotePage> = self
            .pages
            .lock()
            .unwrap()
            .get(section_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| query.modified_after.is_none_or(|after| p.last_modified_date_time > after))
            .collect();
        pages.sort_by(|a, b| b.last_modified_date_time.cmp(&a.last_modified_date_time).then(a.id.cmp(&b.id)));

        Ok(pages.into_iter().skip(query.skip as usize).take(query.top as usize).collect())
    }

    async fn page_content(&self, page_id: &str) -> Result<String, Error> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        let due: Vec<PendingEdit> = {
            let mut edits = self.edits.lock().unwrap();
            let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut *edits).into_iter().partition(|e| e.trigger == page_id);
            *edits = rest;
            due
        };
        for edit in due {
            self.put_page(&edit.section_id, &edit.id, &edit.title, edit.modified, &edit.body);
        }
        if self.failing_pages.lock().unwrap().contains(page_id) {
            return Err(Error::Network(format!("connection reset fetching {page_id}")));
        }
        self.bodies
            .lock()
            .unwrap()
            .get(page_id)
            .cloned()
            .ok_or_else(|| Error::Remote { status: 404, body: page_id.to_string() })
    }

    async fn resource(&self, resource_id: &str) -> Result<Bytes, Error> {
        Ok(Bytes::from(format!("bytes-of-{resource_id}")))
    }
}
