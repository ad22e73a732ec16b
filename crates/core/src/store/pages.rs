//! Page table: upsert-by-id semantics and read-side queries.

use super::{connection::Store, timestamp_at};
use crate::Error;
use crate::models::{Page, PageSummary, Paged, format_timestamp};
use chrono::{DateTime, Utc};
use tokio_rusqlite::{params, rusqlite};

impl Store {
    /// Insert or fully overwrite a page, keyed by id.
    ///
    /// Each call commits on its own so progress survives an aborted run.
    pub async fn upsert_page(&self, page: &Page) -> Result<(), Error> {
        let page = page.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO pages (id, section_id, title, cover, summary, content, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(id) DO UPDATE SET
                        section_id = excluded.section_id,
                        title = excluded.title,
                        cover = excluded.cover,
                        summary = excluded.summary,
                        content = excluded.content,
                        created_at = excluded.created_at,
                        updated_at = excluded.updated_at",
                    params![
                        &page.id,
                        &page.section_id,
                        &page.title,
                        &page.cover,
                        &page.summary,
                        &page.content,
                        format_timestamp(&page.created_at),
                        format_timestamp(&page.updated_at),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Latest stored `updated_at` for a section, used as the sync watermark.
    ///
    /// Returns None if no page of the section has been mirrored yet.
    pub async fn page_watermark(&self, section_id: &str) -> Result<Option<DateTime<Utc>>, Error> {
        let section_id = section_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<DateTime<Utc>>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT updated_at FROM pages WHERE section_id = ?1 ORDER BY updated_at DESC LIMIT 1",
                )?;
                match stmt.query_row(params![section_id], |row| timestamp_at(row, 0)) {
                    Ok(ts) => Ok(Some(ts)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get a page by id.
    ///
    /// Returns None if the page is not mirrored.
    pub async fn page_get(&self, id: &str) -> Result<Option<Page>, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Page>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, section_id, title, cover, summary, content, created_at, updated_at
                    FROM pages WHERE id = ?1",
                )?;

                let result = stmt.query_row(params![id], |row| {
                    Ok(Page {
                        id: row.get(0)?,
                        section_id: row.get(1)?,
                        title: row.get(2)?,
                        cover: row.get(3)?,
                        summary: row.get(4)?,
                        content: row.get(5)?,
                        created_at: timestamp_at(row, 6)?,
                        updated_at: timestamp_at(row, 7)?,
                    })
                });

                match result {
                    Ok(p) => Ok(Some(p)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List page summaries, newest first, optionally restricted to one section.
    ///
    /// `page` is 1-based; values below 1 are treated as 1.
    pub async fn page_list(&self, section_id: Option<&str>, page: u32, limit: u32) -> Result<Paged<PageSummary>, Error> {
        let section_id = section_id.filter(|s| !s.is_empty()).map(str::to_string);
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(limit);

        self.conn
            .call(move |conn| -> Result<Paged<PageSummary>, Error> {
                let total: i64 = conn.query_row(
                    "SELECT COUNT(1) FROM pages WHERE ?1 IS NULL OR section_id = ?1",
                    params![section_id],
                    |row| row.get(0),
                )?;

                let mut paged = Paged::empty(page, limit);
                if total == 0 {
                    return Ok(paged);
                }

                let mut stmt = conn.prepare(
                    "SELECT p.id, p.section_id, s.display_name, p.title, p.cover, p.summary,
                        p.created_at, p.updated_at
                    FROM pages p LEFT JOIN sections s ON p.section_id = s.id
                    WHERE ?1 IS NULL OR p.section_id = ?1
                    ORDER BY p.created_at DESC, p.id
                    LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt.query_map(params![section_id, i64::from(limit), offset], |row| {
                    Ok(PageSummary {
                        id: row.get(0)?,
                        section_id: row.get(1)?,
                        section_name: row.get(2)?,
                        title: row.get(3)?,
                        cover: row.get(4)?,
                        summary: row.get(5)?,
                        created_at: timestamp_at(row, 6)?,
                        updated_at: timestamp_at(row, 7)?,
                    })
                })?;

                paged.items = rows.collect::<Result<Vec<_>, _>>()?;
                paged.total = total as u64;
                Ok(paged)
            })
            .await
            .map_err(Error::from)
    }
}
