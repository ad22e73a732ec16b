//! Section table: full-replace semantics.

use super::{connection::Store, timestamp_at};
use crate::Error;
use crate::models::{Section, format_timestamp};
use tokio_rusqlite::params;

impl Store {
    /// Replace the whole section table with `sections`.
    ///
    /// Delete and inserts run in one transaction, so readers see either the
    /// previous set or the new one, never an empty table in between.
    pub async fn replace_sections(&self, sections: &[Section]) -> Result<usize, Error> {
        let sections = sections.to_vec();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                let removed = tx.execute("DELETE FROM sections", [])?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO sections (id, display_name, created_at, updated_at, is_default)
                        VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    for section in &sections {
                        stmt.execute(params![
                            &section.id,
                            &section.display_name,
                            format_timestamp(&section.created_at),
                            format_timestamp(&section.updated_at),
                            section.is_default as i32,
                        ])?;
                    }
                }
                tx.commit()?;
                tracing::debug!(removed, inserted = sections.len(), "replaced sections");
                Ok(sections.len())
            })
            .await
            .map_err(Error::from)
    }

    /// List mirrored sections ordered by display name.
    pub async fn sections(&self) -> Result<Vec<Section>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Section>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, display_name, created_at, updated_at, is_default
                    FROM sections ORDER BY display_name COLLATE NOCASE, id",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(Section {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        created_at: timestamp_at(row, 2)?,
                        updated_at: timestamp_at(row, 3)?,
                        is_default: row.get::<_, i32>(4)? == 1,
                    })
                })?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }
}
