//! SQLite-backed mirror of the remote notebook.
//!
//! This module provides the local relational store using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - Full-replace section table (one transaction per sync)
//! - Upsert-by-id page table with a per-section watermark
//! - Named credential blobs (upsert-by-name)
//! - Automatic schema migrations and WAL mode for concurrent readers

pub mod connection;
pub mod credentials;
pub mod migrations;
pub mod pages;
pub mod sections;

pub use crate::Error;

pub use connection::Store;
pub use credentials::CredentialStore;

use chrono::{DateTime, Utc};
use tokio_rusqlite::rusqlite::{self, Row, types::Type};

/// Read a stored timestamp column.
pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    crate::models::parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
