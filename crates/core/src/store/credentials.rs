//! Named credential blobs.

use super::connection::Store;
use crate::Error;
use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

/// Key-value persistence for opaque credential blobs.
///
/// The token lifecycle only ever reads and writes one well-known name.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the value stored under `name`, if any.
    async fn load_credential(&self, name: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `name`, replacing any previous value.
    async fn save_credential(&self, name: &str, value: &str) -> Result<(), Error>;
}

#[async_trait]
impl CredentialStore for Store {
    async fn load_credential(&self, name: &str) -> Result<Option<String>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT value FROM credentials WHERE name = ?1", params![name], |row| {
                    row.get(0)
                });
                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn save_credential(&self, name: &str, value: &str) -> Result<(), Error> {
        let name = name.to_string();
        let value = value.to_string();
        let updated_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO credentials (name, value, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(name) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![name, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
