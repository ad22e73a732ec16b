//! Unified error types for onesync.
//!
//! Every variant renders with a stable code prefix so that log lines and
//! tool errors can be matched without parsing the message.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error type shared by the store, the remote client and the sync pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credential stored, or the token endpoint rejected the grant.
    #[error("AUTH_ERROR: {0}")]
    Auth(String),

    /// The remote source answered with a non-success status.
    #[error("REMOTE_ERROR: status {status}: {body}")]
    Remote { status: u16, body: String },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("REMOTE_ERROR: network: {0}")]
    Network(String),

    /// The remote payload could not be decoded.
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Resource cache filesystem failure.
    #[error("CACHE_ERROR: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters (e.g., a resource id with path separators).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Requested record is not mirrored locally.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::NotFound(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) => -32002,
            Error::Remote { .. } | Error::Network(_) => -32008,
            Error::Auth(_) => -32009,
            Error::Decode(_) => -32010,
            Error::Io(_) => -32011,
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
