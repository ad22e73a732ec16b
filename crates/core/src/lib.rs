//! Core types and shared functionality for onesync.
//!
//! This crate provides:
//! - The local mirror store with SQLite backend
//! - Mirrored record types
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use models::{Page, PageSummary, Paged, Section};
pub use store::{CredentialStore, Store};
