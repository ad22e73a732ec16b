//! Remote side of the notebook mirror.
//!
//! - [`auth`]: OAuth2 token exchange and the refreshing [`TokenManager`]
//! - [`graph`]: typed client for the notebook API
//! - [`rewrite`]: page HTML transform (resource links, summary, cover)
//! - [`resources`]: on-disk resource cache with per-key download deduplication
//! - [`source`]: the [`ContentSource`] trait the sync pipeline depends on

pub mod auth;
pub mod graph;
pub mod resources;
pub mod rewrite;
pub mod source;

pub use auth::{AccessToken, OAuthClient, OAuthConfig, TOKEN_CREDENTIAL, TokenManager};
pub use graph::{GraphClient, GraphConfig, Me, PageQuery, RemotePage};
pub use resources::{KeyedLocks, ResourceCache};
pub use rewrite::{ContentRewriter, RewrittenContent};
pub use source::ContentSource;
