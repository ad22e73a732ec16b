//! Credential lifecycle for the remote API.
//!
//! [`TokenManager`] hands out a valid bearer token: it loads the persisted
//! token set on first use, refreshes it when expired, and writes the refreshed
//! set back before returning. Refreshes are serialized so concurrent callers
//! trigger at most one token request.

pub mod oauth;
pub mod token;

pub use oauth::{OAuthClient, OAuthConfig};
pub use token::AccessToken;

use chrono::Utc;
use onesync_core::{CredentialStore, Error};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Credential name the token set is stored under.
pub const TOKEN_CREDENTIAL: &str = "graph_token";

pub struct TokenManager {
    oauth: OAuthClient,
    store: Arc<dyn CredentialStore>,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(oauth: OAuthClient, store: Arc<dyn CredentialStore>) -> Self {
        Self { oauth, store, cached: Mutex::new(None) }
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Return a non-expired access token, refreshing and persisting if needed.
    ///
    /// Fails with `Error::Auth` when no token set was ever stored or the
    /// refresh is rejected.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut cached = self.cached.lock().await;

        let current = match cached.take() {
            Some(token) => token,
            None => self.load().await?,
        };

        let now = Utc::now().timestamp();
        if !current.is_expired(now) {
            let access = current.access_token.clone();
            *cached = Some(current);
            return Ok(access);
        }

        tracing::info!(expired_at = current.expire_at, "access token expired, refreshing");
        let mut refreshed = match self.oauth.refresh(&current.refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                // keep the stale set so the next caller retries the refresh
                *cached = Some(current);
                return Err(e);
            }
        };
        if refreshed.refresh_token.is_empty() {
            refreshed.refresh_token = current.refresh_token;
        }

        // the old refresh token may already be revoked, so cache before reporting a failed write
        let persisted = self.persist(&refreshed).await;
        let access = refreshed.access_token.clone();
        *cached = Some(refreshed);
        persisted?;
        Ok(access)
    }

    /// Persist a freshly issued token set and make it current.
    pub async fn store(&self, token: AccessToken) -> Result<(), Error> {
        let mut cached = self.cached.lock().await;
        self.persist(&token).await?;
        *cached = Some(token);
        Ok(())
    }

    async fn load(&self) -> Result<AccessToken, Error> {
        let raw = self
            .store
            .load_credential(TOKEN_CREDENTIAL)
            .await?
            .ok_or_else(|| Error::Auth("no stored credentials; complete the authorization flow first".into()))?;
        serde_json::from_str(&raw).map_err(|e| Error::Auth(format!("stored token is unreadable: {e}")))
    }

    async fn persist(&self, token: &AccessToken) -> Result<(), Error> {
        let raw = serde_json::to_string(token).map_err(|e| Error::Decode(e.to_string()))?;
        self.store.save_credential(TOKEN_CREDENTIAL, &raw).await
    }
}
