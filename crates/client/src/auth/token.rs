//! OAuth2 token set as returned by the token endpoint and persisted locally.

use serde::{Deserialize, Serialize};

/// Access/refresh token pair with its computed expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token_type: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Lifetime in seconds, relative to issue time.
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Absolute expiry, epoch seconds. Absent in endpoint responses.
    #[serde(default)]
    pub expire_at: i64,
}

impl AccessToken {
    /// Stamp the absolute expiry from the issue time.
    pub fn issued_at(mut self, now: i64) -> Self {
        self.expire_at = now + self.expires_in;
        self
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_at <= now
    }
}
