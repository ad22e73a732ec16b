//! Remote payload types and conversion into mirrored records.

use chrono::{DateTime, Utc};
use onesync_core::Section;
use serde::Deserialize;

/// List envelope returned by every collection endpoint.
#[derive(Debug, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Section as returned by the notebook sections endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSection {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub created_date_time: DateTime<Utc>,
    pub last_modified_date_time: DateTime<Utc>,
    #[serde(default)]
    pub is_default: bool,
}

impl From<RemoteSection> for Section {
    fn from(raw: RemoteSection) -> Self {
        Section {
            id: raw.id,
            display_name: raw.display_name,
            created_at: raw.created_date_time,
            updated_at: raw.last_modified_date_time,
            is_default: raw.is_default,
        }
    }
}

/// Page metadata as returned by the section pages endpoint (no body).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePage {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_date_time: DateTime<Utc>,
    pub last_modified_date_time: DateTime<Utc>,
}

/// Signed-in account, used to check who completed the authorization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl Me {
    /// Whether this account matches `email`, ignoring case.
    pub fn matches_email(&self, email: &str) -> bool {
        [self.mail.as_deref(), self.user_principal_name.as_deref()]
            .into_iter()
            .flatten()
            .any(|candidate| candidate.eq_ignore_ascii_case(email))
    }
}
