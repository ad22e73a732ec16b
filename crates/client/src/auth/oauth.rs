//! Token endpoint client for the authorization-code and refresh-token grants.

use chrono::Utc;
use onesync_core::{AppConfig, Error};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::AccessToken;

/// OAuth2 client registration and endpoints.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
    pub timeout: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        let timeout = app.timeout();
        Self {
            client_id: String::new(),
            client_secret: None,
            redirect_uri: None,
            scopes: app.scopes,
            authorize_url: app.authorize_url,
            token_url: app.token_url,
            timeout,
        }
    }
}

impl From<&AppConfig> for OAuthConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            client_id: config.client_id.clone().unwrap_or_default(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            timeout: config.timeout(),
        }
    }
}

impl OAuthConfig {
    fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Client for the remote token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// URL the account owner opens to grant access.
    pub fn authorize_url(&self, state: &str) -> Result<Url, Error> {
        let redirect_uri = self
            .config
            .redirect_uri
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("redirect_uri is not configured".into()))?;

        Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("response_mode", "query"),
                ("scope", self.config.scope().as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::InvalidInput(format!("invalid authorize_url: {e}")))
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error> {
        let redirect_uri = self.config.redirect_uri.clone().unwrap_or_default();
        self.token_request(&[("grant_type", "authorization_code"), ("code", code), ("redirect_uri", &redirect_uri)])
            .await
    }

    /// Exchange a refresh token for a new token set.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, Error> {
        self.token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)]).await
    }

    async fn token_request(&self, grant: &[(&str, &str)]) -> Result<AccessToken, Error> {
        let scope = self.config.scope();
        let mut form: Vec<(&str, &str)> = vec![("client_id", &self.config.client_id), ("scope", &scope)];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret));
        }
        form.extend_from_slice(grant);

        let response = self
            .http
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Auth(format!("token endpoint returned {}: {body}", status.as_u16())));
        }

        let token: AccessToken = serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;
        Ok(token.issued_at(Utc::now().timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> OAuthConfig {
        OAuthConfig {
            client_id: "app-id".into(),
            client_secret: Some("s3cret".into()),
            redirect_uri: Some("http://localhost:8084/auth".into()),
            token_url: format!("{}/token", server.uri()),
            ..Default::default()
        }
    }

    fn token_body() -> serde_json::Value {
        serde_json::json!({
            "token_type": "Bearer",
            "access_token": "at-new",
            "refresh_token": "rt-new",
            "expires_in": 3600
        })
    }

    #[tokio::test]
    async fn test_exchange_code_posts_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains("client_secret=s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(config(&server)).unwrap();
        let before = Utc::now().timestamp();
        let token = client.exchange_code("the-code").await.unwrap();

        assert_eq!(token.access_token, "at-new");
        assert!(token.expire_at >= before + 3600);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
            .mount(&server)
            .await;

        let client = OAuthClient::new(config(&server)).unwrap();
        let err = client.refresh("stale").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_authorize_url() {
        let client = OAuthClient::new(OAuthConfig {
            client_id: "app-id".into(),
            redirect_uri: Some("http://localhost:8084/auth".into()),
            ..Default::default()
        })
        .unwrap();

        let url = client.authorize_url("42").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "app-id".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), "offline_access user.read notes.read".into())));
        assert!(pairs.contains(&("state".into(), "42".into())));
    }

    #[test]
    fn test_authorize_url_requires_redirect() {
        let client = OAuthClient::new(OAuthConfig::default()).unwrap();
        assert!(matches!(client.authorize_url("1"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_default_uses_app_defaults() {
        let app = AppConfig::default();
        let config = OAuthConfig::default();
        assert_eq!(config.token_url, app.token_url);
        assert_eq!(config.authorize_url, app.authorize_url);
        assert_eq!(config.scopes, app.scopes);
        assert_eq!(config.timeout, app.timeout());
        assert!(config.client_id.is_empty());
    }
}
