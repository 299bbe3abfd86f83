//! Offline-token authentication.
//!
//! The Assisted Installer API accepts short-lived bearer tokens issued by the
//! Red Hat SSO. A long-lived offline token is exchanged for one with a
//! `refresh_token` grant, and the access token is reused until shortly before
//! it expires.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_SSO_URL: &str =
    "https://sso.redhat.com/auth/realms/redhat-external/protocol/openid-connect/token";

const CLIENT_ID: &str = "cloud-services";

/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    300
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct OfflineTokenAuth {
    http: reqwest::Client,
    sso_url: String,
    offline_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl OfflineTokenAuth {
    pub fn new(http: reqwest::Client, sso_url: String, offline_token: String) -> Self {
        Self {
            http,
            sso_url,
            offline_token,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid access token, exchanging the offline token when the
    /// cached one is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, ClientError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        tracing::debug!(sso_url = %self.sso_url, "Exchanging offline token");

        let resp = self
            .http
            .post(&self.sso_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", CLIENT_ID),
                ("refresh_token", self.offline_token.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Auth(format!("SSO returned {status}: {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Auth(format!("Failed to parse token response: {e}")))?;

        let access_token = token.access_token.clone();
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        tracing::debug!(expires_in = token.expires_in, "Access token refreshed");
        Ok(access_token)
    }

    fn cached_token(&self) -> Option<String> {
        let cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        cached
            .as_ref()
            .filter(|t| t.expires_at > Instant::now() + EXPIRY_MARGIN)
            .map(|t| t.access_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(sso_url: &str) -> OfflineTokenAuth {
        OfflineTokenAuth::new(reqwest::Client::new(), sso_url.into(), "offline".into())
    }

    #[test]
    fn no_cached_token_initially() {
        assert!(auth(DEFAULT_SSO_URL).cached_token().is_none());
    }

    #[test]
    fn nearly_expired_token_is_not_reused() {
        let auth = auth(DEFAULT_SSO_URL);
        *auth.cached.lock().unwrap() = Some(CachedToken {
            access_token: "stale".into(),
            expires_at: Instant::now() + Duration::from_secs(10),
        });
        assert!(auth.cached_token().is_none());

        *auth.cached.lock().unwrap() = Some(CachedToken {
            access_token: "fresh".into(),
            expires_at: Instant::now() + Duration::from_secs(600),
        });
        assert_eq!(auth.cached_token(), Some("fresh".into()));
    }

    #[tokio::test]
    async fn unreachable_sso_is_an_error() {
        let result = auth("http://127.0.0.1:9/token").access_token().await;
        assert!(result.is_err());
    }
}
