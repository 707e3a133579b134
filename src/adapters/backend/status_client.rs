//! HTTP client for the backend subscription-status endpoint.
//!
//! Implements `SubscriptionStatusFetcher` against
//! `GET /api/user/subscription-status` with bearer auth. Without a token the
//! fetch short-circuits to the all-false default and no request is made.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::BackendConfig;
use crate::domain::foundation::{AuthToken, Timestamp};
use crate::domain::subscription::BackendStatus;
use crate::ports::{StatusFetchError, SubscriptionStatusFetcher};

/// Backend subscription-status client.
pub struct BackendStatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendStatusClient {
    /// Creates a client from backend configuration.
    pub fn new(config: &BackendConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client against an explicit base URL (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/user/subscription-status", self.base_url)
    }
}

/// Wire shape of the subscription-status response.
#[derive(Debug, Deserialize)]
struct SubscriptionStatusResponse {
    #[serde(default)]
    is_admin: bool,

    #[serde(default)]
    is_premium: bool,

    #[serde(default)]
    premium_expires_at: Option<String>,

    /// Informational only; the reconciler derives the source itself.
    #[serde(default)]
    premium_source: Option<String>,
}

/// Decodes a response body into backend status.
///
/// Kept pure so wire parsing is testable without a server.
fn parse_status(body: &str) -> Result<BackendStatus, StatusFetchError> {
    let response: SubscriptionStatusResponse = serde_json::from_str(body)
        .map_err(|e| StatusFetchError::InvalidBody(e.to_string()))?;

    let expires_at = match response.premium_expires_at.as_deref() {
        None => None,
        Some(raw) => Some(
            Timestamp::parse_rfc3339(raw)
                .map_err(|e| StatusFetchError::InvalidBody(e.to_string()))?,
        ),
    };

    if let Some(source) = &response.premium_source {
        tracing::debug!(premium_source = %source, "Backend reported premium source");
    }

    Ok(BackendStatus {
        is_admin: response.is_admin,
        is_premium_manual: response.is_premium,
        expires_at,
    })
}

#[async_trait]
impl SubscriptionStatusFetcher for BackendStatusClient {
    async fn fetch(&self, token: Option<&AuthToken>) -> Result<BackendStatus, StatusFetchError> {
        // Unauthenticated: definite all-false default, no network call.
        let token = match token {
            None => return Ok(BackendStatus::none()),
            Some(token) => token,
        };

        let response = self
            .http
            .get(self.endpoint())
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Subscription-status request failed");
                StatusFetchError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(http_status = status.as_u16(), "Subscription-status request rejected");
            return Err(StatusFetchError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StatusFetchError::Network(e.to_string()))?;

        parse_status(&body)
    }
}
