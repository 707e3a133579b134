//! Backend subscription-status port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::AuthToken;
use crate::domain::subscription::BackendStatus;

/// Port for the backend's admin/manual premium signal.
///
/// # Contract
///
/// - A missing token short-circuits to [`BackendStatus::none`] without a
///   network call.
/// - Transport/HTTP failure returns an error sentinel distinct from
///   "no premium", so callers can retain the last-known backend signal
///   instead of downgrading a user over a transient outage.
#[async_trait]
pub trait SubscriptionStatusFetcher: Send + Sync {
    /// Fetches the backend premium signals for the given session.
    async fn fetch(&self, token: Option<&AuthToken>) -> Result<BackendStatus, StatusFetchError>;
}

/// Errors from the backend status endpoint.
///
/// Deliberately not convertible into a "not premium" value: an error must
/// never be mistaken for a downgrade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusFetchError {
    /// Network connectivity issue.
    #[error("backend network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status.
    #[error("backend returned HTTP {0}")]
    Http(u16),

    /// Response body could not be interpreted.
    #[error("invalid backend response: {0}")]
    InvalidBody(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fetcher_is_object_safe() {
        fn _accepts_dyn(_fetcher: &dyn SubscriptionStatusFetcher) {}
    }

    #[test]
    fn fetch_error_display() {
        assert_eq!(
            StatusFetchError::Http(503).to_string(),
            "backend returned HTTP 503"
        );
        assert!(StatusFetchError::Network("dns".to_string())
            .to_string()
            .contains("dns"));
    }
}
