//! Purchase provider port for the third-party entitlement SDK.
//!
//! The SDK is injected as an optional capability at startup: in environments
//! where it is unavailable (simulators, test builds) the application passes
//! `None` and the subscription feature degrades to the backend-only signal.
//! This replaces the runtime conditional import of earlier revisions.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::foundation::ExternalCustomerId;
use crate::domain::subscription::{CustomerInfo, PlanType};

/// A purchasable product as presented on the paywall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Store product identifier.
    pub product_id: String,

    /// Plan classification of the product.
    pub plan: PlanType,
}

/// Port for the purchase/entitlement SDK.
///
/// Implementations talk to the real store SDK; the gateway on top of this
/// port owns the configured-once lifecycle and converts every error into a
/// definite return value before anything reaches the UI.
#[async_trait]
pub trait PurchaseProvider: Send + Sync {
    /// One-time SDK setup with the platform API key.
    async fn configure(&self, platform_key: &SecretString) -> Result<(), ProviderError>;

    /// Binds the SDK session to the given identity.
    async fn log_in(&self, customer_id: &ExternalCustomerId) -> Result<CustomerInfo, ProviderError>;

    /// Clears the SDK-side session back to anonymous.
    async fn log_out(&self) -> Result<(), ProviderError>;

    /// Fetches the current customer snapshot for the active session.
    async fn customer_info(&self) -> Result<CustomerInfo, ProviderError>;

    /// Fetches the products currently offered for sale.
    async fn offerings(&self) -> Result<Vec<ProductRef>, ProviderError>;

    /// Starts the purchase flow for a product.
    ///
    /// A user abandoning the store sheet yields [`ProviderError::Cancelled`],
    /// which callers must treat as a non-error outcome.
    async fn purchase(&self, product: &ProductRef) -> Result<CustomerInfo, ProviderError>;

    /// Restores previous purchases for the active session.
    async fn restore(&self) -> Result<CustomerInfo, ProviderError>;

    /// Registers for asynchronous entitlement updates (renewals, external
    /// cancellations). Each pushed snapshot must go through the same
    /// reconciliation path as a manual refresh.
    fn updates(&self) -> mpsc::UnboundedReceiver<CustomerInfo>;
}

/// Errors from the purchase SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// SDK used before a successful `configure` call.
    #[error("purchase service not configured")]
    NotConfigured,

    /// Network connectivity issue.
    #[error("purchase service network error: {0}")]
    Network(String),

    /// The service rejected the call.
    #[error("purchase service error: {0}")]
    Service(String),

    /// The user dismissed the purchase flow. Not a failure.
    #[error("purchase cancelled by user")]
    Cancelled,
}

impl ProviderError {
    /// Returns true if this is the user backing out, not a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn PurchaseProvider) {}
    }

    #[test]
    fn cancellation_is_distinguished_from_failure() {
        assert!(ProviderError::Cancelled.is_cancellation());
        assert!(!ProviderError::Network("timeout".to_string()).is_cancellation());
        assert!(!ProviderError::NotConfigured.is_cancellation());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::Service("invalid key".to_string());
        assert_eq!(err.to_string(), "purchase service error: invalid key");
    }

    #[test]
    fn product_ref_serializes() {
        let product = ProductRef {
            product_id: "mhm_monthly".to_string(),
            plan: PlanType::Monthly,
        };
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("mhm_monthly"));
        assert!(json.contains("monthly"));
    }
}
