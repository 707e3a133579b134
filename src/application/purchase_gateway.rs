//! Purchase gateway: the error-absorbing wrapper around the purchase SDK.
//!
//! The SDK is an optional injected capability. The gateway owns the
//! configure-once lifecycle (tracked by the [`SessionPhase`] state machine)
//! and converts every provider error into a definite return value: `None`,
//! an empty list, or an explicit outcome enum. Nothing past this boundary
//! ever sees a provider error.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::mpsc;

use crate::config::PurchasesConfig;
use crate::domain::foundation::{ExternalCustomerId, StateMachine};
use crate::domain::subscription::{CustomerInfo, SessionPhase};
use crate::ports::{ProductRef, PurchaseProvider};

/// Outcome of a purchase attempt as presented to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The purchase went through; the snapshot reflects the new entitlement.
    Completed(CustomerInfo),

    /// The user backed out of the store sheet. Not an error, no alert.
    Cancelled,

    /// The purchase failed; the message is suitable for display.
    Failed(String),
}

/// Outcome of a restore attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Restore completed; the snapshot carries whatever was found.
    Restored(CustomerInfo),

    /// Restore failed; the message is suitable for display.
    Failed(String),
}

/// Error-absorbing facade over an optional [`PurchaseProvider`].
pub struct PurchaseGateway {
    provider: Option<Arc<dyn PurchaseProvider>>,
    platform_key: SecretString,
    phase: SessionPhase,
}

impl PurchaseGateway {
    /// Creates a gateway around an optional provider capability.
    ///
    /// Passing `None` (simulators, test builds) makes every query return
    /// its absent value and configuration report failure once.
    pub fn new(provider: Option<Arc<dyn PurchaseProvider>>, config: &PurchasesConfig) -> Self {
        Self {
            provider,
            platform_key: config.platform_key(),
            phase: SessionPhase::Uninitialized,
        }
    }

    /// Current purchase-service phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Configures the purchase SDK, at most once per session.
    ///
    /// Returns whether the service is usable. Re-entry after success is a
    /// cheap cached `true`; after failure the phase is terminal and the
    /// session stays on the backend-only signal.
    pub async fn configure(&mut self) -> bool {
        match self.phase {
            SessionPhase::Ready => return true,
            SessionPhase::ConfigFailed => return false,
            SessionPhase::Uninitialized | SessionPhase::Configuring => {}
        }

        self.transition(SessionPhase::Configuring);

        let Some(provider) = self.provider.clone() else {
            tracing::warn!("Purchase service unavailable; entitlements degrade to backend signal");
            self.transition(SessionPhase::ConfigFailed);
            return false;
        };

        match provider.configure(&self.platform_key).await {
            Ok(()) => {
                tracing::info!("Purchase service configured");
                self.transition(SessionPhase::Ready);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Purchase service configuration failed");
                self.transition(SessionPhase::ConfigFailed);
                false
            }
        }
    }

    /// Binds the provider session to the given identity.
    ///
    /// `None` when the service is unavailable or the call failed; the
    /// manager then reconciles without a purchase-service signal.
    pub async fn log_in(&self, customer_id: &ExternalCustomerId) -> Option<CustomerInfo> {
        let provider = self.available_provider()?;
        match provider.log_in(customer_id).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, customer_id = %customer_id, "Purchase service login failed");
                None
            }
        }
    }

    /// Clears the provider session back to anonymous.
    pub async fn log_out(&self) {
        let Some(provider) = self.available_provider() else {
            return;
        };
        if let Err(e) = provider.log_out().await {
            tracing::warn!(error = %e, "Purchase service logout failed");
        }
    }

    /// Fetches the current customer snapshot, absorbing errors into `None`.
    pub async fn customer_info(&self) -> Option<CustomerInfo> {
        let provider = self.available_provider()?;
        match provider.customer_info().await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, "Customer info fetch failed");
                None
            }
        }
    }

    /// Fetches the products offered for sale; empty on any failure.
    pub async fn offerings(&self) -> Vec<ProductRef> {
        let Some(provider) = self.available_provider() else {
            return Vec::new();
        };
        match provider.offerings().await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(error = %e, "Offerings fetch failed");
                Vec::new()
            }
        }
    }

    /// Runs the purchase flow for a product on behalf of the bound identity.
    ///
    /// The provider session is verified against `expected` first; on
    /// mismatch one corrective re-login runs before the purchase so an
    /// entitlement can never be charged to a stale identity.
    pub async fn purchase(
        &self,
        product: &ProductRef,
        expected: &ExternalCustomerId,
    ) -> PurchaseOutcome {
        let Some(provider) = self.available_provider() else {
            return PurchaseOutcome::Failed("Purchases are not available right now".to_string());
        };

        if !self.session_matches(expected).await {
            if let Err(e) = provider.log_in(expected).await {
                tracing::warn!(error = %e, "Corrective re-login before purchase failed");
                return PurchaseOutcome::Failed(
                    "Could not verify your account. Please try again".to_string(),
                );
            }
        }

        match provider.purchase(product).await {
            Ok(info) => PurchaseOutcome::Completed(info),
            Err(e) if e.is_cancellation() => {
                tracing::debug!(product_id = %product.product_id, "Purchase cancelled by user");
                PurchaseOutcome::Cancelled
            }
            Err(e) => {
                tracing::warn!(error = %e, product_id = %product.product_id, "Purchase failed");
                PurchaseOutcome::Failed("The purchase could not be completed".to_string())
            }
        }
    }

    /// Restores previous purchases for the bound identity.
    pub async fn restore(&self, expected: &ExternalCustomerId) -> RestoreOutcome {
        let Some(provider) = self.available_provider() else {
            return RestoreOutcome::Failed("Purchases are not available right now".to_string());
        };

        if !self.session_matches(expected).await {
            if let Err(e) = provider.log_in(expected).await {
                tracing::warn!(error = %e, "Corrective re-login before restore failed");
                return RestoreOutcome::Failed(
                    "Could not verify your account. Please try again".to_string(),
                );
            }
        }

        match provider.restore().await {
            Ok(info) => RestoreOutcome::Restored(info),
            Err(e) => {
                tracing::warn!(error = %e, "Restore failed");
                RestoreOutcome::Failed("Purchases could not be restored".to_string())
            }
        }
    }

    /// Subscribes to asynchronous entitlement pushes, if the service is up.
    pub fn updates(&self) -> Option<mpsc::UnboundedReceiver<CustomerInfo>> {
        self.available_provider().map(|p| p.updates())
    }

    fn available_provider(&self) -> Option<Arc<dyn PurchaseProvider>> {
        if !self.phase.purchase_service_available() {
            return None;
        }
        self.provider.clone()
    }

    async fn session_matches(&self, expected: &ExternalCustomerId) -> bool {
        match self.customer_info().await {
            Some(info) => info.is_for(expected),
            None => false,
        }
    }

    fn transition(&mut self, target: SessionPhase) {
        match self.phase.transition_to(target) {
            Ok(next) => {
                tracing::debug!(from = ?self.phase, to = ?next, "Session phase transition");
                self.phase = next;
            }
            Err(e) => {
                tracing::warn!(error = %e, from = ?self.phase, to = ?target, "Invalid phase transition ignored");
            }
        }
    }
}
