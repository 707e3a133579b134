//! Reconciled subscription state.
//!
//! One `SubscriptionState` exists per running session. It is entirely
//! recomputed by the reconciler on every pass, never patched field by field,
//! so a downgrade at any signal source can never leave a stale premium flag
//! behind.

use serde::{Deserialize, Serialize};

use super::PlanType;
use crate::domain::foundation::Timestamp;

/// Which signal is currently responsible for granting premium access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumSource {
    /// An active entitlement from the purchase service.
    PurchaseService,

    /// Backend admin flag. Permanent, never expires.
    Admin,

    /// Backend-issued manual premium grant.
    BackendManual,

    /// No premium access.
    None,
}

impl PremiumSource {
    /// Returns the display name shown on the subscription screen.
    pub fn display_name(&self) -> &'static str {
        match self {
            PremiumSource::PurchaseService => "Subscription",
            PremiumSource::Admin => "Administrator",
            PremiumSource::BackendManual => "Granted",
            PremiumSource::None => "Free",
        }
    }
}

/// The authoritative subscription state for the current session.
///
/// # Invariants
///
/// - `is_premium` is derived by the reconciler, never set directly by UI
/// - `is_admin == true` implies `is_premium == true` and no `renewal_date`
/// - `premium_source == PurchaseService` implies `renewal_date` mirrors the
///   selected entitlement's expiration
/// - `plan_type` is informational only and never gates access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionState {
    /// Whether the user is entitled to premium features.
    pub is_premium: bool,

    /// Product that granted entitlement, when premium comes from a purchase.
    pub active_product_id: Option<String>,

    /// Plan classification of the active product.
    pub plan_type: PlanType,

    /// Expiration/renewal instant of the active entitlement.
    pub renewal_date: Option<Timestamp>,

    /// Whether the active entitlement will auto-renew.
    pub will_renew: bool,

    /// Signal responsible for the premium grant.
    pub premium_source: PremiumSource,

    /// Whether the backend marked this user as an admin.
    pub is_admin: bool,
}

impl SubscriptionState {
    /// The free (non-premium) state. Also the cold-start default.
    pub fn free() -> Self {
        Self {
            is_premium: false,
            active_product_id: None,
            plan_type: PlanType::None,
            renewal_date: None,
            will_renew: false,
            premium_source: PremiumSource::None,
            is_admin: false,
        }
    }
}

impl Default for SubscriptionState {
    fn default() -> Self {
        Self::free()
    }
}

/// Process-wide view of the subscription state consumed by screens.
///
/// `Loading` until the first reconciliation pass commits; limit popups are
/// suppressed while loading so users are never blocked on a state that has
/// not been computed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// No reconciliation pass has completed yet.
    Loading,

    /// A reconciled state is available.
    Resolved(SubscriptionState),
}

impl SubscriptionStatus {
    /// Returns true while no reconciled state is available.
    pub fn is_loading(&self) -> bool {
        matches!(self, SubscriptionStatus::Loading)
    }

    /// Returns the reconciled state, if any.
    pub fn state(&self) -> Option<&SubscriptionState> {
        match self {
            SubscriptionStatus::Loading => None,
            SubscriptionStatus::Resolved(state) => Some(state),
        }
    }

    /// Returns true if a reconciled state exists and grants premium.
    pub fn is_premium(&self) -> bool {
        self.state().map(|s| s.is_premium).unwrap_or(false)
    }
}
