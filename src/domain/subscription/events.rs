//! Events driving re-reconciliation.
//!
//! Rather than polling a stored token on an interval, every state change
//! is an explicit event routed through the subscription manager's single
//! reconciliation path.

use super::CustomerInfo;
use crate::domain::foundation::{AuthToken, UserId};

/// An event that requires the subscription state to be recomputed.
#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    /// A local user logged in (or the app restarted with a session).
    LoggedIn {
        user_id: UserId,
        token: AuthToken,
    },

    /// The local user logged out.
    LoggedOut,

    /// A screen explicitly asked for a refresh.
    RefreshRequested,

    /// The purchase service pushed an updated customer snapshot
    /// (renewal, external cancellation, purchase on another device).
    ProviderUpdate(CustomerInfo),
}

impl SubscriptionEvent {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            SubscriptionEvent::LoggedIn { .. } => "logged_in",
            SubscriptionEvent::LoggedOut => "logged_out",
            SubscriptionEvent::RefreshRequested => "refresh_requested",
            SubscriptionEvent::ProviderUpdate(_) => "provider_update",
        }
    }
}
