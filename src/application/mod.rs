//! Application layer: orchestration over the domain and the ports.
//!
//! The identity binder owns the user-to-customer mapping, the purchase
//! gateway owns the SDK lifecycle and error absorption, and the
//! subscription manager ties both to the backend fetcher and commits every
//! reconciled state.

mod identity_binder;
mod purchase_gateway;
mod subscription_manager;

pub use identity_binder::{BindOutcome, IdentityBinder};
pub use purchase_gateway::{PurchaseGateway, PurchaseOutcome, RestoreOutcome};
pub use subscription_manager::{AuthSession, SubscriptionManager};
