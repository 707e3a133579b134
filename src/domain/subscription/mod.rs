//! Subscription domain module.
//!
//! Merges the purchase-service, admin, and backend-manual premium signals
//! into one authoritative subscription state and derives free-tier limit
//! enforcement from it.
//!
//! # Module Structure
//!
//! - `state` - `SubscriptionState` and the process-wide status view
//! - `plan` - Plan classification against the known product catalog
//! - `entitlement` - Purchase-service entitlement data and selection
//! - `reconciler` - The reconciliation algorithm
//! - `lifecycle` - Session phase state machine
//! - `limits` - Free-tier limit policy
//! - `events` - Events driving re-reconciliation

mod entitlement;
mod events;
mod lifecycle;
mod limits;
mod plan;
mod reconciler;
mod state;

pub use entitlement::{select_effective, CustomerInfo, EntitlementInfo};
pub use events::SubscriptionEvent;
pub use lifecycle::SessionPhase;
pub use limits::{can_add_more, should_show_limit_popup, FreeLimits, ResourceCounts, ResourceKind};
pub use plan::{PlanType, ProductCatalog};
pub use reconciler::{reconcile, BackendStatus, ReconcileInputs};
pub use state::{PremiumSource, SubscriptionState, SubscriptionStatus};
