//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PurchaseProvider` - The third-party purchase/entitlement SDK,
//!   injected as an optional capability at startup
//! - `SubscriptionStatusFetcher` - Backend admin/manual premium signal
//! - `IdentityStore` - Local persisted identity cache

mod identity_store;
mod purchase_provider;
mod status_fetcher;

pub use identity_store::{IdentityStore, IdentityStoreError};
pub use purchase_provider::{ProductRef, ProviderError, PurchaseProvider};
pub use status_fetcher::{StatusFetchError, SubscriptionStatusFetcher};
