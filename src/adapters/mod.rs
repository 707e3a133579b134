//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `backend` - HTTP client for the backend subscription-status endpoint
//! - `identity` - File-backed and in-memory identity caches
//! - `purchases` - Purchase-provider test double

pub mod backend;
pub mod identity;
pub mod purchases;

pub use backend::BackendStatusClient;
pub use identity::{FileIdentityStore, InMemoryIdentityStore};
pub use purchases::MockPurchaseProvider;
