//! Purchase-provider adapters.
//!
//! The real store SDK lives in the mobile shell and is injected through the
//! `PurchaseProvider` port; this module carries the configurable test double.

mod mock_provider;

pub use mock_provider::MockPurchaseProvider;
