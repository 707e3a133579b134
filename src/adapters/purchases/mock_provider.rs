//! Mock purchase provider for testing.
//!
//! Configurable implementation of `PurchaseProvider` for unit and
//! integration tests. Supports:
//! - Pre-seeded customer snapshots per app user id
//! - Error and cancellation injection (global or per method)
//! - Call tracking for ordering assertions
//! - Simulated asynchronous entitlement pushes

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::mpsc;

use crate::domain::foundation::{ExternalCustomerId, Timestamp};
use crate::domain::subscription::{CustomerInfo, EntitlementInfo};
use crate::ports::{ProductRef, ProviderError, PurchaseProvider};

const ANONYMOUS_APP_USER_ID: &str = "$anonymous";

/// Mock purchase provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPurchaseProvider::new();
/// mock.seed_customer(premium_customer("usr_1"));
/// mock.fail_method("purchase", ProviderError::Cancelled);
///
/// let gateway = PurchaseGateway::new(Some(Arc::new(mock)), config);
/// ```
#[derive(Default, Clone)]
pub struct MockPurchaseProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Whether `configure` has succeeded.
    configured: bool,

    /// Force the next `configure` call to fail.
    configure_fails: bool,

    /// App user id the session is currently logged in as.
    current_user: Option<String>,

    /// Seeded customer snapshots by app user id.
    customers: HashMap<String, CustomerInfo>,

    /// Error to return on the next call to any method.
    next_error: Option<ProviderError>,

    /// Errors keyed by method name.
    method_errors: HashMap<String, ProviderError>,

    /// Products offered for sale.
    offerings: Vec<ProductRef>,

    /// Recorded calls, e.g. `"log_in(usr_1)"`.
    call_log: Vec<String>,

    /// Registered update listeners.
    update_senders: Vec<mpsc::UnboundedSender<CustomerInfo>>,
}

impl MockPurchaseProvider {
    /// Creates a mock with no seeded data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the snapshot returned for its `app_user_id`.
    pub fn seed_customer(&self, customer: CustomerInfo) {
        let id = customer.app_user_id.clone();
        self.lock().customers.insert(id, customer);
    }

    /// Sets the products returned by `offerings`.
    pub fn set_offerings(&self, offerings: Vec<ProductRef>) {
        self.lock().offerings = offerings;
    }

    /// Makes the next call to any method fail with the given error.
    pub fn fail_next(&self, error: ProviderError) {
        self.lock().next_error = Some(error);
    }

    /// Makes every call to a specific method fail with the given error.
    pub fn fail_method(&self, method: &str, error: ProviderError) {
        self.lock().method_errors.insert(method.to_string(), error);
    }

    /// Makes the next `configure` call fail.
    pub fn fail_configuration(&self) {
        self.lock().configure_fails = true;
    }

    /// Returns the recorded call log.
    pub fn calls(&self) -> Vec<String> {
        self.lock().call_log.clone()
    }

    /// Returns the app user id of the current session, if logged in.
    pub fn current_user(&self) -> Option<String> {
        self.lock().current_user.clone()
    }

    /// Simulates an asynchronous entitlement push to all listeners.
    pub fn push_update(&self, customer: CustomerInfo) {
        let mut state = self.lock();
        state
            .update_senders
            .retain(|sender| sender.send(customer.clone()).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().expect("mock state poisoned")
    }

    fn record(&self, call: impl Into<String>) {
        self.lock().call_log.push(call.into());
    }

    fn take_error(&self, method: &str) -> Option<ProviderError> {
        let mut state = self.lock();
        if let Some(error) = state.next_error.take() {
            return Some(error);
        }
        state.method_errors.get(method).cloned()
    }

    fn session_snapshot(&self) -> CustomerInfo {
        let state = self.lock();
        let id = state
            .current_user
            .clone()
            .unwrap_or_else(|| ANONYMOUS_APP_USER_ID.to_string());
        state
            .customers
            .get(&id)
            .cloned()
            .unwrap_or_else(|| CustomerInfo::empty(id))
    }
}

#[async_trait]
impl PurchaseProvider for MockPurchaseProvider {
    async fn configure(&self, _platform_key: &SecretString) -> Result<(), ProviderError> {
        self.record("configure");
        if let Some(error) = self.take_error("configure") {
            return Err(error);
        }
        let mut state = self.lock();
        if state.configure_fails {
            return Err(ProviderError::Service("invalid platform key".to_string()));
        }
        state.configured = true;
        Ok(())
    }

    async fn log_in(&self, customer_id: &ExternalCustomerId) -> Result<CustomerInfo, ProviderError> {
        self.record(format!("log_in({})", customer_id));
        if let Some(error) = self.take_error("log_in") {
            return Err(error);
        }
        if !self.lock().configured {
            return Err(ProviderError::NotConfigured);
        }
        self.lock().current_user = Some(customer_id.as_str().to_string());
        Ok(self.session_snapshot())
    }

    async fn log_out(&self) -> Result<(), ProviderError> {
        self.record("log_out");
        if let Some(error) = self.take_error("log_out") {
            return Err(error);
        }
        self.lock().current_user = None;
        Ok(())
    }

    async fn customer_info(&self) -> Result<CustomerInfo, ProviderError> {
        self.record("customer_info");
        if let Some(error) = self.take_error("customer_info") {
            return Err(error);
        }
        if !self.lock().configured {
            return Err(ProviderError::NotConfigured);
        }
        Ok(self.session_snapshot())
    }

    async fn offerings(&self) -> Result<Vec<ProductRef>, ProviderError> {
        self.record("offerings");
        if let Some(error) = self.take_error("offerings") {
            return Err(error);
        }
        Ok(self.lock().offerings.clone())
    }

    async fn purchase(&self, product: &ProductRef) -> Result<CustomerInfo, ProviderError> {
        self.record(format!("purchase({})", product.product_id));
        if let Some(error) = self.take_error("purchase") {
            return Err(error);
        }

        // Grant an entitlement for the purchased product on the session's
        // customer, mirroring what the real store would report back.
        let granted = EntitlementInfo {
            entitlement_id: "premium".to_string(),
            product_identifier: product.product_id.clone(),
            expiration_date: Some(Timestamp::now().add_days(30)),
            will_renew: true,
            is_active: true,
        };

        let mut snapshot = self.session_snapshot();
        snapshot.entitlements.push(granted);
        self.lock()
            .customers
            .insert(snapshot.app_user_id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn restore(&self) -> Result<CustomerInfo, ProviderError> {
        self.record("restore");
        if let Some(error) = self.take_error("restore") {
            return Err(error);
        }
        Ok(self.session_snapshot())
    }

    fn updates(&self) -> mpsc::UnboundedReceiver<CustomerInfo> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().update_senders.push(sender);
        receiver
    }
}
