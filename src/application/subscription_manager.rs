//! Subscription manager: single owner of the reconciled subscription state.
//!
//! Event-driven orchestration over the identity binder, the purchase
//! gateway and the backend status fetcher. All methods take `&mut self` and
//! are awaited sequentially, so every state change flows through the one
//! reconciliation path and the last write wins; there is no partial merge.
//!
//! Init ordering is strict: configure, then login (or an anonymous
//! snapshot), then offerings, then the backend check, then one
//! reconciliation commit.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::domain::foundation::AuthToken;
use crate::domain::subscription::{
    can_add_more, reconcile, should_show_limit_popup, CustomerInfo, FreeLimits, ProductCatalog,
    ReconcileInputs, ResourceKind, SessionPhase, SubscriptionEvent, SubscriptionState,
    SubscriptionStatus,
};
use crate::ports::{ProductRef, PurchaseProvider, SubscriptionStatusFetcher};

use super::identity_binder::{BindOutcome, IdentityBinder};
use super::purchase_gateway::{PurchaseGateway, PurchaseOutcome, RestoreOutcome};
use crate::domain::foundation::UserId;
use crate::ports::IdentityStore;

/// Authenticated backend session handed over by the auth layer.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: UserId,
    pub token: AuthToken,
}

/// Owns and recomputes the authoritative [`SubscriptionState`].
pub struct SubscriptionManager {
    gateway: PurchaseGateway,
    fetcher: Arc<dyn SubscriptionStatusFetcher>,
    binder: IdentityBinder,
    catalog: ProductCatalog,
    limits: FreeLimits,
    token: Option<AuthToken>,
    inputs: ReconcileInputs,
    offerings: Vec<ProductRef>,
    status: SubscriptionStatus,
}

impl SubscriptionManager {
    /// Wires the manager from its collaborators and configuration.
    pub fn new(
        provider: Option<Arc<dyn PurchaseProvider>>,
        fetcher: Arc<dyn SubscriptionStatusFetcher>,
        identity_store: Arc<dyn IdentityStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            gateway: PurchaseGateway::new(provider, &config.purchases),
            fetcher,
            binder: IdentityBinder::new(identity_store),
            catalog: config.purchases.catalog(),
            limits: FreeLimits::default(),
            token: None,
            inputs: ReconcileInputs::default(),
            offerings: Vec::new(),
            status: SubscriptionStatus::Loading,
        }
    }

    /// Runs the startup sequence and commits the first reconciled state.
    ///
    /// Until this completes the status stays [`SubscriptionStatus::Loading`]
    /// and limit popups are suppressed.
    pub async fn initialize(&mut self, session: Option<AuthSession>) {
        self.binder.restore().await;
        self.gateway.configure().await;

        match session {
            Some(AuthSession { user_id, token }) => {
                self.token = Some(token);
                let outcome = self.binder.bind(&user_id).await;
                if let BindOutcome::Switched { previous, .. } = &outcome {
                    tracing::info!(previous = %previous, next = %user_id,
                        "Cached identity differs from session; clearing previous provider session");
                    self.gateway.log_out().await;
                }
                let external_id = outcome.external_id().clone();
                if let Some(info) = self.gateway.log_in(&external_id).await {
                    if info.is_for(&external_id) {
                        self.inputs.customer_info = Some(info);
                    }
                }
            }
            None => {
                // Unauthenticated sessions query anonymously, read-only.
                self.inputs.customer_info = self.gateway.customer_info().await;
            }
        }

        self.offerings = self.gateway.offerings().await;
        self.refresh_backend().await;
        self.commit();
    }

    /// Routes an event into the reconciliation path.
    pub async fn handle_event(&mut self, event: SubscriptionEvent) {
        tracing::debug!(event = event.name(), "Handling subscription event");
        match event {
            SubscriptionEvent::LoggedIn { user_id, token } => {
                self.token = Some(token);
                let outcome = self.binder.bind(&user_id).await;
                if let BindOutcome::Switched { previous, .. } = &outcome {
                    // Logout of the previous user before the new login so
                    // entitlements can never bleed across accounts.
                    tracing::info!(previous = %previous, next = %user_id, "User switch");
                    self.gateway.log_out().await;
                    self.inputs = ReconcileInputs::default();
                }
                let external_id = outcome.external_id().clone();
                if let Some(info) = self.gateway.log_in(&external_id).await {
                    if info.is_for(&external_id) {
                        self.inputs.customer_info = Some(info);
                    }
                }
                self.refresh_backend().await;
                self.commit();
            }
            SubscriptionEvent::LoggedOut => {
                self.gateway.log_out().await;
                self.binder.unbind().await;
                self.token = None;
                self.inputs = ReconcileInputs::default();
                self.commit();
            }
            SubscriptionEvent::RefreshRequested => {
                self.refresh().await;
            }
            SubscriptionEvent::ProviderUpdate(info) => {
                self.accept_pushed_snapshot(info);
            }
        }
    }

    /// Re-fetches both signal sources and recomputes the state.
    pub async fn refresh(&mut self) {
        self.refresh_customer_info().await;
        self.refresh_backend().await;
        self.commit();
    }

    /// Runs the purchase flow for a product.
    ///
    /// Anonymous sessions cannot purchase; a completed purchase commits the
    /// returned snapshot immediately instead of waiting for a push.
    pub async fn purchase(&mut self, product: &ProductRef) -> PurchaseOutcome {
        let Some(external_id) = self.binder.external_id() else {
            return PurchaseOutcome::Failed("Sign in to subscribe".to_string());
        };

        let outcome = self.gateway.purchase(product, &external_id).await;
        if let PurchaseOutcome::Completed(info) = &outcome {
            if info.is_for(&external_id) {
                self.inputs.customer_info = Some(info.clone());
                self.commit();
            }
        }
        outcome
    }

    /// Restores previous purchases for the bound identity.
    pub async fn restore(&mut self) -> RestoreOutcome {
        let Some(external_id) = self.binder.external_id() else {
            return RestoreOutcome::Failed("Sign in to restore purchases".to_string());
        };

        let outcome = self.gateway.restore(&external_id).await;
        if let RestoreOutcome::Restored(info) = &outcome {
            if info.is_for(&external_id) {
                self.inputs.customer_info = Some(info.clone());
                self.commit();
            }
        }
        outcome
    }

    /// Subscribes to provider pushes; feed received snapshots back through
    /// [`SubscriptionEvent::ProviderUpdate`].
    pub fn update_stream(&self) -> Option<mpsc::UnboundedReceiver<CustomerInfo>> {
        self.gateway.updates()
    }

    /// The current subscription status as consumed by screens.
    pub fn status(&self) -> &SubscriptionStatus {
        &self.status
    }

    /// The reconciled state, once the first pass has committed.
    pub fn state(&self) -> Option<&SubscriptionState> {
        self.status.state()
    }

    /// Whether the current session has premium access.
    pub fn is_premium(&self) -> bool {
        self.status.is_premium()
    }

    /// Purchase-service phase of this session.
    pub fn phase(&self) -> SessionPhase {
        self.gateway.phase()
    }

    /// Products currently offered for sale, as fetched at init.
    pub fn offerings(&self) -> &[ProductRef] {
        &self.offerings
    }

    /// The free-tier limits in effect.
    pub fn limits(&self) -> &FreeLimits {
        &self.limits
    }

    /// Returns true if one more item of the given kind may be added.
    ///
    /// While the status is still loading this is permissive; enforcement
    /// belongs to [`Self::should_show_limit_popup`], which is suppressed
    /// until the first pass commits.
    pub fn can_add(&self, kind: ResourceKind, current_count: u32) -> bool {
        match self.status.state() {
            None => true,
            Some(state) => can_add_more(state, &self.limits, kind, current_count),
        }
    }

    /// Returns true if the upgrade popup should be shown for the kind.
    pub fn should_show_limit_popup(&self, kind: ResourceKind, current_count: u32) -> bool {
        should_show_limit_popup(&self.status, &self.limits, kind, current_count)
    }

    async fn refresh_customer_info(&mut self) {
        let Some(info) = self.gateway.customer_info().await else {
            // Transport failure or unavailable service: keep the last-known
            // snapshot rather than downgrading mid-session.
            return;
        };

        let Some(external_id) = self.binder.external_id() else {
            self.inputs.customer_info = Some(info);
            return;
        };

        if info.is_for(&external_id) {
            self.inputs.customer_info = Some(info);
            return;
        }

        // Data fetched for a foreign identity is never trusted. One
        // corrective re-login with the bound identity, then give up for
        // this pass and keep the last-known snapshot.
        tracing::warn!(
            session_user = %info.app_user_id,
            bound_user = %external_id,
            "Provider session drifted from bound identity; re-logging in"
        );
        match self.gateway.log_in(&external_id).await {
            Some(relogged) if relogged.is_for(&external_id) => {
                self.inputs.customer_info = Some(relogged);
            }
            _ => {
                tracing::warn!("Corrective re-login did not yield data for the bound identity");
            }
        }
    }

    async fn refresh_backend(&mut self) {
        match self.fetcher.fetch(self.token.as_ref()).await {
            Ok(backend) => self.inputs.backend = backend,
            Err(e) => {
                // Error is a sentinel, not a downgrade: keep the last-known
                // backend signal.
                tracing::warn!(error = %e, "Backend status fetch failed; retaining last-known signal");
            }
        }
    }

    fn accept_pushed_snapshot(&mut self, info: CustomerInfo) {
        match self.binder.external_id() {
            Some(external_id) if info.is_for(&external_id) => {
                self.inputs.customer_info = Some(info);
                self.commit();
            }
            Some(_) => {
                // Push originated under a binding that no longer holds.
                tracing::debug!(
                    app_user_id = %info.app_user_id,
                    "Discarding pushed snapshot for a different identity"
                );
            }
            None => {
                tracing::debug!("Discarding pushed snapshot while unbound");
            }
        }
    }

    fn commit(&mut self) {
        let state = reconcile(&self.inputs, &self.catalog);
        tracing::info!(
            is_premium = state.is_premium,
            source = ?state.premium_source,
            plan = %state.plan_type,
            "Subscription state reconciled"
        );
        self.status = SubscriptionStatus::Resolved(state);
    }
}
