//! The entitlement reconciliation algorithm.
//!
//! Recomputes the single authoritative [`SubscriptionState`] from all
//! current signal sources. Every pass starts from scratch; nothing from a
//! previous pass survives, so a cancelled subscription can never leave a
//! stale premium flag behind.
//!
//! Source precedence, first match wins:
//! admin > purchase_service > backend_manual > none.

use serde::{Deserialize, Serialize};

use super::{CustomerInfo, PlanType, PremiumSource, ProductCatalog, SubscriptionState};
use crate::domain::foundation::Timestamp;

/// Premium signals reported by the application backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend admin flag. Grants permanent premium.
    pub is_admin: bool,

    /// Manually granted premium flag.
    pub is_premium_manual: bool,

    /// Expiration of the manual grant, if any.
    pub expires_at: Option<Timestamp>,
}

impl BackendStatus {
    /// The all-false default used when unauthenticated or at cold start.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Everything a reconciliation pass looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileInputs {
    /// Latest trusted purchase-service snapshot, if any.
    pub customer_info: Option<CustomerInfo>,

    /// Latest known backend signals.
    pub backend: BackendStatus,
}

/// Recomputes the subscription state from the given inputs.
///
/// Pure and idempotent: identical inputs always produce an identical state.
pub fn reconcile(inputs: &ReconcileInputs, catalog: &ProductCatalog) -> SubscriptionState {
    if inputs.backend.is_admin {
        // Admin access is permanent and carries no renewal date.
        return SubscriptionState {
            is_premium: true,
            active_product_id: None,
            plan_type: PlanType::None,
            renewal_date: None,
            will_renew: false,
            premium_source: PremiumSource::Admin,
            is_admin: true,
        };
    }

    let selected = inputs
        .customer_info
        .as_ref()
        .and_then(|info| info.effective_entitlement());

    if let Some(entitlement) = selected {
        if !catalog.is_known_entitlement(&entitlement.entitlement_id) {
            tracing::debug!(
                entitlement_id = %entitlement.entitlement_id,
                "Active entitlement with unrecognized name; granting premium anyway"
            );
        }
        return SubscriptionState {
            is_premium: true,
            active_product_id: Some(entitlement.product_identifier.clone()),
            plan_type: catalog.classify(&entitlement.product_identifier),
            renewal_date: entitlement.expiration_date,
            will_renew: entitlement.will_renew,
            premium_source: PremiumSource::PurchaseService,
            is_admin: false,
        };
    }

    if inputs.backend.is_premium_manual {
        return SubscriptionState {
            is_premium: true,
            active_product_id: None,
            plan_type: PlanType::None,
            renewal_date: inputs.backend.expires_at,
            will_renew: false,
            premium_source: PremiumSource::BackendManual,
            is_admin: false,
        };
    }

    SubscriptionState::free()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::EntitlementInfo;
    use proptest::prelude::*;

    fn active(product: &str, expires: Option<&str>, will_renew: bool) -> EntitlementInfo {
        EntitlementInfo {
            entitlement_id: "premium".to_string(),
            product_identifier: product.to_string(),
            expiration_date: expires.map(|s| Timestamp::parse_rfc3339(s).unwrap()),
            will_renew,
            is_active: true,
        }
    }

    fn customer(entitlements: Vec<EntitlementInfo>) -> CustomerInfo {
        CustomerInfo {
            app_user_id: "usr_1".to_string(),
            entitlements,
        }
    }

    fn catalog() -> ProductCatalog {
        ProductCatalog::default()
    }

    #[test]
    fn no_signals_yields_free_state() {
        let state = reconcile(&ReconcileInputs::default(), &catalog());
        assert_eq!(state, SubscriptionState::free());
    }

    #[test]
    fn admin_grants_permanent_premium() {
        let inputs = ReconcileInputs {
            customer_info: None,
            backend: BackendStatus {
                is_admin: true,
                is_premium_manual: false,
                expires_at: None,
            },
        };
        let state = reconcile(&inputs, &catalog());

        assert!(state.is_premium);
        assert!(state.is_admin);
        assert!(state.renewal_date.is_none());
        assert_eq!(state.premium_source, PremiumSource::Admin);
    }

    #[test]
    fn admin_overrides_purchase_service_and_manual() {
        // Admin wins even when every other signal also grants premium, and
        // the renewal date stays absent.
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![active(
                "mhm_annual",
                Some("2026-06-01T00:00:00Z"),
                true,
            )])),
            backend: BackendStatus {
                is_admin: true,
                is_premium_manual: true,
                expires_at: Some(Timestamp::parse_rfc3339("2026-01-01T00:00:00Z").unwrap()),
            },
        };
        let state = reconcile(&inputs, &catalog());

        assert_eq!(state.premium_source, PremiumSource::Admin);
        assert!(state.renewal_date.is_none());
        assert!(state.active_product_id.is_none());
    }

    #[test]
    fn purchase_service_beats_backend_manual() {
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![active(
                "mhm_monthly",
                Some("2026-06-01T00:00:00Z"),
                true,
            )])),
            backend: BackendStatus {
                is_admin: false,
                is_premium_manual: true,
                expires_at: Some(Timestamp::parse_rfc3339("2027-01-01T00:00:00Z").unwrap()),
            },
        };
        let state = reconcile(&inputs, &catalog());

        assert_eq!(state.premium_source, PremiumSource::PurchaseService);
        assert_eq!(state.active_product_id.as_deref(), Some("mhm_monthly"));
        assert_eq!(
            state.renewal_date,
            Some(Timestamp::parse_rfc3339("2026-06-01T00:00:00Z").unwrap())
        );
    }

    #[test]
    fn entitlement_fields_flow_into_state() {
        // A expires 2025-01-01 renewing, B expires 2026-06-01 not renewing;
        // B is selected and its will_renew=false is reported.
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![
                active("mhm_monthly", Some("2025-01-01T00:00:00Z"), true),
                active("mhm_annual", Some("2026-06-01T00:00:00Z"), false),
            ])),
            backend: BackendStatus::none(),
        };
        let state = reconcile(&inputs, &catalog());

        assert!(state.is_premium);
        assert_eq!(state.active_product_id.as_deref(), Some("mhm_annual"));
        assert_eq!(state.plan_type, PlanType::Annual);
        assert_eq!(
            state.renewal_date,
            Some(Timestamp::parse_rfc3339("2026-06-01T00:00:00Z").unwrap())
        );
        assert!(!state.will_renew);
    }

    #[test]
    fn monthly_product_classifies_as_monthly() {
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![active(
                "mhm_monthly",
                Some("2026-06-01T00:00:00Z"),
                true,
            )])),
            backend: BackendStatus::none(),
        };
        let state = reconcile(&inputs, &catalog());
        assert_eq!(state.plan_type, PlanType::Monthly);
    }

    #[test]
    fn unknown_product_is_premium_with_plan_none() {
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![active(
                "unknown_sku",
                Some("2026-06-01T00:00:00Z"),
                true,
            )])),
            backend: BackendStatus::none(),
        };
        let state = reconcile(&inputs, &catalog());

        assert!(state.is_premium);
        assert_eq!(state.plan_type, PlanType::None);
        assert_eq!(state.active_product_id.as_deref(), Some("unknown_sku"));
    }

    #[test]
    fn backend_manual_grants_premium_with_expiration() {
        let expires = Timestamp::parse_rfc3339("2026-03-01T00:00:00Z").unwrap();
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![])),
            backend: BackendStatus {
                is_admin: false,
                is_premium_manual: true,
                expires_at: Some(expires),
            },
        };
        let state = reconcile(&inputs, &catalog());

        assert!(state.is_premium);
        assert_eq!(state.premium_source, PremiumSource::BackendManual);
        assert_eq!(state.renewal_date, Some(expires));
        assert!(!state.will_renew);
        assert!(state.active_product_id.is_none());
    }

    #[test]
    fn downgrade_does_not_survive_recompute() {
        // First pass grants premium from an entitlement; second pass with the
        // entitlement gone must fall all the way back to free.
        let premium_inputs = ReconcileInputs {
            customer_info: Some(customer(vec![active(
                "mhm_monthly",
                Some("2026-06-01T00:00:00Z"),
                true,
            )])),
            backend: BackendStatus::none(),
        };
        assert!(reconcile(&premium_inputs, &catalog()).is_premium);

        let downgraded_inputs = ReconcileInputs {
            customer_info: Some(customer(vec![])),
            backend: BackendStatus::none(),
        };
        assert_eq!(
            reconcile(&downgraded_inputs, &catalog()),
            SubscriptionState::free()
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let inputs = ReconcileInputs {
            customer_info: Some(customer(vec![
                active("mhm_monthly", Some("2025-01-01T00:00:00Z"), true),
                active("mhm_annual", None, false),
            ])),
            backend: BackendStatus {
                is_admin: false,
                is_premium_manual: true,
                expires_at: None,
            },
        };
        let first = reconcile(&inputs, &catalog());
        let second = reconcile(&inputs, &catalog());
        assert_eq!(first, second);
    }

    // Property tests over generated entitlement sets.

    fn arb_entitlement() -> impl Strategy<Value = EntitlementInfo> {
        (
            "[a-z]{3,8}",
            "[a-z_]{3,12}",
            proptest::option::of(0i64..3650),
            any::<bool>(),
        )
            .prop_map(|(name, product, expires_in_days, will_renew)| EntitlementInfo {
                entitlement_id: name,
                product_identifier: product,
                expiration_date: expires_in_days
                    .map(|d| Timestamp::parse_rfc3339("2025-01-01T00:00:00Z").unwrap().add_days(d)),
                will_renew,
                is_active: true,
            })
    }

    proptest! {
        #[test]
        fn selected_expiration_is_maximal(entitlements in proptest::collection::vec(arb_entitlement(), 1..8)) {
            let inputs = ReconcileInputs {
                customer_info: Some(customer(entitlements.clone())),
                backend: BackendStatus::none(),
            };
            let state = reconcile(&inputs, &catalog());
            prop_assert!(state.is_premium);

            if let Some(renewal) = state.renewal_date {
                for e in &entitlements {
                    if let Some(exp) = e.expiration_date {
                        prop_assert!(exp <= renewal);
                    }
                }
            } else {
                // Undated selection only happens when no entry is dated.
                prop_assert!(entitlements.iter().all(|e| e.expiration_date.is_none()));
            }
        }

        #[test]
        fn reconcile_identical_inputs_bitwise_equal(
            entitlements in proptest::collection::vec(arb_entitlement(), 0..6),
            is_admin in any::<bool>(),
            manual in any::<bool>(),
        ) {
            let inputs = ReconcileInputs {
                customer_info: Some(customer(entitlements)),
                backend: BackendStatus {
                    is_admin,
                    is_premium_manual: manual,
                    expires_at: None,
                },
            };
            prop_assert_eq!(reconcile(&inputs, &catalog()), reconcile(&inputs, &catalog()));
        }

        #[test]
        fn admin_invariant_holds(entitlements in proptest::collection::vec(arb_entitlement(), 0..6)) {
            let inputs = ReconcileInputs {
                customer_info: Some(customer(entitlements)),
                backend: BackendStatus {
                    is_admin: true,
                    is_premium_manual: false,
                    expires_at: None,
                },
            };
            let state = reconcile(&inputs, &catalog());
            prop_assert!(state.is_premium);
            prop_assert!(state.renewal_date.is_none());
        }
    }
}
