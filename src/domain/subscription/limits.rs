//! Free-tier limit policy.
//!
//! Pure, stateless functions mapping the reconciled subscription state and
//! current item counts to allow/deny decisions. Premium is unlimited for
//! every resource kind; the free tier has a fixed positive limit per kind.

use serde::{Deserialize, Serialize};

use super::{SubscriptionState, SubscriptionStatus};

/// Bounded resource kinds of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Horses,
    Riders,
    Suppliers,
    Competitions,
    Palmares,
    Expenses,
    Reminders,
    PhotosPerItem,
}

impl ResourceKind {
    /// All resource kinds, for iteration.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Horses,
        ResourceKind::Riders,
        ResourceKind::Suppliers,
        ResourceKind::Competitions,
        ResourceKind::Palmares,
        ResourceKind::Expenses,
        ResourceKind::Reminders,
        ResourceKind::PhotosPerItem,
    ];

    /// Returns the display name for this resource kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Horses => "Horses",
            ResourceKind::Riders => "Riders",
            ResourceKind::Suppliers => "Suppliers",
            ResourceKind::Competitions => "Competitions",
            ResourceKind::Palmares => "Palmares",
            ResourceKind::Expenses => "Expenses",
            ResourceKind::Reminders => "Reminders",
            ResourceKind::PhotosPerItem => "Photos per item",
        }
    }
}

/// Free-tier limits per resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeLimits {
    pub horses: u32,
    pub riders: u32,
    pub suppliers: u32,
    pub competitions: u32,
    pub palmares: u32,
    pub expenses: u32,
    pub reminders: u32,
    pub photos_per_item: u32,
}

impl FreeLimits {
    /// Returns the free-tier limit for a resource kind.
    pub fn limit(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Horses => self.horses,
            ResourceKind::Riders => self.riders,
            ResourceKind::Suppliers => self.suppliers,
            ResourceKind::Competitions => self.competitions,
            ResourceKind::Palmares => self.palmares,
            ResourceKind::Expenses => self.expenses,
            ResourceKind::Reminders => self.reminders,
            ResourceKind::PhotosPerItem => self.photos_per_item,
        }
    }
}

impl Default for FreeLimits {
    fn default() -> Self {
        Self {
            horses: 2,
            riders: 3,
            suppliers: 3,
            competitions: 5,
            palmares: 5,
            expenses: 10,
            reminders: 10,
            photos_per_item: 3,
        }
    }
}

/// Returns true if the user may add one more item of the given kind.
///
/// Premium users may always add more; free users are bounded by the
/// per-kind limit.
pub fn can_add_more(
    state: &SubscriptionState,
    limits: &FreeLimits,
    kind: ResourceKind,
    current_count: u32,
) -> bool {
    if state.is_premium {
        return true;
    }
    current_count < limits.limit(kind)
}

/// Returns true if the upgrade popup should be shown for the given kind.
///
/// Always false while subscription status is still loading, so users are
/// never blocked before the first reconciliation pass has produced a result.
pub fn should_show_limit_popup(
    status: &SubscriptionStatus,
    limits: &FreeLimits,
    kind: ResourceKind,
    current_count: u32,
) -> bool {
    let state = match status.state() {
        None => return false,
        Some(state) => state,
    };
    if state.is_premium {
        return false;
    }
    current_count >= limits.limit(kind)
}

/// Current item counts across all bounded resource kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub horses: u32,
    pub riders: u32,
    pub suppliers: u32,
    pub competitions: u32,
    pub palmares: u32,
    pub expenses: u32,
    pub reminders: u32,
    pub photos_per_item: u32,
}

impl ResourceCounts {
    /// Returns the current count for a resource kind.
    pub fn count(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Horses => self.horses,
            ResourceKind::Riders => self.riders,
            ResourceKind::Suppliers => self.suppliers,
            ResourceKind::Competitions => self.competitions,
            ResourceKind::Palmares => self.palmares,
            ResourceKind::Expenses => self.expenses,
            ResourceKind::Reminders => self.reminders,
            ResourceKind::PhotosPerItem => self.photos_per_item,
        }
    }

    /// Resource kinds whose free-tier limit is currently exhausted.
    pub fn blocked_kinds(&self, state: &SubscriptionState, limits: &FreeLimits) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| !can_add_more(state, limits, *kind, self.count(*kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::{PlanType, PremiumSource};
    use proptest::prelude::*;

    fn premium_state() -> SubscriptionState {
        SubscriptionState {
            is_premium: true,
            active_product_id: Some("mhm_annual".to_string()),
            plan_type: PlanType::Annual,
            renewal_date: None,
            will_renew: true,
            premium_source: PremiumSource::PurchaseService,
            is_admin: false,
        }
    }

    #[test]
    fn premium_can_always_add_more() {
        let limits = FreeLimits::default();
        assert!(can_add_more(&premium_state(), &limits, ResourceKind::Horses, 0));
        assert!(can_add_more(&premium_state(), &limits, ResourceKind::Horses, 10_000));
    }

    #[test]
    fn free_under_limit_can_add() {
        let limits = FreeLimits::default();
        let state = SubscriptionState::free();
        // Boundary: one below the limit is allowed.
        assert!(can_add_more(&state, &limits, ResourceKind::Horses, limits.horses - 1));
    }

    #[test]
    fn free_at_limit_cannot_add() {
        let limits = FreeLimits::default();
        let state = SubscriptionState::free();
        assert!(!can_add_more(&state, &limits, ResourceKind::Horses, limits.horses));
        assert!(!can_add_more(&state, &limits, ResourceKind::Horses, limits.horses + 1));
    }

    #[test]
    fn popup_suppressed_while_loading() {
        let limits = FreeLimits::default();
        // Even far over the limit, no popup before the first reconciliation.
        assert!(!should_show_limit_popup(
            &SubscriptionStatus::Loading,
            &limits,
            ResourceKind::Reminders,
            1_000,
        ));
    }

    #[test]
    fn popup_suppressed_for_premium() {
        let limits = FreeLimits::default();
        let status = SubscriptionStatus::Resolved(premium_state());
        assert!(!should_show_limit_popup(&status, &limits, ResourceKind::Horses, 1_000));
    }

    #[test]
    fn popup_shown_for_free_at_limit() {
        let limits = FreeLimits::default();
        let status = SubscriptionStatus::Resolved(SubscriptionState::free());
        assert!(should_show_limit_popup(&status, &limits, ResourceKind::Horses, limits.horses));
        assert!(!should_show_limit_popup(
            &status,
            &limits,
            ResourceKind::Horses,
            limits.horses - 1
        ));
    }

    #[test]
    fn all_free_limits_are_positive() {
        let limits = FreeLimits::default();
        for kind in ResourceKind::ALL {
            assert!(limits.limit(kind) > 0, "{:?} limit must be positive", kind);
        }
    }

    #[test]
    fn blocked_kinds_lists_exhausted_resources() {
        let limits = FreeLimits::default();
        let counts = ResourceCounts {
            horses: limits.horses,
            reminders: limits.reminders + 2,
            ..Default::default()
        };

        let blocked = counts.blocked_kinds(&SubscriptionState::free(), &limits);
        assert_eq!(blocked, vec![ResourceKind::Horses, ResourceKind::Reminders]);
    }

    #[test]
    fn blocked_kinds_empty_for_premium() {
        let limits = FreeLimits::default();
        let counts = ResourceCounts {
            horses: 100,
            riders: 100,
            ..Default::default()
        };
        assert!(counts.blocked_kinds(&premium_state(), &limits).is_empty());
    }

    proptest! {
        #[test]
        fn premium_is_never_limited(count in 0u32..u32::MAX) {
            let limits = FreeLimits::default();
            for kind in ResourceKind::ALL {
                prop_assert!(can_add_more(&premium_state(), &limits, kind, count));
            }
        }

        #[test]
        fn free_allow_iff_under_limit(count in 0u32..100) {
            let limits = FreeLimits::default();
            let state = SubscriptionState::free();
            for kind in ResourceKind::ALL {
                prop_assert_eq!(
                    can_add_more(&state, &limits, kind, count),
                    count < limits.limit(kind)
                );
            }
        }

        #[test]
        fn popup_complements_can_add_for_resolved_free(count in 0u32..100) {
            let limits = FreeLimits::default();
            let state = SubscriptionState::free();
            let status = SubscriptionStatus::Resolved(state.clone());
            for kind in ResourceKind::ALL {
                prop_assert_eq!(
                    should_show_limit_popup(&status, &limits, kind, count),
                    !can_add_more(&state, &limits, kind, count)
                );
            }
        }
    }
}
