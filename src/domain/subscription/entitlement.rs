//! Purchase-service entitlement data and selection.
//!
//! Entitlements arrive from the purchase service keyed by name. A user may
//! hold several overlapping grants (e.g. migrated product ids); selection
//! picks the longest-lived one so the renewal date shown to the user matches
//! their effective access.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ExternalCustomerId, Timestamp};

/// A named grant of access from the purchase service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementInfo {
    /// Entitlement name as configured on the purchase-service dashboard.
    pub entitlement_id: String,

    /// Product that purchased this entitlement.
    pub product_identifier: String,

    /// Expiration instant; absent for lifetime/non-expiring grants.
    pub expiration_date: Option<Timestamp>,

    /// Whether the underlying subscription will auto-renew.
    pub will_renew: bool,

    /// Whether the purchase service currently considers the grant active.
    pub is_active: bool,
}

/// Snapshot of a purchase-service customer.
///
/// Entitlements are kept as a `Vec` rather than a map so encounter order is
/// preserved: the undated tie-break in [`select_effective`] is
/// first-encountered and must be stable across passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// App user id the purchase service has this data bound to.
    pub app_user_id: String,

    /// All entitlements, in the order the service reported them.
    pub entitlements: Vec<EntitlementInfo>,
}

impl CustomerInfo {
    /// Creates a snapshot with no entitlements for the given identity.
    pub fn empty(app_user_id: impl Into<String>) -> Self {
        Self {
            app_user_id: app_user_id.into(),
            entitlements: Vec::new(),
        }
    }

    /// Iterates over the active entitlements in encounter order.
    pub fn active_entitlements(&self) -> impl Iterator<Item = &EntitlementInfo> {
        self.entitlements.iter().filter(|e| e.is_active)
    }

    /// The entitlement that determines effective access, if any.
    pub fn effective_entitlement(&self) -> Option<&EntitlementInfo> {
        select_effective(self.active_entitlements())
    }

    /// Returns true if this snapshot belongs to the given identity.
    pub fn is_for(&self, id: &ExternalCustomerId) -> bool {
        self.app_user_id == id.as_str()
    }
}

/// Selects the effective entitlement among active entries.
///
/// The entry with the latest (furthest-future) expiration wins. Entries
/// without an expiration are chosen only when no dated entry exists,
/// tie-broken by first encounter. Ties on equal expirations also keep the
/// first-encountered entry.
pub fn select_effective<'a>(
    active: impl IntoIterator<Item = &'a EntitlementInfo>,
) -> Option<&'a EntitlementInfo> {
    let mut best_dated: Option<(&'a EntitlementInfo, Timestamp)> = None;
    let mut first_undated: Option<&'a EntitlementInfo> = None;

    for entitlement in active {
        match entitlement.expiration_date {
            Some(expiration) => {
                let replaces = match best_dated {
                    None => true,
                    Some((_, best)) => expiration.is_after(&best),
                };
                if replaces {
                    best_dated = Some((entitlement, expiration));
                }
            }
            None => {
                if first_undated.is_none() {
                    first_undated = Some(entitlement);
                }
            }
        }
    }

    best_dated.map(|(e, _)| e).or(first_undated)
}
