//! Plan classification against the known product catalog.
//!
//! Product identifiers are matched with exact equality against a closed set
//! resolved once at startup. An unrecognized identifier classifies as
//! `PlanType::None` even when the entitlement itself is active: plan type is
//! informational only and never gates access.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Billing plan of the active product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Monthly subscription.
    Monthly,

    /// Annual subscription.
    Annual,

    /// No recognized plan (free, admin-granted, or unknown product id).
    None,
}

impl PlanType {
    /// Returns the display name for this plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanType::Monthly => "Monthly",
            PlanType::Annual => "Annual",
            PlanType::None => "None",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Known product and entitlement identifiers, resolved once.
///
/// Replaces the scattered string-literal checks of earlier revisions with a
/// single configured set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    /// Product ids sold as monthly plans.
    pub monthly_product_ids: Vec<String>,

    /// Product ids sold as annual plans.
    pub annual_product_ids: Vec<String>,

    /// Entitlement names the dashboard is known to grant.
    ///
    /// Used for diagnostics only; any active entitlement counts as premium
    /// regardless of its name.
    pub entitlement_ids: Vec<String>,
}

static DEFAULT_CATALOG: Lazy<ProductCatalog> = Lazy::new(|| ProductCatalog {
    monthly_product_ids: vec!["mhm_monthly".to_string()],
    annual_product_ids: vec!["mhm_annual".to_string()],
    entitlement_ids: vec!["premium".to_string()],
});

impl ProductCatalog {
    /// Creates a catalog from configured identifier sets.
    pub fn new(
        monthly_product_ids: Vec<String>,
        annual_product_ids: Vec<String>,
        entitlement_ids: Vec<String>,
    ) -> Self {
        Self {
            monthly_product_ids,
            annual_product_ids,
            entitlement_ids,
        }
    }

    /// The built-in catalog of shipped product ids.
    pub fn builtin() -> &'static ProductCatalog {
        &DEFAULT_CATALOG
    }

    /// Classifies a product identifier using exact (not substring) equality.
    pub fn classify(&self, product_id: &str) -> PlanType {
        if self.monthly_product_ids.iter().any(|id| id == product_id) {
            PlanType::Monthly
        } else if self.annual_product_ids.iter().any(|id| id == product_id) {
            PlanType::Annual
        } else {
            PlanType::None
        }
    }

    /// Returns true if the entitlement name is one the catalog knows about.
    pub fn is_known_entitlement(&self, name: &str) -> bool {
        self.entitlement_ids.iter().any(|id| id == name)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}
