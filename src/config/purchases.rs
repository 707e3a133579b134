//! Purchase-service configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::subscription::ProductCatalog;

fn default_monthly_product_ids() -> Vec<String> {
    ProductCatalog::builtin().monthly_product_ids.clone()
}

fn default_annual_product_ids() -> Vec<String> {
    ProductCatalog::builtin().annual_product_ids.clone()
}

fn default_entitlement_ids() -> Vec<String> {
    ProductCatalog::builtin().entitlement_ids.clone()
}

/// Purchase-service configuration (platform key and product catalog)
#[derive(Debug, Clone, Deserialize)]
pub struct PurchasesConfig {
    /// Platform-specific purchase SDK API key
    pub platform_key: String,

    /// Product ids sold as monthly plans
    #[serde(default = "default_monthly_product_ids")]
    pub monthly_product_ids: Vec<String>,

    /// Product ids sold as annual plans
    #[serde(default = "default_annual_product_ids")]
    pub annual_product_ids: Vec<String>,

    /// Entitlement names granted on the purchase-service dashboard
    #[serde(default = "default_entitlement_ids")]
    pub entitlement_ids: Vec<String>,
}

impl Default for PurchasesConfig {
    fn default() -> Self {
        Self {
            platform_key: String::new(),
            monthly_product_ids: default_monthly_product_ids(),
            annual_product_ids: default_annual_product_ids(),
            entitlement_ids: default_entitlement_ids(),
        }
    }
}

impl PurchasesConfig {
    /// Returns the platform key wrapped as a secret.
    pub fn platform_key(&self) -> SecretString {
        SecretString::new(self.platform_key.clone())
    }

    /// Builds the product catalog from the configured identifier sets.
    pub fn catalog(&self) -> ProductCatalog {
        ProductCatalog::new(
            self.monthly_product_ids.clone(),
            self.annual_product_ids.clone(),
            self.entitlement_ids.clone(),
        )
    }

    /// Validate purchase-service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.platform_key.is_empty() {
            return Err(ValidationError::MissingRequired("PURCHASES_PLATFORM_KEY"));
        }

        // Platform keys are issued per store; verify the prefix for safety
        if !self.platform_key.starts_with("appl_") && !self.platform_key.starts_with("goog_") {
            return Err(ValidationError::InvalidPlatformKey);
        }

        if self.monthly_product_ids.is_empty() && self.annual_product_ids.is_empty() {
            return Err(ValidationError::EmptyProductCatalog);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PlanType;

    fn valid_config() -> PurchasesConfig {
        PurchasesConfig {
            platform_key: "appl_abcd1234".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_missing_platform_key() {
        let config = PurchasesConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_invalid_key_prefix() {
        let config = PurchasesConfig {
            platform_key: "sk_test_xxx".to_string(), // Wrong prefix
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPlatformKey)
        ));
    }

    #[test]
    fn test_validation_accepts_both_store_prefixes() {
        for key in ["appl_xyz", "goog_xyz"] {
            let config = PurchasesConfig {
                platform_key: key.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "rejected {key}");
        }
    }

    #[test]
    fn test_validation_empty_catalog() {
        let config = PurchasesConfig {
            platform_key: "appl_xyz".to_string(),
            monthly_product_ids: vec![],
            annual_product_ids: vec![],
            entitlement_ids: vec![],
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyProductCatalog)
        ));
    }

    #[test]
    fn test_catalog_uses_configured_ids() {
        let config = PurchasesConfig {
            platform_key: "appl_xyz".to_string(),
            monthly_product_ids: vec!["custom_month".to_string()],
            ..Default::default()
        };
        let catalog = config.catalog();
        assert_eq!(catalog.classify("custom_month"), PlanType::Monthly);
        assert_eq!(catalog.classify("mhm_monthly"), PlanType::None);
    }

    #[test]
    fn test_default_catalog_matches_builtin() {
        assert_eq!(valid_config().catalog(), *ProductCatalog::builtin());
    }
}
