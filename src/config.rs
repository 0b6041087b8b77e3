//! Registry-wide defaults used when staging revisions.

use crate::money::CurrencyUnit;
use crate::tld::TldState;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DAY: u64 = 24 * 60 * 60;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse registry config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid registry config: {0}")]
    Invalid(String),
}

/// Default costs of a new TLD, in whole units of the TLD's currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCosts {
    pub create: i64,
    pub restore: i64,
    pub renew: i64,
    pub eap_fee: i64,
    pub server_status_change: i64,
    pub registry_lock_or_unlock: i64,
}

impl Default for DefaultCosts {
    fn default() -> Self {
        Self {
            create: 8,
            restore: 100,
            renew: 8,
            eap_fee: 0,
            server_status_change: 20,
            registry_lock_or_unlock: 0,
        }
    }
}

/// Default domain lifecycle periods of a new TLD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPeriods {
    pub add_grace_period: Duration,
    pub redemption_grace_period: Duration,
    pub pending_delete_length: Duration,
    pub automatic_transfer_length: Duration,
}

impl Default for DefaultPeriods {
    fn default() -> Self {
        Self {
            add_grace_period: Duration::from_secs(5 * DAY),
            redemption_grace_period: Duration::from_secs(30 * DAY),
            pending_delete_length: Duration::from_secs(5 * DAY),
            automatic_transfer_length: Duration::from_secs(5 * DAY),
        }
    }
}

/// Registry configuration.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use tld_timetable::config::RegistryConfig;
/// use tld_timetable::money::CurrencyUnit;
///
/// let config = RegistryConfig::from_json(r#"{ "default_currency": "JPY" }"#).unwrap();
/// assert_eq!(config.default_currency, CurrencyUnit::Jpy);
/// assert_eq!(config.shared_reserved_list_prefix, "common_");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reserved lists with this prefix may be applied to any TLD.
    pub shared_reserved_list_prefix: String,
    pub default_currency: CurrencyUnit,
    pub default_tld_state: TldState,
    pub premium_pricing_engine: String,
    pub num_dns_publish_locks: u32,
    pub default_costs: DefaultCosts,
    pub default_periods: DefaultPeriods,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            shared_reserved_list_prefix: "common_".to_string(),
            default_currency: CurrencyUnit::Usd,
            default_tld_state: TldState::Predelegation,
            premium_pricing_engine: "StaticPremiumListPricingEngine".to_string(),
            num_dns_publish_locks: 1,
            default_costs: DefaultCosts::default(),
            default_periods: DefaultPeriods::default(),
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.shared_reserved_list_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "shared_reserved_list_prefix must not be empty".to_string(),
            ));
        }
        if self.num_dns_publish_locks == 0 {
            return Err(ConfigError::Invalid(
                "num_dns_publish_locks must be at least 1".to_string(),
            ));
        }
        let costs = &self.default_costs;
        let negative = [
            ("create", costs.create),
            ("restore", costs.restore),
            ("renew", costs.renew),
            ("eap_fee", costs.eap_fee),
            ("server_status_change", costs.server_status_change),
            ("registry_lock_or_unlock", costs.registry_lock_or_unlock),
        ]
        .into_iter()
        .find(|(_, amount)| *amount < 0);
        if let Some((name, amount)) = negative {
            return Err(ConfigError::Invalid(format!(
                "default {name} cost cannot be negative: {amount}"
            )));
        }
        Ok(())
    }
}
