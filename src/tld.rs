//! The TLD revision: an immutable snapshot of a registry policy object.
//!
//! A [`Tld`] holds three time-varying attributes as [`Schedule`]s plus scalar
//! configuration. Revisions are never edited; staging produces a new one.

use crate::config::RegistryConfig;
use crate::core::{Schedule, Transition};
use crate::money::{CurrencyUnit, Money};
use crate::registry_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

registry_enum! {
    /// Launch phase of a TLD.
    pub enum TldState {
        Predelegation => "PREDELEGATION",
        StartDateSunrise => "START_DATE_SUNRISE",
        QuietPeriod => "QUIET_PERIOD",
        GeneralAvailability => "GENERAL_AVAILABILITY",
        Pdt => "PDT",
    }
}

registry_enum! {
    /// Whether a TLD is live or only used for testing.
    pub enum TldType {
        Real => "REAL",
        Test => "TEST",
    }
}

registry_enum! {
    /// IDN tables a TLD may accept labels from.
    pub enum IdnTable {
        ExtendedLatin => "EXTENDED_LATIN",
        UnconfusableLatin => "UNCONFUSABLE_LATIN",
        Ja => "JA",
    }
}

/// One revision of a TLD's configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tld {
    pub tld_str: String,
    pub roid_suffix: Option<String>,
    pub tld_type: TldType,
    pub currency: CurrencyUnit,

    pub tld_state_transitions: Schedule<TldState>,
    pub renew_billing_cost_transitions: Schedule<Money>,
    pub eap_fee_schedule: Schedule<Money>,

    pub create_billing_cost: Money,
    pub restore_billing_cost: Money,
    pub server_status_change_billing_cost: Money,
    pub registry_lock_or_unlock_billing_cost: Money,

    pub escrow_enabled: bool,
    pub dns_paused: bool,
    pub invoicing_enabled: bool,

    pub add_grace_period: Duration,
    pub redemption_grace_period: Duration,
    pub pending_delete_length: Duration,
    pub automatic_transfer_length: Duration,

    pub drive_folder_id: Option<String>,
    pub lordn_username: Option<String>,
    pub premium_list_name: Option<String>,
    pub premium_pricing_engine: String,

    pub dns_writers: BTreeSet<String>,
    /// Insertion-ordered, without duplicates.
    pub reserved_list_names: Vec<String>,
    pub allowed_registrant_contact_ids: Vec<String>,
    pub allowed_fully_qualified_host_names: Vec<String>,
    /// Order decides which token wins when several apply.
    pub default_promo_tokens: Vec<String>,
    pub idn_tables: BTreeSet<IdnTable>,

    pub claims_period_end: Option<DateTime<Utc>>,
    pub num_dns_publish_locks: u32,
    pub dns_a_plus_aaaa_ttl: Option<Duration>,
    pub dns_ns_ttl: Option<Duration>,
    pub dns_ds_ttl: Option<Duration>,

    pub creation_time: DateTime<Utc>,
    /// Version assigned by the store; 0 until first written.
    pub revision: u64,
}

impl Tld {
    /// A new, never-stored TLD carrying the registry defaults in `currency`.
    pub fn with_defaults(
        tld_str: impl Into<String>,
        currency: CurrencyUnit,
        config: &RegistryConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let costs = &config.default_costs;
        let periods = &config.default_periods;
        Self {
            tld_str: tld_str.into(),
            roid_suffix: None,
            tld_type: TldType::Real,
            currency,
            tld_state_transitions: Schedule::constant(config.default_tld_state),
            renew_billing_cost_transitions: Schedule::constant(Money::of_major(
                currency,
                costs.renew,
            )),
            eap_fee_schedule: Schedule::constant(Money::of_major(currency, costs.eap_fee)),
            create_billing_cost: Money::of_major(currency, costs.create),
            restore_billing_cost: Money::of_major(currency, costs.restore),
            server_status_change_billing_cost: Money::of_major(
                currency,
                costs.server_status_change,
            ),
            registry_lock_or_unlock_billing_cost: Money::of_major(
                currency,
                costs.registry_lock_or_unlock,
            ),
            escrow_enabled: false,
            dns_paused: false,
            invoicing_enabled: false,
            add_grace_period: periods.add_grace_period,
            redemption_grace_period: periods.redemption_grace_period,
            pending_delete_length: periods.pending_delete_length,
            automatic_transfer_length: periods.automatic_transfer_length,
            drive_folder_id: None,
            lordn_username: None,
            premium_list_name: None,
            premium_pricing_engine: config.premium_pricing_engine.clone(),
            dns_writers: BTreeSet::new(),
            reserved_list_names: Vec::new(),
            allowed_registrant_contact_ids: Vec::new(),
            allowed_fully_qualified_host_names: Vec::new(),
            default_promo_tokens: Vec::new(),
            idn_tables: BTreeSet::new(),
            claims_period_end: None,
            num_dns_publish_locks: config.num_dns_publish_locks,
            dns_a_plus_aaaa_ttl: None,
            dns_ns_ttl: None,
            dns_ds_ttl: None,
            creation_time: now,
            revision: 0,
        }
    }

    /// Launch phase in effect at `at`.
    pub fn tld_state_at(&self, at: DateTime<Utc>) -> TldState {
        *self.tld_state_transitions.lookup(at)
    }

    /// Per-year renewal cost in effect at `at`.
    pub fn renew_cost_at(&self, at: DateTime<Utc>) -> Money {
        *self.renew_billing_cost_transitions.lookup(at)
    }

    /// Early-access fee in effect at `at`.
    pub fn eap_fee_at(&self, at: DateTime<Utc>) -> Money {
        *self.eap_fee_schedule.lookup(at)
    }

    /// The state change scheduled furthest in the future.
    pub fn last_state_transition(&self) -> Option<&Transition<TldState>> {
        self.tld_state_transitions.transitions().last()
    }
}
