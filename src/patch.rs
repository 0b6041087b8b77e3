//! Sparse override records applied to a TLD revision.
//!
//! Every field of [`TldPatch`] defaults to "leave the old value alone".
//! Fields that can be cleared use the tri-state [`Override`], so that an
//! explicit clear is distinguishable from absence.

use crate::core::{start_of_time, ScheduleOverride, Transition};
use crate::money::{CurrencyUnit, Money};
use crate::tld::{TldState, TldType};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Textual sentinel that clears a nullable field.
pub const NULL_SENTINEL: &str = "null";

/// Tri-state override for a nullable field.
#[derive(Clone, Debug, PartialEq)]
pub enum Override<T> {
    /// Keep the old value
    Keep,

    /// Replace the old value
    Set(T),

    /// Remove the old value
    Clear,
}

impl<T> Default for Override<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> Override<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Merge with the old value.
    pub fn apply(self, old: Option<T>) -> Option<T> {
        match self {
            Self::Keep => old,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }

    /// The value being set, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl Override<String> {
    /// Interpret a raw flag value, mapping [`NULL_SENTINEL`] to `Clear`.
    ///
    /// ```rust
    /// use tld_timetable::patch::Override;
    ///
    /// assert_eq!(Override::parse_nullable("null"), Override::Clear);
    /// assert_eq!(
    ///     Override::parse_nullable("madmax2030"),
    ///     Override::Set("madmax2030".to_string())
    /// );
    /// ```
    pub fn parse_nullable(raw: &str) -> Self {
        if raw == NULL_SENTINEL {
            Self::Clear
        } else {
            Self::Set(raw.to_string())
        }
    }
}

/// Edit of an ordered name list: either a full replacement or add/remove
/// deltas against the old list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListEdit {
    pub replace: Option<Vec<String>>,
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl ListEdit {
    pub fn replace<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replace: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn add<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            add: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn remove<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            remove: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Replacement mixed with deltas is ambiguous.
    pub fn is_conflicting(&self) -> bool {
        self.replace.is_some() && !(self.add.is_empty() && self.remove.is_empty())
    }

    /// Merge with the old list, keeping first-seen order and dropping
    /// duplicates. Returns `None` when the edit is conflicting.
    pub fn apply(&self, old: &[String]) -> Option<Vec<String>> {
        if self.is_conflicting() {
            return None;
        }
        let base = self.replace.as_deref().unwrap_or(old);
        let merged = base
            .iter()
            .chain(self.add.iter())
            .filter(|name| !self.remove.contains(*name))
            .cloned();
        Some(dedup_in_order(merged))
    }
}

/// Drop repeated names, keeping the first occurrence.
pub(crate) fn dedup_in_order<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// All optional overrides for one create or update.
///
/// `Option` fields are plain "absent or set"; [`Override`] fields can also be
/// cleared. Schedules take a [`ScheduleOverride`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TldPatch {
    pub currency: Option<CurrencyUnit>,
    pub roid_suffix: Option<String>,
    pub tld_type: Option<TldType>,

    pub tld_state_transitions: ScheduleOverride<TldState>,
    pub renew_billing_cost_transitions: ScheduleOverride<Money>,
    pub eap_fee_schedule: ScheduleOverride<Money>,

    pub create_billing_cost: Option<Money>,
    pub restore_billing_cost: Option<Money>,
    pub server_status_change_billing_cost: Option<Money>,
    pub registry_lock_or_unlock_billing_cost: Option<Money>,

    pub escrow_enabled: Option<bool>,
    /// `Some(false)` pauses DNS publishing.
    pub dns_enabled: Option<bool>,
    pub invoicing_enabled: Option<bool>,

    pub add_grace_period: Option<Duration>,
    pub redemption_grace_period: Option<Duration>,
    pub pending_delete_length: Option<Duration>,
    pub automatic_transfer_length: Option<Duration>,

    pub drive_folder_id: Override<String>,
    pub lordn_username: Override<String>,
    pub premium_list: Override<String>,

    pub dns_writers: Option<Vec<String>>,
    pub reserved_lists: ListEdit,
    pub allowed_registrants: ListEdit,
    pub allowed_nameservers: ListEdit,
    /// `Clear` removes every default token.
    pub default_tokens: Override<Vec<String>>,
    /// Raw table names; normalized and checked during staging. `Clear` falls
    /// back to the registry default tables.
    pub idn_tables: Override<Vec<String>>,

    pub claims_period_end: Option<DateTime<Utc>>,
    pub num_dns_publish_locks: Option<u32>,
    pub dns_a_plus_aaaa_ttl: Option<Duration>,
    pub dns_ns_ttl: Option<Duration>,
    pub dns_ds_ttl: Option<Duration>,
}

impl TldPatch {
    /// Seed the state schedule of a new TLD with `state` for all of time.
    pub fn initial_tld_state(mut self, state: TldState) -> Self {
        self.tld_state_transitions.append_one = Some(Transition::at_start_of_time(state));
        self
    }

    /// Schedule a state change at `now` on an existing TLD.
    pub fn current_tld_state(mut self, state: TldState, now: DateTime<Utc>) -> Self {
        self.tld_state_transitions.append_one = Some(Transition::new(now, state));
        self
    }

    /// Seed the renew cost schedule of a new TLD.
    pub fn initial_renew_billing_cost(mut self, cost: Money) -> Self {
        self.renew_billing_cost_transitions.append_one =
            Some(Transition::new(start_of_time(), cost));
        self
    }

    /// Whether this patch changes the TLD's identity.
    pub fn alters_identity(&self) -> bool {
        self.roid_suffix.is_some()
    }
}
