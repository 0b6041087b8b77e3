//! Building a new TLD revision from an old one plus a patch.
//!
//! [`stage`] is pure: it reads the old revision, the patch and the
//! [`StagingContext`], and either returns the complete new revision or every
//! violation found. Nothing is persisted here.

use crate::core::{start_of_time, Schedule, ScheduleValue};
use crate::enforcement::rules::{self, Checked};
use crate::enforcement::{NamingPolicy, StagingContext, Violation, Warning};
use crate::patch::{dedup_in_order, Override, TldPatch};
use crate::tld::Tld;
use stillwater::validation::Validation;
use thiserror::Error;
use tracing::{debug, warn};

/// A validated revision ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct StagedRevision {
    /// The revision the change was computed against; `None` on create.
    pub old: Option<Tld>,
    pub new: Tld,
    pub warnings: Vec<Warning>,
}

/// Every reason a TLD (or a whole batch) could not be staged.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Cannot stage TLD '{tld}': {}", summarize(.violations))]
pub struct Rejection {
    pub tld: String,
    pub violations: Vec<Violation>,
}

impl Rejection {
    pub fn new(tld: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            tld: tld.into(),
            violations,
        }
    }

    /// Whether any violation matches `predicate`.
    pub fn has(&self, predicate: impl Fn(&Violation) -> bool) -> bool {
        self.violations.iter().any(predicate)
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Gathers violations from checks that may still yield a value.
#[derive(Default)]
struct Violations(Vec<Violation>);

impl Violations {
    fn take<T>(&mut self, checked: Checked<T>) -> Option<T> {
        match checked {
            Validation::Success(value) => Some(value),
            Validation::Failure(errors) => {
                self.0.extend(errors.iter().cloned());
                None
            }
        }
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

fn first_value<V: ScheduleValue>(schedule: &Schedule<V>) -> V {
    schedule.lookup(start_of_time()).clone()
}

/// Stage the revision of `tld` that results from applying `patch` to `old`.
///
/// `old` is the stored revision, if any. A create on an existing name or an
/// update on a missing one stops right away; otherwise every rule runs and
/// all violations are reported together.
pub fn stage(
    tld: &str,
    old: Option<&Tld>,
    patch: &TldPatch,
    ctx: &StagingContext<'_>,
) -> Result<StagedRevision, Rejection> {
    debug!(tld = %tld, kind = ?ctx.kind, "Staging TLD revision");

    let name_check = rules::canonical_name(tld);
    let existence = rules::existence(ctx.kind, tld, old.is_some());
    if existence.is_failure() {
        let mut found = Violations::default();
        found.take(Validation::all_vec(vec![name_check, existence]));
        return Err(Rejection::new(tld, found.0));
    }

    let currency = patch
        .currency
        .or_else(|| old.map(|o| o.currency))
        .or_else(|| patch.create_billing_cost.map(|cost| cost.currency()))
        .unwrap_or(ctx.config.default_currency);

    let mut new = match old {
        Some(old) => old.clone(),
        None => Tld::with_defaults(tld, currency, ctx.config, ctx.now),
    };
    new.currency = currency;

    let mut found = Violations::default();

    let tld_states = rules::schedule(
        "tld_state_transitions",
        patch.tld_state_transitions.clone(),
        old.map(|o| &o.tld_state_transitions),
        first_value(&new.tld_state_transitions),
    );
    if let Some(schedule) = found.take(tld_states) {
        new.tld_state_transitions = schedule;
    }

    let renew_costs = rules::schedule(
        "renew_billing_cost_transitions",
        patch.renew_billing_cost_transitions.clone(),
        old.map(|o| &o.renew_billing_cost_transitions),
        first_value(&new.renew_billing_cost_transitions),
    );
    if let Some(schedule) = found.take(renew_costs) {
        new.renew_billing_cost_transitions = schedule;
    }

    let eap_fees = rules::schedule(
        "eap_fee_schedule",
        patch.eap_fee_schedule.clone(),
        old.map(|o| &o.eap_fee_schedule),
        first_value(&new.eap_fee_schedule),
    );
    if let Some(schedule) = found.take(eap_fees) {
        new.eap_fee_schedule = schedule;
    }

    set(&mut new.create_billing_cost, &patch.create_billing_cost);
    set(&mut new.restore_billing_cost, &patch.restore_billing_cost);
    set(
        &mut new.server_status_change_billing_cost,
        &patch.server_status_change_billing_cost,
    );
    set(
        &mut new.registry_lock_or_unlock_billing_cost,
        &patch.registry_lock_or_unlock_billing_cost,
    );

    set(&mut new.tld_type, &patch.tld_type);
    set(&mut new.escrow_enabled, &patch.escrow_enabled);
    set(&mut new.invoicing_enabled, &patch.invoicing_enabled);
    if let Some(enabled) = patch.dns_enabled {
        new.dns_paused = !enabled;
    }

    set(&mut new.add_grace_period, &patch.add_grace_period);
    set(&mut new.redemption_grace_period, &patch.redemption_grace_period);
    set(&mut new.pending_delete_length, &patch.pending_delete_length);
    set(&mut new.automatic_transfer_length, &patch.automatic_transfer_length);
    set(&mut new.num_dns_publish_locks, &patch.num_dns_publish_locks);

    if patch.roid_suffix.is_some() {
        new.roid_suffix = patch.roid_suffix.clone();
    }
    if patch.claims_period_end.is_some() {
        new.claims_period_end = patch.claims_period_end;
    }
    if patch.dns_a_plus_aaaa_ttl.is_some() {
        new.dns_a_plus_aaaa_ttl = patch.dns_a_plus_aaaa_ttl;
    }
    if patch.dns_ns_ttl.is_some() {
        new.dns_ns_ttl = patch.dns_ns_ttl;
    }
    if patch.dns_ds_ttl.is_some() {
        new.dns_ds_ttl = patch.dns_ds_ttl;
    }

    new.drive_folder_id = patch.drive_folder_id.clone().apply(new.drive_folder_id.take());
    new.lordn_username = patch.lordn_username.clone().apply(new.lordn_username.take());
    new.premium_list_name = patch.premium_list.clone().apply(new.premium_list_name.take());

    if let Some(writers) = &patch.dns_writers {
        new.dns_writers = writers.iter().cloned().collect();
    }
    if let Some(lists) = patch.reserved_lists.apply(&new.reserved_list_names) {
        new.reserved_list_names = lists;
    }
    if let Some(ids) = patch
        .allowed_registrants
        .apply(&new.allowed_registrant_contact_ids)
    {
        new.allowed_registrant_contact_ids = ids;
    }
    if let Some(hosts) = patch
        .allowed_nameservers
        .apply(&new.allowed_fully_qualified_host_names)
    {
        new.allowed_fully_qualified_host_names = hosts;
    }

    match &patch.default_tokens {
        Override::Keep => {}
        Override::Set(tokens) => new.default_promo_tokens = dedup_in_order(tokens.iter().cloned()),
        Override::Clear => new.default_promo_tokens.clear(),
    }
    match &patch.idn_tables {
        Override::Keep => {}
        Override::Set(raw) => {
            if let Some(tables) = found.take(rules::idn_tables(raw)) {
                new.idn_tables = tables;
            }
        }
        Override::Clear => new.idn_tables.clear(),
    }

    let checks = vec![
        name_check,
        rules::list_edits(patch),
        rules::known_references(patch, currency, &ctx.catalogs),
        rules::costs(&new),
        rules::dns_writers_present(ctx.kind, &new),
    ];
    found.take(Validation::all_vec(checks));

    let mut warnings = Vec::new();

    let naming = rules::reserved_list_naming(
        tld,
        &new.reserved_list_names,
        &ctx.config.shared_reserved_list_prefix,
    );
    match (naming, ctx.naming) {
        (Validation::Failure(errors), NamingPolicy::WarnOnly) => {
            for violation in errors.iter() {
                if let Violation::NamingConventionViolation { tld, names } = violation {
                    warn!(tld = %tld, lists = ?names, "Overriding reserved list naming rules");
                    warnings.push(Warning::NamingConventionOverridden {
                        tld: tld.clone(),
                        names: names.clone(),
                    });
                }
            }
        }
        (naming, _) => {
            found.take(naming);
        }
    }

    let renew_count = new.renew_billing_cost_transitions.transitions().len();
    if !patch.renew_billing_cost_transitions.is_empty() && renew_count > 1 {
        warn!(tld = %tld, count = renew_count, "Multiple renew cost transitions are not supported by invoicing");
        warnings.push(Warning::MultipleRenewCostTransitions {
            tld: tld.to_string(),
            count: renew_count,
        });
    }

    if !found.0.is_empty() {
        return Err(Rejection::new(tld, found.0));
    }

    Ok(StagedRevision {
        old: old.cloned(),
        new,
        warnings,
    })
}
