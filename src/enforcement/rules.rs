//! Staging rules using Validation.
//!
//! Each rule is a pure function returning a [`Check`]; callers combine them
//! with `Validation::all_vec` so one pass reports every violation.

use crate::catalog::{missing_names, Catalogs};
use crate::command::CommandKind;
use crate::core::{Schedule, ScheduleOverride, ScheduleValue};
use crate::enforcement::violations::{ReferenceKind, Violation};
use crate::identity::canonicalize_hostname;
use crate::money::{check_cost, check_cost_schedule, CostError, CurrencyUnit};
use crate::patch::{dedup_in_order, Override, TldPatch};
use crate::tld::{IdnTable, Tld};
use std::collections::BTreeSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of a rule that produces a value.
pub type Checked<T> = Validation<T, NonEmptyVec<Violation>>;

/// Outcome of a rule that only accepts or rejects.
pub type Check = Checked<()>;

/// Fold a list of violations into a single check.
pub fn from_violations(violations: Vec<Violation>) -> Check {
    let checks: Vec<Check> = violations.into_iter().map(Validation::fail).collect();
    Validation::all_vec(checks).map(|_| ())
}

/// The name must be non-empty, canonical, and must not start with a digit.
pub fn canonical_name(tld: &str) -> Check {
    if tld.is_empty() {
        return Validation::fail(Violation::InvalidIdentityFormat {
            tld: String::new(),
            reason: "TLD name cannot be empty".to_string(),
        });
    }

    let mut violations = Vec::new();
    match canonicalize_hostname(tld) {
        Ok(canonical) if canonical != tld => violations.push(Violation::NotCanonical {
            tld: tld.to_string(),
            canonical,
        }),
        Ok(_) => {}
        Err(error) => violations.push(Violation::InvalidIdentityFormat {
            tld: tld.to_string(),
            reason: error.reason,
        }),
    }
    if tld.starts_with(char::is_numeric) {
        violations.push(Violation::InvalidIdentityFormat {
            tld: tld.to_string(),
            reason: "TLDs cannot begin with a number".to_string(),
        });
    }
    from_violations(violations)
}

/// Create needs a fresh name; update needs an existing one.
pub fn existence(kind: CommandKind, tld: &str, exists: bool) -> Check {
    match (kind, exists) {
        (CommandKind::Create, true) => Validation::fail(Violation::AlreadyExists {
            tld: tld.to_string(),
        }),
        (CommandKind::Update, false) => Validation::fail(Violation::NotFound {
            tld: tld.to_string(),
        }),
        _ => Validation::success(()),
    }
}

/// Every name may appear only once in a batch.
pub fn unique_names(names: &[String]) -> Check {
    let mut seen: Vec<&String> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            if !duplicates.contains(name) {
                duplicates.push(name.clone());
            }
        } else {
            seen.push(name);
        }
    }

    if duplicates.is_empty() {
        Validation::success(())
    } else {
        Validation::fail(Violation::DuplicateInput { names: duplicates })
    }
}

/// Identity-altering changes and creation work on one TLD at a time.
pub fn single_identity(kind: CommandKind, names: &[String], patch: &TldPatch) -> Check {
    let mut violations = Vec::new();
    if names.len() > 1 && patch.alters_identity() {
        violations.push(Violation::BatchIdentityConflict {
            reason: "Can't update roid suffixes on multiple TLDs simultaneously".to_string(),
        });
    }
    if names.len() > 1 && kind == CommandKind::Create {
        violations.push(Violation::BatchIdentityConflict {
            reason: "Can't create more than one TLD at a time".to_string(),
        });
    }
    from_violations(violations)
}

/// A list edit is either a full replacement or a set of deltas.
pub fn list_edits(patch: &TldPatch) -> Check {
    let edits = [
        ("reserved_lists", &patch.reserved_lists),
        ("allowed_registrants", &patch.allowed_registrants),
        ("allowed_nameservers", &patch.allowed_nameservers),
    ];
    let violations = edits
        .into_iter()
        .filter(|(_, edit)| edit.is_conflicting())
        .map(|(field, _)| Violation::ConflictingListEdit { field })
        .collect();
    from_violations(violations)
}

/// Every resource the patch names must exist, and a premium list must be
/// priced in the TLD's currency.
pub fn known_references(patch: &TldPatch, currency: CurrencyUnit, catalogs: &Catalogs<'_>) -> Check {
    let mut violations = Vec::new();

    if let Override::Set(name) = &patch.premium_list {
        match catalogs.premium_lists.resolve(name) {
            None => violations.push(Violation::UnknownReference {
                kind: ReferenceKind::PremiumList,
                names: vec![name.clone()],
            }),
            Some(list) if list.currency != currency => violations.push(Violation::Cost {
                field: "premium_list",
                source: CostError::CurrencyMismatch {
                    expected: currency,
                    found: list.currency,
                },
            }),
            Some(_) => {}
        }
    }

    let reserved: Vec<String> = patch
        .reserved_lists
        .replace
        .iter()
        .flatten()
        .chain(patch.reserved_lists.add.iter())
        .cloned()
        .collect();
    push_missing(
        &mut violations,
        ReferenceKind::ReservedList,
        missing_names(catalogs.reserved_lists, &reserved),
    );

    if let Some(writers) = &patch.dns_writers {
        push_missing(
            &mut violations,
            ReferenceKind::DnsWriter,
            missing_names(catalogs.dns_writers, writers),
        );
    }

    if let Override::Set(tokens) = &patch.default_tokens {
        push_missing(
            &mut violations,
            ReferenceKind::AllocationToken,
            missing_names(catalogs.allocation_tokens, tokens),
        );
    }

    from_violations(violations)
}

fn push_missing(violations: &mut Vec<Violation>, kind: ReferenceKind, names: Vec<String>) {
    if !names.is_empty() {
        violations.push(Violation::UnknownReference { kind, names });
    }
}

/// Reserved lists must carry the shared prefix or the TLD's own prefix.
///
/// Offenders are reported together, in input order.
pub fn reserved_list_naming(tld: &str, names: &[String], shared_prefix: &str) -> Check {
    let own_prefix = format!("{tld}_");
    let offenders: Vec<String> = names
        .iter()
        .filter(|name| !name.starts_with(shared_prefix) && !name.starts_with(&own_prefix))
        .cloned()
        .collect();

    if offenders.is_empty() {
        Validation::success(())
    } else {
        Validation::fail(Violation::NamingConventionViolation {
            tld: tld.to_string(),
            names: offenders,
        })
    }
}

/// Normalize raw IDN table names and check them against [`IdnTable::ALL`].
pub fn idn_tables(raw: &[String]) -> Checked<BTreeSet<IdnTable>> {
    // A lone empty entry clears the tables; an empty entry among others is invalid.
    if matches!(raw, [only] if only.is_empty()) {
        return Validation::success(BTreeSet::new());
    }
    let values = dedup_in_order(raw.iter().map(|name| name.to_uppercase()));

    let mut tables = BTreeSet::new();
    let mut invalid = Vec::new();
    for value in &values {
        match value.parse::<IdnTable>() {
            Ok(table) => {
                tables.insert(table);
            }
            Err(_) => invalid.push(value.clone()),
        }
    }

    if invalid.is_empty() {
        Validation::success(tables)
    } else {
        Validation::fail(Violation::InvalidEnumValue {
            field: "idn_tables",
            values,
            invalid,
            domain: IdnTable::domain(),
        })
    }
}

/// Resolve and apply one schedule override.
pub fn schedule<V: ScheduleValue>(
    field: &'static str,
    update: ScheduleOverride<V>,
    base: Option<&Schedule<V>>,
    default: V,
) -> Checked<Schedule<V>> {
    match update.resolve().and_then(|u| u.apply(base, default)) {
        Ok(schedule) => Validation::success(schedule),
        Err(source) => Validation::fail(Violation::Schedule { field, source }),
    }
}

/// Every cost of the revision is in its currency and non-negative.
pub fn costs(candidate: &Tld) -> Check {
    let currency = candidate.currency;
    let schedules = [
        ("renew_billing_cost_transitions", &candidate.renew_billing_cost_transitions),
        ("eap_fee_schedule", &candidate.eap_fee_schedule),
    ];
    let scalars = [
        ("create_billing_cost", &candidate.create_billing_cost),
        ("restore_billing_cost", &candidate.restore_billing_cost),
        (
            "server_status_change_billing_cost",
            &candidate.server_status_change_billing_cost,
        ),
        (
            "registry_lock_or_unlock_billing_cost",
            &candidate.registry_lock_or_unlock_billing_cost,
        ),
    ];

    let schedule_errors = schedules
        .into_iter()
        .filter_map(|(field, s)| check_cost_schedule(s, currency).err().map(|e| (field, e)));
    let scalar_errors = scalars
        .into_iter()
        .filter_map(|(field, m)| check_cost(m, currency).err().map(|e| (field, e)));

    let violations = schedule_errors
        .chain(scalar_errors)
        .map(|(field, source)| Violation::Cost { field, source })
        .collect();
    from_violations(violations)
}

/// A created TLD must publish through at least one DNS writer.
pub fn dns_writers_present(kind: CommandKind, candidate: &Tld) -> Check {
    if kind == CommandKind::Create && candidate.dns_writers.is_empty() {
        Validation::fail(Violation::MissingDnsWriter)
    } else {
        Validation::success(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AllocationToken, DnsWriter, PremiumList, ReservedList, StaticCatalog};
    use crate::config::RegistryConfig;
    use crate::core::{ScheduleError, Transition};
    use crate::money::Money;
    use crate::patch::ListEdit;
    use crate::tld::TldState;
    use chrono::{TimeZone, Utc};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn violations<T>(result: Checked<T>) -> Vec<Violation> {
        match result {
            Validation::Failure(errors) => errors.iter().cloned().collect(),
            Validation::Success(_) => Vec::new(),
        }
    }

    struct Fixture {
        premium: StaticCatalog<PremiumList>,
        reserved: StaticCatalog<ReservedList>,
        tokens: StaticCatalog<AllocationToken>,
        writers: StaticCatalog<DnsWriter>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                premium: StaticCatalog::from_resources([PremiumList {
                    name: "xn--q9jyb4c".to_string(),
                    currency: CurrencyUnit::Usd,
                }]),
                reserved: StaticCatalog::from_resources([ReservedList {
                    name: "common_abuse".to_string(),
                }]),
                tokens: StaticCatalog::from_resources([AllocationToken {
                    token: "abc123".to_string(),
                }]),
                writers: StaticCatalog::from_resources([DnsWriter {
                    name: "VoidDnsWriter".to_string(),
                }]),
            }
        }

        fn catalogs(&self) -> Catalogs<'_> {
            Catalogs {
                premium_lists: &self.premium,
                reserved_lists: &self.reserved,
                allocation_tokens: &self.tokens,
                dns_writers: &self.writers,
            }
        }
    }

    #[test]
    fn canonical_name_accumulates_all_problems() {
        let found = violations(canonical_name("1Foo"));

        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .any(|v| matches!(v, Violation::NotCanonical { canonical, .. } if canonical == "1foo")));
        assert!(found
            .iter()
            .any(|v| matches!(v, Violation::InvalidIdentityFormat { .. })));
    }

    #[test]
    fn canonical_name_rejects_empty_and_accepts_punycode() {
        assert!(matches!(
            violations(canonical_name("")).as_slice(),
            [Violation::InvalidIdentityFormat { .. }]
        ));
        assert!(canonical_name("xn--q9jyb4c").is_success());
        assert!(canonical_name("みんな").is_failure());
    }

    #[test]
    fn name_without_canonical_form_is_invalid() {
        let oversized = format!("{}\u{1F600}", "a".repeat(40_000));
        assert!(matches!(
            violations(canonical_name(&oversized)).as_slice(),
            [Violation::InvalidIdentityFormat { .. }]
        ));
        assert!(matches!(
            violations(canonical_name(&"a".repeat(64))).as_slice(),
            [Violation::InvalidIdentityFormat { .. }]
        ));
    }

    #[test]
    fn existence_depends_on_kind() {
        assert!(existence(CommandKind::Create, "foo", false).is_success());
        assert!(existence(CommandKind::Update, "foo", true).is_success());
        assert_eq!(
            violations(existence(CommandKind::Create, "foo", true)),
            vec![Violation::AlreadyExists { tld: "foo".to_string() }]
        );
        assert_eq!(
            violations(existence(CommandKind::Update, "foo", false)),
            vec![Violation::NotFound { tld: "foo".to_string() }]
        );
    }

    #[test]
    fn duplicates_are_listed_once() {
        assert_eq!(
            violations(unique_names(&names(&["a", "b", "a", "c", "a", "b"]))),
            vec![Violation::DuplicateInput {
                names: names(&["a", "b"])
            }]
        );
        assert!(unique_names(&names(&["a", "b"])).is_success());
    }

    #[test]
    fn roid_suffix_needs_single_tld() {
        let patch = TldPatch {
            roid_suffix: Some("ABC".to_string()),
            ..TldPatch::default()
        };

        assert!(single_identity(CommandKind::Update, &names(&["a", "b"]), &patch).is_failure());
        assert!(single_identity(CommandKind::Update, &names(&["a"]), &patch).is_success());
        assert!(
            single_identity(CommandKind::Update, &names(&["a", "b"]), &TldPatch::default())
                .is_success()
        );
        assert!(
            single_identity(CommandKind::Create, &names(&["a", "b"]), &TldPatch::default())
                .is_failure()
        );
    }

    #[test]
    fn conflicting_list_edits_name_their_field() {
        let patch = TldPatch {
            allowed_nameservers: ListEdit {
                replace: Some(names(&["ns1.example"])),
                add: names(&["ns2.example"]),
                remove: Vec::new(),
            },
            ..TldPatch::default()
        };

        assert_eq!(
            violations(list_edits(&patch)),
            vec![Violation::ConflictingListEdit {
                field: "allowed_nameservers"
            }]
        );
    }

    #[test]
    fn unknown_references_are_grouped_by_kind() {
        let fixture = Fixture::new();
        let patch = TldPatch {
            premium_list: Override::Set("missing".to_string()),
            reserved_lists: ListEdit::add(["common_abuse", "foo_gone", "foo_lost"]),
            dns_writers: Some(names(&["Invalid", "VoidDnsWriter", "Deadbeef"])),
            default_tokens: Override::Set(names(&["abc123", "nope"])),
            ..TldPatch::default()
        };

        let found = violations(known_references(&patch, CurrencyUnit::Usd, &fixture.catalogs()));

        assert_eq!(
            found,
            vec![
                Violation::UnknownReference {
                    kind: ReferenceKind::PremiumList,
                    names: names(&["missing"]),
                },
                Violation::UnknownReference {
                    kind: ReferenceKind::ReservedList,
                    names: names(&["foo_gone", "foo_lost"]),
                },
                Violation::UnknownReference {
                    kind: ReferenceKind::DnsWriter,
                    names: names(&["Invalid", "Deadbeef"]),
                },
                Violation::UnknownReference {
                    kind: ReferenceKind::AllocationToken,
                    names: names(&["nope"]),
                },
            ]
        );
    }

    #[test]
    fn premium_list_currency_must_match() {
        let fixture = Fixture::new();
        let patch = TldPatch {
            premium_list: Override::Set("xn--q9jyb4c".to_string()),
            ..TldPatch::default()
        };

        assert!(known_references(&patch, CurrencyUnit::Usd, &fixture.catalogs()).is_success());
        assert_eq!(
            violations(known_references(&patch, CurrencyUnit::Jpy, &fixture.catalogs())),
            vec![Violation::Cost {
                field: "premium_list",
                source: CostError::CurrencyMismatch {
                    expected: CurrencyUnit::Jpy,
                    found: CurrencyUnit::Usd,
                },
            }]
        );
    }

    #[test]
    fn reserved_list_naming_lists_offenders_in_order() {
        let shared = RegistryConfig::default().shared_reserved_list_prefix;

        assert!(reserved_list_naming("foo", &names(&["foo_extra", "common_abuse"]), &shared)
            .is_success());
        assert_eq!(
            violations(reserved_list_naming(
                "foo",
                &names(&["zeta_extra", "foo_ok", "bar_extra"]),
                &shared
            )),
            vec![Violation::NamingConventionViolation {
                tld: "foo".to_string(),
                names: names(&["zeta_extra", "bar_extra"]),
            }]
        );
    }

    #[test]
    fn idn_tables_are_normalized() {
        let tables = idn_tables(&names(&["ja", "JA", "extended_latin"]));

        match tables {
            Validation::Success(set) => {
                assert_eq!(
                    set.into_iter().collect::<Vec<_>>(),
                    vec![IdnTable::ExtendedLatin, IdnTable::Ja]
                );
            }
            Validation::Failure(_) => panic!("Expected valid tables"),
        }
    }

    #[test]
    fn lone_empty_idn_table_clears_but_mixed_empty_is_invalid() {
        match idn_tables(&names(&[""])) {
            Validation::Success(tables) => assert!(tables.is_empty()),
            Validation::Failure(errors) => panic!("Expected success, got {errors:?}"),
        }

        assert!(matches!(
            violations(idn_tables(&names(&["ja", ""]))).as_slice(),
            [Violation::InvalidEnumValue { invalid, .. }] if invalid.as_slice() == [String::new()]
        ));
    }

    #[test]
    fn idn_tables_report_candidates_and_domain() {
        assert_eq!(
            violations(idn_tables(&names(&["ja", "klingon"]))),
            vec![Violation::InvalidEnumValue {
                field: "idn_tables",
                values: names(&["JA", "KLINGON"]),
                invalid: names(&["KLINGON"]),
                domain: vec!["EXTENDED_LATIN", "UNCONFUSABLE_LATIN", "JA"],
            }]
        );
    }

    #[test]
    fn schedule_errors_carry_their_field() {
        let base = Schedule::constant(TldState::Predelegation);
        let update = ScheduleOverride {
            replace_all: vec![Transition::at_start_of_time(TldState::Pdt)],
            append_one: Some(Transition::at_start_of_time(TldState::Pdt)),
        };

        assert_eq!(
            violations(schedule(
                "tld_state_transitions",
                update,
                Some(&base),
                TldState::Predelegation
            )),
            vec![Violation::Schedule {
                field: "tld_state_transitions",
                source: ScheduleError::ConflictingScheduleUpdate,
            }]
        );
    }

    #[test]
    fn costs_flag_every_bad_field() {
        let config = RegistryConfig::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut tld = Tld::with_defaults("foo", CurrencyUnit::Usd, &config, now);
        assert!(costs(&tld).is_success());

        tld.create_billing_cost = Money::of_major(CurrencyUnit::Eur, 8);
        tld.restore_billing_cost = Money::of_major(CurrencyUnit::Usd, -1);
        tld.eap_fee_schedule = Schedule::constant(Money::of_major(CurrencyUnit::Jpy, 0));

        let fields: Vec<&str> = violations(costs(&tld))
            .into_iter()
            .filter_map(|v| match v {
                Violation::Cost { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec!["eap_fee_schedule", "create_billing_cost", "restore_billing_cost"]
        );
    }

    #[test]
    fn creation_requires_dns_writer() {
        let config = RegistryConfig::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut tld = Tld::with_defaults("foo", CurrencyUnit::Usd, &config, now);

        assert!(dns_writers_present(CommandKind::Update, &tld).is_success());
        assert!(dns_writers_present(CommandKind::Create, &tld).is_failure());

        tld.dns_writers.insert("VoidDnsWriter".to_string());
        assert!(dns_writers_present(CommandKind::Create, &tld).is_success());
    }
}
