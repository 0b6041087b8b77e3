//! Create and update commands over a batch of TLDs.
//!
//! A [`TldCommand`] is the imperative shell around [`stage`]: it runs the
//! batch-wide checks, loads each old revision from the store, stages every
//! TLD independently, writes the staged revisions and finally notifies the
//! cache of every name that changed.

use crate::cache::CacheInvalidator;
use crate::catalog::Catalogs;
use crate::config::RegistryConfig;
use crate::enforcement::rules;
use crate::enforcement::{NamingPolicy, StagingContext, Violation};
use crate::patch::TldPatch;
use crate::staging::{stage, Rejection, StagedRevision};
use crate::store::{EntityStore, StoreError};
use crate::tld::Tld;
use chrono::{DateTime, Utc};
use stillwater::validation::Validation;
use tracing::{debug, info, warn};

/// Whether a command creates new TLDs or updates existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Update,
}

/// A create or update of one or more TLDs with a shared patch.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use tld_timetable::cache::NoopInvalidator;
/// use tld_timetable::catalog::{
///     AllocationToken, Catalogs, DnsWriter, PremiumList, ReservedList, StaticCatalog,
/// };
/// use tld_timetable::command::{CommandKind, TldCommand};
/// use tld_timetable::config::RegistryConfig;
/// use tld_timetable::patch::TldPatch;
/// use tld_timetable::store::{EntityStore, InMemoryStore};
///
/// let writers = StaticCatalog::from_resources([DnsWriter {
///     name: "VoidDnsWriter".to_string(),
/// }]);
/// let premium: StaticCatalog<PremiumList> = StaticCatalog::default();
/// let reserved: StaticCatalog<ReservedList> = StaticCatalog::default();
/// let tokens: StaticCatalog<AllocationToken> = StaticCatalog::default();
/// let catalogs = Catalogs {
///     premium_lists: &premium,
///     reserved_lists: &reserved,
///     allocation_tokens: &tokens,
///     dns_writers: &writers,
/// };
///
/// let store = InMemoryStore::new();
/// let command = TldCommand::new(
///     CommandKind::Create,
///     ["example"],
///     TldPatch {
///         dns_writers: Some(vec!["VoidDnsWriter".to_string()]),
///         ..TldPatch::default()
///     },
///     Utc::now(),
/// );
///
/// let report = command
///     .execute(&store, &catalogs, &RegistryConfig::default(), &NoopInvalidator)
///     .unwrap();
///
/// assert_eq!(report.written(), vec!["example".to_string()]);
/// assert_eq!(store.get("example").unwrap().map(|tld| tld.revision), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TldCommand {
    pub kind: CommandKind,
    pub names: Vec<String>,
    pub patch: TldPatch,
    /// Accept reserved lists that break the naming convention, with a warning.
    pub override_reserved_list_rules: bool,
    pub now: DateTime<Utc>,
}

/// What happened to one TLD of a batch.
#[derive(Debug)]
pub enum Outcome {
    Written { tld: Tld, staged: StagedRevision },
    Rejected(Rejection),
    StoreFailed { name: String, error: StoreError },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Written { tld, .. } => &tld.tld_str,
            Self::Rejected(rejection) => &rejection.tld,
            Self::StoreFailed { name, .. } => name,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Per-TLD outcomes of an executed command, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    /// Names whose new revision was stored.
    pub fn written(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.is_written())
            .map(|o| o.name().to_string())
            .collect()
    }

    pub fn rejections(&self) -> Vec<&Rejection> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Rejected(rejection) => Some(rejection),
                _ => None,
            })
            .collect()
    }

    pub fn all_written(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_written)
    }
}

impl TldCommand {
    pub fn new<I, S>(kind: CommandKind, names: I, patch: TldPatch, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            names: names.into_iter().map(Into::into).collect(),
            patch,
            override_reserved_list_rules: false,
            now,
        }
    }

    pub fn override_reserved_list_rules(mut self, enabled: bool) -> Self {
        self.override_reserved_list_rules = enabled;
        self
    }

    /// Checks that span the whole batch; failing any rejects every TLD.
    fn check_batch(&self) -> Result<(), Rejection> {
        let checks = vec![
            rules::unique_names(&self.names),
            rules::single_identity(self.kind, &self.names, &self.patch),
        ];
        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(Rejection::new(
                self.names.join(", "),
                errors.iter().cloned().collect(),
            )),
        }
    }

    fn context<'a>(
        &self,
        catalogs: &Catalogs<'a>,
        config: &'a RegistryConfig,
    ) -> StagingContext<'a> {
        StagingContext::new(self.kind, *catalogs, config, self.now)
            .with_naming(NamingPolicy::from_override_flag(
                self.override_reserved_list_rules,
            ))
    }

    fn stage_one(
        &self,
        name: &str,
        store: &dyn EntityStore,
        ctx: &StagingContext<'_>,
    ) -> Result<StagedRevision, Rejection> {
        let old = store.get(name).map_err(|error| {
            Rejection::new(
                name,
                vec![Violation::Unreadable {
                    tld: name.to_string(),
                    reason: error.to_string(),
                }],
            )
        })?;
        stage(name, old.as_ref(), &self.patch, ctx)
    }

    /// Stage every TLD of the batch without writing anything.
    ///
    /// The outer error is a batch-wide rejection; inner results are
    /// independent per TLD.
    pub fn stage_all(
        &self,
        store: &dyn EntityStore,
        catalogs: &Catalogs<'_>,
        config: &RegistryConfig,
    ) -> Result<Vec<Result<StagedRevision, Rejection>>, Rejection> {
        self.check_batch()?;
        let ctx = self.context(catalogs, config);

        Ok(self
            .names
            .iter()
            .map(|name| self.stage_one(name, store, &ctx))
            .collect())
    }

    /// Stage and write every TLD, then invalidate the cache for those written.
    pub fn execute(
        &self,
        store: &dyn EntityStore,
        catalogs: &Catalogs<'_>,
        config: &RegistryConfig,
        invalidator: &dyn CacheInvalidator,
    ) -> Result<BatchReport, Rejection> {
        let staged = self.stage_all(store, catalogs, config).map_err(|rejection| {
            warn!(tlds = %rejection.tld, error = %rejection, "Rejected TLD batch");
            rejection
        })?;

        let mut report = BatchReport::default();
        for (name, result) in self.names.iter().zip(staged) {
            let outcome = match result {
                Ok(staged) => match store.put(staged.old.as_ref(), staged.new.clone()) {
                    Ok(tld) => {
                        info!(tld = %tld.tld_str, revision = tld.revision, kind = ?self.kind, "Wrote TLD revision");
                        Outcome::Written { tld, staged }
                    }
                    Err(error) => {
                        warn!(tld = %name, error = %error, "Failed to write TLD revision");
                        Outcome::StoreFailed {
                            name: name.clone(),
                            error,
                        }
                    }
                },
                Err(rejection) => {
                    warn!(tld = %name, error = %rejection, "Rejected TLD");
                    Outcome::Rejected(rejection)
                }
            };
            report.outcomes.push(outcome);
        }

        let written = report.written();
        debug!(count = written.len(), "Invalidating cached TLDs");
        invalidator.invalidate(&written);

        Ok(report)
    }
}
