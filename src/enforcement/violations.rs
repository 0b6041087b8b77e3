//! Violations, warnings, and how naming violations are handled.

use crate::core::ScheduleError;
use crate::money::CostError;
use std::fmt;
use thiserror::Error;

/// Kind of named resource a TLD can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    PremiumList,
    ReservedList,
    DnsWriter,
    AllocationToken,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PremiumList => "premium list",
            Self::ReservedList => "reserved list",
            Self::DnsWriter => "DNS writer",
            Self::AllocationToken => "allocation token",
        };
        write!(f, "{name}")
    }
}

/// A reason a TLD revision cannot be staged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("TLD '{tld}' already exists")]
    AlreadyExists { tld: String },

    #[error("TLD '{tld}' does not exist")]
    NotFound { tld: String },

    #[error("TLD '{tld}' should be given in the canonical form '{canonical}'")]
    NotCanonical { tld: String, canonical: String },

    #[error("Invalid TLD '{tld}': {reason}")]
    InvalidIdentityFormat { tld: String, reason: String },

    #[error("{reason}")]
    BatchIdentityConflict { reason: String },

    #[error("Unknown {kind} name(s): {names:?}")]
    UnknownReference {
        kind: ReferenceKind,
        names: Vec<String>,
    },

    #[error("Reserved list(s) {names:?} cannot be applied to TLD '{tld}'")]
    NamingConventionViolation { tld: String, names: Vec<String> },

    #[error("{field} {values:?} contained invalid value(s) {invalid:?}. Possible values: {domain:?}")]
    InvalidEnumValue {
        field: &'static str,
        values: Vec<String>,
        invalid: Vec<String>,
        domain: Vec<&'static str>,
    },

    #[error("Duplicate arguments found: {names:?}")]
    DuplicateInput { names: Vec<String> },

    #[error("At least one DNS writer must be specified")]
    MissingDnsWriter,

    #[error("Don't pass both a full {field} list and names to add or remove")]
    ConflictingListEdit { field: &'static str },

    #[error("{field}: {source}")]
    Schedule {
        field: &'static str,
        #[source]
        source: ScheduleError,
    },

    #[error("Stored revision of TLD '{tld}' is unreadable: {reason}")]
    Unreadable { tld: String, reason: String },

    #[error("{field}: {source}")]
    Cost {
        field: &'static str,
        #[source]
        source: CostError,
    },
}

/// A non-fatal finding returned alongside a staged revision.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Reserved lists that break the naming convention were accepted anyway.
    NamingConventionOverridden { tld: String, names: Vec<String> },

    /// Invoicing only understands a single renew cost.
    MultipleRenewCostTransitions { tld: String, count: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamingConventionOverridden { tld, names } => write!(
                f,
                "Overriding reserved list naming rules for TLD '{tld}': {names:?}"
            ),
            Self::MultipleRenewCostTransitions { tld, count } => write!(
                f,
                "TLD '{tld}' has {count} renew cost transitions; invoicing only supports one"
            ),
        }
    }
}

/// What to do with reserved lists that break the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Reject the revision
    Enforce,

    /// Accept the revision and return a warning
    WarnOnly,
}

impl NamingPolicy {
    pub fn from_override_flag(override_rules: bool) -> Self {
        if override_rules {
            Self::WarnOnly
        } else {
            Self::Enforce
        }
    }
}
