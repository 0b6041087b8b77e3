//! Context provided to staging rules.

use crate::catalog::Catalogs;
use crate::command::CommandKind;
use crate::config::RegistryConfig;
use crate::enforcement::violations::NamingPolicy;
use chrono::{DateTime, Utc};

/// Everything a rule may consult besides the revisions themselves.
#[derive(Clone, Copy)]
pub struct StagingContext<'a> {
    pub kind: CommandKind,
    pub catalogs: Catalogs<'a>,
    pub config: &'a RegistryConfig,
    pub naming: NamingPolicy,
    /// Creation time of new revisions.
    pub now: DateTime<Utc>,
}

impl<'a> StagingContext<'a> {
    pub fn new(
        kind: CommandKind,
        catalogs: Catalogs<'a>,
        config: &'a RegistryConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            catalogs,
            config,
            naming: NamingPolicy::Enforce,
            now,
        }
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn is_create(&self) -> bool {
        matches!(self.kind, CommandKind::Create)
    }
}
