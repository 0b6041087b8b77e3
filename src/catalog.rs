//! Named catalogs of external resources a TLD may reference.
//!
//! Premium lists, reserved lists, allocation tokens and DNS writer
//! implementations live outside the TLD. Staging only needs to know whether a
//! name resolves, so the seam is a narrow lookup trait.

use crate::money::CurrencyUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only lookup of resources by name.
pub trait NamedCatalog {
    type Resource;

    /// The resource registered under `name`, if any.
    fn resolve(&self, name: &str) -> Option<Self::Resource>;

    /// Every registered name.
    fn list_names(&self) -> Vec<String>;
}

/// A premium price list; priced in one currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PremiumList {
    pub name: String,
    pub currency: CurrencyUnit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservedList {
    pub name: String,
}

/// A promotional allocation token usable as a TLD default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationToken {
    pub token: String,
}

/// A DNS writer implementation known to the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DnsWriter {
    pub name: String,
}

/// Resources that carry their own catalog key.
pub trait Named {
    fn catalog_name(&self) -> &str;
}

impl Named for PremiumList {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

impl Named for ReservedList {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

impl Named for AllocationToken {
    fn catalog_name(&self) -> &str {
        &self.token
    }
}

impl Named for DnsWriter {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

/// In-memory catalog keyed by resource name.
///
/// ```rust
/// use tld_timetable::catalog::{NamedCatalog, ReservedList, StaticCatalog};
///
/// let lists = StaticCatalog::from_resources(vec![ReservedList {
///     name: "common_abuse".to_string(),
/// }]);
///
/// assert!(lists.resolve("common_abuse").is_some());
/// assert!(lists.resolve("tld_banned").is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StaticCatalog<R> {
    entries: BTreeMap<String, R>,
}

impl<R> Default for StaticCatalog<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R: Named + Clone> StaticCatalog<R> {
    pub fn from_resources<I>(resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        let entries = resources
            .into_iter()
            .map(|r| (r.catalog_name().to_string(), r))
            .collect();
        Self { entries }
    }

    /// Return a new catalog with `resource` added (or replaced).
    pub fn with(&self, resource: R) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(resource.catalog_name().to_string(), resource);
        Self { entries }
    }
}

impl<R: Clone> NamedCatalog for StaticCatalog<R> {
    type Resource = R;

    fn resolve(&self, name: &str) -> Option<R> {
        self.entries.get(name).cloned()
    }

    fn list_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// The catalogs consulted while staging, borrowed for the duration of a batch.
#[derive(Clone, Copy)]
pub struct Catalogs<'a> {
    pub premium_lists: &'a dyn NamedCatalog<Resource = PremiumList>,
    pub reserved_lists: &'a dyn NamedCatalog<Resource = ReservedList>,
    pub allocation_tokens: &'a dyn NamedCatalog<Resource = AllocationToken>,
    pub dns_writers: &'a dyn NamedCatalog<Resource = DnsWriter>,
}

/// Names from `names` that `catalog` cannot resolve, in input order, each once.
pub fn missing_names<R>(catalog: &dyn NamedCatalog<Resource = R>, names: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in names {
        if catalog.resolve(name).is_none() && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    missing
}
