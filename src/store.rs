//! Entity storage for TLD revisions.

use crate::snapshot::{Snapshot, SnapshotError};
use crate::tld::Tld;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from reading or writing revisions.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("TLD '{name}' changed concurrently (expected revision {expected}, found {found})")]
    VersionConflict {
        name: String,
        expected: u64,
        found: u64,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Persistence seam for TLD revisions.
///
/// `put` is a compare-and-set: it succeeds only when `old` is still the
/// current record (or both are absent), and returns the stored revision with
/// its new revision number.
pub trait EntityStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<Tld>, StoreError>;

    fn put(&self, old: Option<&Tld>, new: Tld) -> Result<Tld, StoreError>;
}

/// Map-backed store holding bincode snapshots.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every stored TLD.
    pub fn names(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }

    fn decode(bytes: &[u8]) -> Result<Tld, StoreError> {
        Ok(Snapshot::from_binary(bytes)?.tld)
    }
}

impl EntityStore for InMemoryStore {
    fn get(&self, name: &str) -> Result<Option<Tld>, StoreError> {
        self.records
            .read()
            .get(name)
            .map(|bytes| Self::decode(bytes))
            .transpose()
    }

    fn put(&self, old: Option<&Tld>, mut new: Tld) -> Result<Tld, StoreError> {
        let mut records = self.records.write();

        let found = match records.get(&new.tld_str) {
            Some(bytes) => Self::decode(bytes)?.revision,
            None => 0,
        };
        let expected = old.map_or(0, |tld| tld.revision);
        if found != expected {
            return Err(StoreError::VersionConflict {
                name: new.tld_str,
                expected,
                found,
            });
        }

        new.revision = found + 1;
        let bytes = Snapshot::new(new.clone(), Utc::now()).to_binary()?;
        records.insert(new.tld_str.clone(), bytes);
        Ok(new)
    }
}
