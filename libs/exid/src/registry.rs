//! Prefix registry used to resolve an EID to its record type.
//!
//! Entries are keyed by prefix: registering a prefix that is already present
//! replaces the old entry, so a record type that is redefined (for example on
//! code reload) never leaves a stale duplicate behind.
//!
//! Every operation takes the registry's single lock for its full duration.
//! Reads hand back owned snapshots, so callers can iterate without holding
//! the lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::coder;
use crate::error::ExidError;
use crate::record::DynRecord;
use crate::store::{RecordSource, Relation};

/// A registered record type: its prefix, identifier field, and store.
pub struct RegistryEntry<R = DynRecord> {
    prefix: String,
    field: String,
    source: Arc<dyn RecordSource<R>>,
}

impl<R> RegistryEntry<R> {
    pub fn new(
        prefix: impl Into<String>,
        field: impl Into<String>,
        source: Arc<dyn RecordSource<R>>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            field: field.into(),
            source,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn type_name(&self) -> &'static str {
        self.source.type_name()
    }

    pub fn source(&self) -> &Arc<dyn RecordSource<R>> {
        &self.source
    }

    /// Builds the lazy `field = value` query for this record type.
    pub fn select(&self, value: &str) -> Result<Relation<R>, ExidError> {
        Ok(self.source.select(&self.field, value)?)
    }
}

impl<R> Clone for RegistryEntry<R> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            field: self.field.clone(),
            source: Arc::clone(&self.source),
        }
    }
}

impl<R> fmt::Debug for RegistryEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("prefix", &self.prefix)
            .field("field", &self.field)
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// Thread-safe table of prefix to record type.
pub struct Registry<R = DynRecord> {
    entries: Mutex<HashMap<String, RegistryEntry<R>>>,
}

impl<R> Registry<R> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RegistryEntry<R>>> {
        // Each mutation is a single map operation, so a poisoned map is
        // still consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an entry, replacing any entry with the same prefix.
    ///
    /// Returns the replaced entry, if there was one.
    pub fn register(&self, entry: RegistryEntry<R>) -> Option<RegistryEntry<R>> {
        let mut entries = self.lock();
        let previous = entries.insert(entry.prefix.clone(), entry.clone());

        match &previous {
            Some(old) if old.field != entry.field || old.type_name() != entry.type_name() => {
                warn!(
                    prefix = %entry.prefix,
                    old_type = old.type_name(),
                    new_type = entry.type_name(),
                    old_field = %old.field,
                    new_field = %entry.field,
                    "EID prefix re-registered for a different record type"
                );
            }
            Some(_) => {
                debug!(prefix = %entry.prefix, type_name = entry.type_name(), "EID prefix re-registered");
            }
            None => {
                debug!(
                    prefix = %entry.prefix,
                    field = %entry.field,
                    type_name = entry.type_name(),
                    "EID prefix registered"
                );
            }
        }

        previous
    }

    /// Removes every entry.
    pub fn unload(&self) {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        info!(count, "EID registry unloaded");
    }

    /// Returns a snapshot of all entries, in no particular order.
    pub fn entries(&self) -> Vec<RegistryEntry<R>> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.lock().contains_key(prefix)
    }

    /// Returns the entry registered for `prefix`.
    pub fn find(&self, prefix: &str) -> Result<RegistryEntry<R>, ExidError> {
        self.lock()
            .get(prefix)
            .cloned()
            .ok_or_else(|| ExidError::PrefixNotRegistered {
                prefix: prefix.to_string(),
            })
    }

    /// Decodes an EID and builds the lazy query for its record.
    pub fn query(&self, eid: &str) -> Result<Relation<R>, ExidError> {
        let decoded = coder::decode(eid)?;
        let entry = self.find(&decoded.prefix)?;

        debug!(
            prefix = %decoded.prefix,
            field = %entry.field,
            type_name = entry.type_name(),
            "resolving EID"
        );

        entry.select(&decoded.uuid)
    }

    /// Returns the first record for an EID, or `None` if no record matches.
    ///
    /// Decode failures and unknown prefixes are still errors.
    pub fn fetch(&self, eid: &str) -> Result<Option<R>, ExidError> {
        Ok(self.query(eid)?.first()?)
    }

    /// Returns the only record for an EID.
    ///
    /// Fails when no record or more than one record matches.
    pub fn fetch_exactly_one(&self, eid: &str) -> Result<R, ExidError> {
        Ok(self.query(eid)?.sole()?)
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        f.debug_struct("Registry")
            .field("entries", &entries)
            .finish()
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Returns the process-wide registry.
pub fn registry() -> &'static Registry {
    &REGISTRY
}
