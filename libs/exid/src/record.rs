//! Record capability: attaching a record type to a prefix.
//!
//! A record type implements [`Record`] and is served by a [`RecordStore`].
//! [`attach_to_type`] validates the prefix, registers the type, and returns a
//! [`RecordType`] that computes EIDs for records and loads records by EID.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::coder;
use crate::config::{self, Configuration};
use crate::eid::Eid;
use crate::error::ExidError;
use crate::registry::{self, Registry, RegistryEntry};
use crate::store::{RecordSource, RecordStore};

/// A record that can be addressed by EID.
pub trait Record: Send + Sync + 'static {
    /// Name of the record type, used in registry entries and errors.
    const TYPE_NAME: &'static str;

    /// Returns the value of the named field as UUID text.
    fn field_value(&self, field: &str) -> Option<String>;
}

/// A record of any registered type.
///
/// This is what the global registry returns; use [`downcast_ref`] or
/// [`downcast`] to get the concrete record back.
///
/// [`downcast_ref`]: DynRecord::downcast_ref
/// [`downcast`]: DynRecord::downcast
pub struct DynRecord {
    type_name: &'static str,
    inner: Box<dyn Any + Send + Sync>,
}

impl DynRecord {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Record>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Returns the concrete record, or `self` unchanged if it is another type.
    pub fn downcast<T: Record>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.inner
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|inner| Self { type_name, inner })
    }
}

impl<T: Record> From<T> for DynRecord {
    fn from(record: T) -> Self {
        Self {
            type_name: T::TYPE_NAME,
            inner: Box::new(record),
        }
    }
}

impl fmt::Debug for DynRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynRecord")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A record type attached to a prefix.
pub struct RecordType<S: RecordStore> {
    prefix: String,
    field: String,
    store: Arc<S>,
    handle_length: usize,
}

impl<S: RecordStore> RecordType<S> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn uuid_of(&self, record: &S::Record) -> Result<String, ExidError> {
        record
            .field_value(&self.field)
            .ok_or_else(|| ExidError::MissingField {
                type_name: <S::Record as Record>::TYPE_NAME.to_string(),
                field: self.field.clone(),
            })
    }

    /// Returns the record's EID string.
    pub fn eid_value(&self, record: &S::Record) -> Result<String, ExidError> {
        coder::encode(&self.prefix, &self.uuid_of(record)?)
    }

    /// Returns the record's EID as a typed value.
    pub fn eid(&self, record: &S::Record) -> Result<Eid, ExidError> {
        let text = self.uuid_of(record)?;
        let uuid = Uuid::try_parse(&text).map_err(|e| ExidError::InvalidUuid {
            reason: e.to_string(),
            input: text,
        })?;
        Ok(Eid::new(self.prefix.clone(), uuid))
    }

    /// Returns the configured number of trailing payload characters.
    ///
    /// For telling records apart in listings only. A handle is not unique
    /// and cannot be used to load a record.
    pub fn eid_handle(&self, record: &S::Record) -> Result<String, ExidError> {
        self.eid_handle_with(record, self.handle_length)
    }

    /// Returns the last `len` payload characters of the record's EID.
    pub fn eid_handle_with(&self, record: &S::Record, len: usize) -> Result<String, ExidError> {
        Ok(self.eid(record)?.handle(len))
    }

    /// Loads the single record for an EID of this type.
    ///
    /// An EID carrying another prefix is a caller bug and fails with
    /// [`ExidError::PrefixMismatch`]; a missing record fails with the
    /// store's not-found error.
    pub fn load(&self, eid: &str) -> Result<S::Record, ExidError> {
        let decoded = coder::decode(eid)?;

        if decoded.prefix != self.prefix {
            return Err(ExidError::PrefixMismatch {
                expected: self.prefix.clone(),
                actual: decoded.prefix,
            });
        }

        Ok(self.store.find_sole_by(&self.field, &decoded.uuid)?)
    }
}

impl<S: RecordStore> Clone for RecordType<S> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            field: self.field.clone(),
            store: Arc::clone(&self.store),
            handle_length: self.handle_length,
        }
    }
}

impl<S: RecordStore> fmt::Debug for RecordType<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("prefix", &self.prefix)
            .field("field", &self.field)
            .field("type_name", &<S::Record as Record>::TYPE_NAME)
            .finish()
    }
}

/// Attaches a record type to `prefix` in `registry`.
///
/// The prefix is checked against `config` first; a rejected prefix leaves the
/// registry untouched.
pub fn attach_to_type<S, R>(
    registry: &Registry<R>,
    config: &Configuration,
    prefix: &str,
    field: &str,
    store: Arc<S>,
) -> Result<RecordType<S>, ExidError>
where
    S: RecordStore,
    R: From<S::Record> + 'static,
{
    if let Err(err) = config.validate_prefix(prefix) {
        warn!(prefix, type_name = <S::Record as Record>::TYPE_NAME, "EID prefix rejected");
        return Err(err);
    }

    let source: Arc<dyn RecordSource<R>> = store.clone();
    registry.register(RegistryEntry::new(prefix, field, source));

    debug!(prefix, field, type_name = <S::Record as Record>::TYPE_NAME, "record type attached");

    Ok(RecordType {
        prefix: prefix.to_string(),
        field: field.to_string(),
        store,
        handle_length: config.handle_length(),
    })
}

/// Attaches a record type using the process-wide registry and configuration.
pub fn attach<S: RecordStore>(
    prefix: &str,
    field: &str,
    store: Arc<S>,
) -> Result<RecordType<S>, ExidError> {
    attach_to_type(registry::registry(), &config::configuration(), prefix, field, store)
}
