//! # exid
//!
//! Prefixed, Base62-encoded external IDs (EIDs) for UUID-keyed records, and a
//! registry that resolves an EID back to the record type it belongs to.
//!
//! ## EID Format
//!
//! An EID is `{prefix}_{payload}`, where the payload is the UUID's 128-bit
//! value in Base62, zero-padded to 22 characters:
//!
//! - `vhr_02TOxMzOS0VaLzYiS3NPd9`
//! - `pref_02ZY58Nm39UWOBtqZqRhLm`
//!
//! The prefix tells a reader (and the registry) what kind of record the ID
//! refers to. It must not contain `_`.
//!
//! ## Layers
//!
//! - [`base62`]: the fixed-width codec for 128-bit values
//! - [`coder`]: joining and splitting prefix and payload
//! - [`Registry`]: prefix to record type, with [`Registry::fetch`] and
//!   [`Registry::fetch_exactly_one`] dispatch
//! - [`attach_to_type`]: registers a [`Record`] type and returns its
//!   [`RecordType`] helpers

pub mod base62;
pub mod coder;
mod config;
mod eid;
mod error;
mod record;
mod registry;
mod store;

pub use config::{
    configuration, configure, reset_configuration, Configuration, PrefixValidator,
    DEFAULT_MAX_PREFIX_LEN,
};
pub use eid::{Eid, DEFAULT_HANDLE_LENGTH};
pub use error::{ExidError, StoreError};
pub use record::{attach, attach_to_type, DynRecord, Record, RecordType};
pub use registry::{registry, Registry, RegistryEntry};
pub use store::{Criteria, RecordSource, RecordStore, Relation};

/// Re-export uuid for consumers that build EIDs from raw UUIDs
pub use uuid::Uuid;
