//! Typed external ID value.

use std::fmt;
use std::str::FromStr;

use uuid::{Timestamp, Uuid};

use crate::base62;
use crate::coder::{self, SEPARATOR};
use crate::error::ExidError;

/// Default number of payload characters in a display handle.
pub const DEFAULT_HANDLE_LENGTH: usize = 10;

/// A parsed external ID: a prefix and the UUID it wraps.
///
/// Serializes as its wire string, `{prefix}_{payload}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Eid {
    prefix: String,
    uuid: Uuid,
}

impl Eid {
    /// Creates an EID from a prefix and UUID.
    pub fn new(prefix: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            prefix: prefix.into(),
            uuid,
        }
    }

    /// Parses an EID from its wire string.
    pub fn parse(s: &str) -> Result<Self, ExidError> {
        let (prefix, value) = coder::split(Some(s))?;
        Ok(Self::new(prefix, Uuid::from_u128(value)))
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the canonical hyphenated UUID text.
    #[must_use]
    pub fn uuid_text(&self) -> String {
        self.uuid.hyphenated().to_string()
    }

    /// Returns the 22-character Base62 payload.
    #[must_use]
    pub fn payload(&self) -> String {
        base62::encode(self.uuid.as_u128())
    }

    /// Returns the last `len` characters of the payload.
    ///
    /// UUIDv7 values created close together share their leading bits, so the
    /// tail is what tells records apart at a glance. Display only; a handle
    /// cannot be resolved back to a record.
    #[must_use]
    pub fn handle(&self, len: usize) -> String {
        tail(&self.payload(), len).to_string()
    }

    /// Returns the timestamp embedded in time-based UUIDs (v1, v6, v7).
    #[must_use]
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.uuid.get_timestamp()
    }
}

/// Returns at most the last `len` characters of an ASCII string.
fn tail(s: &str, len: usize) -> &str {
    &s[s.len().saturating_sub(len)..]
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.prefix, self.payload())
    }
}

impl FromStr for Eid {
    type Err = ExidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Eid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Eid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
