//! Error types for EID encoding, decoding, and record lookup.

use thiserror::Error;

/// Errors raised by the record data store behind a registered type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record matched an "exactly one" query.
    #[error("{type_name} not found for {field} = {value}")]
    RecordNotFound {
        type_name: String,
        field: String,
        value: String,
    },

    /// More than one record matched an "exactly one" query.
    #[error("{count} {type_name} records match {field} = {value}, expected one")]
    AmbiguousRecord {
        type_name: String,
        field: String,
        value: String,
        count: usize,
    },

    /// The store itself failed.
    #[error("store error: {0}")]
    Backend(String),
}

/// Errors that can occur when working with external IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExidError {
    /// The EID is absent, empty, or missing its `_` separator.
    #[error("invalid EID {}", display_input(.input))]
    InvalidEid { input: Option<String> },

    /// The payload contains a character outside the Base62 alphabet.
    #[error("invalid character '{character}' in \"{input}\"")]
    InvalidCharacter { character: char, input: String },

    /// The payload decodes to a value wider than 128 bits.
    #[error("\"{input}\" does not fit in 128 bits")]
    Overflow { input: String },

    /// The identifier text is not a valid UUID.
    #[error("invalid UUID \"{input}\": {reason}")]
    InvalidUuid { input: String, reason: String },

    /// No record type is registered for the prefix.
    #[error("model for \"{prefix}\" not found")]
    PrefixNotRegistered { prefix: String },

    /// The prefix was rejected by the configured prefix policy.
    #[error("prefix validation failed for: {prefix}")]
    PolicyViolation { prefix: String },

    /// A type-specific loader was handed an EID of another type.
    #[error("EID prefix mismatch: expected '{expected}', got '{actual}'")]
    PrefixMismatch { expected: String, actual: String },

    /// The record has no value for its identifier field.
    #[error("{type_name} has no value for field '{field}'")]
    MissingField { type_name: String, field: String },

    /// A configuration value could not be parsed.
    #[error("invalid configuration value for {key}: \"{value}\"")]
    InvalidConfig { key: String, value: String },

    /// The data store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn display_input(input: &Option<String>) -> String {
    match input {
        Some(s) => format!("{s:?}"),
        None => "nil".to_string(),
    }
}

impl ExidError {
    pub(crate) fn invalid_eid(input: Option<&str>) -> Self {
        ExidError::InvalidEid {
            input: input.map(str::to_string),
        }
    }

    /// Returns true if the EID string itself could not be decoded.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ExidError::InvalidEid { .. }
                | ExidError::InvalidCharacter { .. }
                | ExidError::Overflow { .. }
        )
    }

    /// Returns true if the prefix is unknown or no record matched.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExidError::PrefixNotRegistered { .. }
                | ExidError::Store(StoreError::RecordNotFound { .. })
        )
    }

    /// Returns true if an "exactly one" lookup matched several records.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ExidError::Store(StoreError::AmbiguousRecord { .. }))
    }

    /// Returns true if a loader was called with another type's EID.
    ///
    /// This is a caller bug rather than a lookup miss and should not be
    /// handled like one.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ExidError::PrefixMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_eid_messages() {
        assert_eq!(
            ExidError::invalid_eid(Some("error")).to_string(),
            r#"invalid EID "error""#
        );
        assert_eq!(ExidError::invalid_eid(Some("")).to_string(), r#"invalid EID """#);
        assert_eq!(ExidError::invalid_eid(None).to_string(), "invalid EID nil");
    }

    #[test]
    fn test_classification() {
        let not_found = ExidError::from(StoreError::RecordNotFound {
            type_name: "Voucher".into(),
            field: "uuid".into(),
            value: "x".into(),
        });
        assert!(not_found.is_not_found());
        assert!(!not_found.is_decode_error());

        let unknown = ExidError::PrefixNotRegistered {
            prefix: "unkn".into(),
        };
        assert!(unknown.is_not_found());
        assert_eq!(unknown.to_string(), r#"model for "unkn" not found"#);

        let mismatch = ExidError::PrefixMismatch {
            expected: "pref".into(),
            actual: "unkn".into(),
        };
        assert!(mismatch.is_contract_violation());
        assert!(!mismatch.is_not_found());
    }
}
