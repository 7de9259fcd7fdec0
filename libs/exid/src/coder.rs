//! Packing and unpacking of `{prefix}_{payload}` strings.
//!
//! The payload is the 22-character Base62 encoding of the UUID's 128-bit
//! value, for example:
//!
//! ```text
//! vhr + 018977bb-02f0-729c-8c00-2f384eccb763 => vhr_02TOxMzOS0VaLzYiS3NPd9
//! ```

use uuid::Uuid;

use crate::base62;
use crate::error::ExidError;

/// Separator between prefix and payload.
pub const SEPARATOR: char = '_';

/// The two halves of a decoded EID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoded {
    /// The type tag in front of the separator.
    pub prefix: String,
    /// Canonical hyphenated, lowercase UUID text.
    pub uuid: String,
}

/// Encodes a prefix and UUID text as an EID.
///
/// The prefix is not validated here; policy checks happen when a record
/// type is attached.
pub fn encode(prefix: &str, uuid: &str) -> Result<String, ExidError> {
    let parsed = Uuid::try_parse(uuid).map_err(|e| ExidError::InvalidUuid {
        input: uuid.to_string(),
        reason: e.to_string(),
    })?;

    Ok(encode_uuid(prefix, parsed))
}

/// Encodes a prefix and an already parsed UUID as an EID.
#[must_use]
pub fn encode_uuid(prefix: &str, uuid: Uuid) -> String {
    format!("{prefix}{SEPARATOR}{}", base62::encode(uuid.as_u128()))
}

/// Splits an EID into its prefix and canonical UUID text.
///
/// Only the first `_` separates; both halves must be non-empty. Accepts
/// `None` so callers holding an optional value get the same error as for
/// a malformed one.
pub fn decode<'a>(eid: impl Into<Option<&'a str>>) -> Result<Decoded, ExidError> {
    let (prefix, value) = split(eid.into())?;

    Ok(Decoded {
        prefix: prefix.to_string(),
        uuid: Uuid::from_u128(value).hyphenated().to_string(),
    })
}

/// Splits an EID into its prefix and the 128-bit value of its payload.
pub(crate) fn split(eid: Option<&str>) -> Result<(&str, u128), ExidError> {
    let Some((prefix, payload)) = eid.and_then(|s| s.split_once(SEPARATOR)) else {
        return Err(ExidError::invalid_eid(eid));
    };

    if prefix.is_empty() || payload.is_empty() {
        return Err(ExidError::invalid_eid(eid));
    }

    Ok((prefix, base62::decode(payload)?))
}
