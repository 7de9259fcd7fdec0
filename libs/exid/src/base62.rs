//! Fixed-width Base62 codec for 128-bit values.
//!
//! The alphabet is `0-9`, then `a-z`, then `A-Z`. A character's value is its
//! position in that sequence, which is *not* ASCII order. Every EID ever
//! issued depends on this exact ordering.

use crate::error::ExidError;

/// The Base62 alphabet, in value order.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of symbols in the alphabet.
pub const BASE: u128 = 62;

/// Encoded width of a payload. 62^22 > 2^128, so every `u128` fits.
pub const ENCODED_LEN: usize = 22;

/// Returns the value of an alphabet character, if it is one.
fn value_of(c: char) -> Option<u128> {
    let v = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'a'..='z' => c as u32 - 'a' as u32 + 10,
        'A'..='Z' => c as u32 - 'A' as u32 + 36,
        _ => return None,
    };
    Some(u128::from(v))
}

/// Encodes a value as a 22-character, zero-padded Base62 string.
#[must_use]
pub fn encode(mut n: u128) -> String {
    let mut buf = [ALPHABET[0]; ENCODED_LEN];
    let mut pos = ENCODED_LEN;

    while n > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }

    buf.iter().map(|&b| b as char).collect()
}

/// Decodes a Base62 string of any length.
///
/// The empty string decodes to 0. Leading zero characters are allowed, so
/// unpadded input is accepted as well.
pub fn decode(s: &str) -> Result<u128, ExidError> {
    s.chars().try_fold(0u128, |acc, c| {
        let v = value_of(c).ok_or_else(|| ExidError::InvalidCharacter {
            character: c,
            input: s.to_string(),
        })?;

        acc.checked_mul(BASE)
            .and_then(|acc| acc.checked_add(v))
            .ok_or_else(|| ExidError::Overflow {
                input: s.to_string(),
            })
    })
}
