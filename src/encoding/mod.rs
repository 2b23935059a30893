//! Base64 codec for binary measurement values.
//!
//! Binary payloads travel as text inside the JSON bodies, encoded with the
//! standard RFC 4648 alphabet (`A-Z a-z 0-9 + /`) and `=` padding. The actual
//! bit shuffling is done by [`base64ct`]; this module adds the input checks
//! that decide which [`Error`] a malformed string reports.
//!
//! ```rust
//! use iot_ticket::encoding;
//!
//! assert_eq!(encoding::encode(b"fo"), "Zm8=");
//! assert_eq!(encoding::decode("Zm8=").unwrap(), b"fo");
//! assert!(encoding::decode("Zm8").is_err());
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use base64ct::{Base64, Encoding};
use core::fmt;

const PAD: u8 = b'=';

/// Errors reported by [`decode`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// Input length is not a multiple of four.
    InvalidLength,
    /// A character outside the alphabet and the padding character.
    InvalidCharacter,
    /// Padding before the last one or two characters of the final quantum.
    InvalidPadding,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength => f.write_str("base64 length is not a multiple of 4"),
            Error::InvalidCharacter => f.write_str("invalid base64 character"),
            Error::InvalidPadding => f.write_str("misplaced base64 padding"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidLength => defmt::write!(f, "InvalidLength"),
            Error::InvalidCharacter => defmt::write!(f, "InvalidCharacter"),
            Error::InvalidPadding => defmt::write!(f, "InvalidPadding"),
        }
    }
}

/// Encodes `input` as padded standard Base64.
///
/// Empty input gives an empty string. One trailing byte is padded with `==`,
/// two trailing bytes with a single `=`.
pub fn encode(input: &[u8]) -> String {
    Base64::encode_string(input)
}

/// Decodes padded standard Base64.
///
/// A final quantum with one `=` yields two bytes, with `==` one byte. Bits
/// of the last character that the padding leaves unused are ignored, so
/// `Zh==` decodes like `Zg==`.
pub fn decode(input: &str) -> Result<Vec<u8>, Error> {
    validate(input.as_bytes())?;

    let mut text = input.as_bytes().to_vec();
    clear_unused_bits(&mut text);
    let text = core::str::from_utf8(&text).map_err(|_| Error::InvalidCharacter)?;
    Base64::decode_vec(text).map_err(|_| Error::InvalidPadding)
}

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Masks the low bits of the last data character of a padded final quantum.
///
/// `input` must already have passed [`validate`].
fn clear_unused_bits(input: &mut [u8]) {
    let len = input.len();
    let (index, mask) = match &*input {
        [.., _, PAD, PAD] => (len - 3, 0b11_0000),
        [.., _, PAD] => (len - 2, 0b11_1100),
        _ => return,
    };
    input[index] = ALPHABET[usize::from(sextet(input[index]) & mask)];
}

fn sextet(byte: u8) -> u8 {
    match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        _ => 63,
    }
}

/// Checks length, alphabet and padding placement.
fn validate(input: &[u8]) -> Result<(), Error> {
    if input.len() % 4 != 0 {
        return Err(Error::InvalidLength);
    }

    // Padding may only occupy the last two positions.
    let padding_start = input.len().saturating_sub(2);
    let mut padded = false;

    for (index, &byte) in input.iter().enumerate() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => {
                if padded {
                    return Err(Error::InvalidPadding);
                }
            }
            PAD => {
                if index < padding_start {
                    return Err(Error::InvalidPadding);
                }
                padded = true;
            }
            _ => return Err(Error::InvalidCharacter),
        }
    }

    Ok(())
}
