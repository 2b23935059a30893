//! JSON helpers on top of `serde-json-core`.
//!
//! `serde-json-core` writes into caller-provided slices. Request bodies here
//! have no fixed upper size (a write batch can hold any number of values), so
//! [`to_vec`] retries with a doubled buffer until the value fits.

use alloc::vec;
use alloc::vec::Vec;
use serde::Serialize;
use serde::de::DeserializeOwned;

const INITIAL_CAPACITY: usize = 256;
const MAX_CAPACITY: usize = 16 * 1024 * 1024;

/// Error returned when a value cannot be written as JSON.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct SerializeError;

/// Serializes `value` into a freshly allocated buffer.
pub(crate) fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerializeError> {
    let mut capacity = INITIAL_CAPACITY;
    loop {
        let mut buf = vec![0u8; capacity];
        match serde_json_core::to_slice(value, &mut buf) {
            Ok(len) => {
                buf.truncate(len);
                return Ok(buf);
            }
            Err(serde_json_core::ser::Error::BufferFull) if capacity < MAX_CAPACITY => {
                capacity *= 2;
            }
            Err(_) => return Err(SerializeError),
        }
    }
}

/// Deserializes a complete JSON document into owned values.
///
/// Escape sequences in strings are decoded. An unescaped string is never
/// longer than its escaped form, so a scratch buffer of the input's size
/// holds any of them.
pub(crate) fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Option<T> {
    let mut scratch = vec![0u8; input.len()];
    serde_json_core::from_slice_escaped::<T>(input, &mut scratch)
        .ok()
        .map(|(value, _)| value)
}
