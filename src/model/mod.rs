//! Data model of the IoT-Ticket API.
//!
//! Every length-limited field is stored in a [`heapless::String`] whose
//! capacity is the limit itself, so an out-of-range value can never be
//! constructed. Setters validate first and only then overwrite, leaving the
//! previous value in place when they return an [`Error`].
//!
//! | Type | Direction |
//! |---|---|
//! | [`MeasurementValue`] | written to `/process/write` |
//! | [`ReadDataPoint`] | returned by `/process/read` and `/devices/{id}/datanodes` |
//! | [`ReadFilter`] | query string of `/process/read` |
//! | [`DeviceRegistration`] | posted to `/devices` |
//! | [`DeviceDescriptor`] | returned by `/devices` |
//! | [`Quota`], [`DeviceQuota`] | returned by `/quota` |

use heapless::String;

pub mod device;
pub mod error;
pub mod filter;
pub mod measurement;
pub mod quota;
pub mod series;

pub use device::{DeviceDescriptor, DeviceRegistration};
pub use error::Error;
pub use filter::ReadFilter;
pub use measurement::{MeasurementValue, Value};
pub use quota::{DeviceQuota, Quota};
pub use series::{ConversionError, ReadDataPoint, SampleValue};

/// Maximum length of names, manufacturers and device types.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum length of a device description.
pub const MAX_DESCRIPTION_LEN: usize = 255;
/// Maximum length of an attribute key or value.
pub const MAX_ATTRIBUTE_LEN: usize = 255;
/// Maximum number of attributes on one device.
pub const MAX_ATTRIBUTES: usize = 50;
/// Maximum length of a datanode path.
pub const MAX_PATH_LEN: usize = 1000;
/// Maximum number of levels in a datanode path.
pub const MAX_PATH_DEPTH: usize = 10;
/// Maximum length of a unit.
pub const MAX_UNIT_LEN: usize = 10;
/// Maximum length of a device href.
pub const MAX_HREF_LEN: usize = 200;
/// Maximum length of a device creation timestamp.
pub const MAX_CREATED_LEN: usize = 40;
/// Exact length of a server-assigned device id.
pub const DEVICE_ID_LEN: usize = 32;

/// Data types understood by the server.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum DataType {
    /// No value set, or a type name the client does not know.
    #[default]
    None,
    /// 64-bit floating point.
    Double,
    /// 64-bit signed integer.
    Long,
    /// UTF-8 text.
    String,
    /// `true` / `false`.
    Boolean,
    /// Raw bytes, Base64 on the wire.
    Binary,
}

impl DataType {
    /// The `dataType` string used on the wire, `None` for [`DataType::None`].
    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            DataType::None => None,
            DataType::Double => Some("double"),
            DataType::Long => Some("long"),
            DataType::String => Some("string"),
            DataType::Boolean => Some("boolean"),
            DataType::Binary => Some("binary"),
        }
    }

    /// Parses a `dataType` string; unknown names map to [`DataType::None`].
    pub fn from_wire(name: &str) -> Self {
        match name {
            "double" => DataType::Double,
            "long" => DataType::Long,
            "string" => DataType::String,
            "boolean" => DataType::Boolean,
            "binary" => DataType::Binary,
            _ => DataType::None,
        }
    }
}

/// Ordering of the samples returned by a read query.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum DataOrder {
    /// Let the server decide; no `order` parameter is sent.
    #[default]
    Default,
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

impl DataOrder {
    pub(crate) fn as_query(&self) -> Option<&'static str> {
        match self {
            DataOrder::Default => None,
            DataOrder::Ascending => Some("ascending"),
            DataOrder::Descending => Some("descending"),
        }
    }
}

/// Copies `value` into a bounded string, failing if it does not fit.
pub(crate) fn bounded<const N: usize>(value: &str) -> Result<String<N>, Error> {
    String::try_from(value).map_err(|_| Error::TooLong)
}

/// Like [`bounded`] but also rejects the empty string.
pub(crate) fn non_empty<const N: usize>(value: &str) -> Result<String<N>, Error> {
    if value.is_empty() {
        return Err(Error::Empty);
    }
    bounded(value)
}

/// Checks a datanode path: `[0-9a-zA-Z/]` only, no `//`, at most ten levels.
pub(crate) fn validate_path(path: &str) -> Result<(), Error> {
    if path.len() > MAX_PATH_LEN {
        return Err(Error::TooLong);
    }
    if !path.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'/') {
        return Err(Error::InvalidCharacter);
    }
    if path.contains("//") {
        return Err(Error::EmptyPathSegment);
    }

    // A leading slash does not open a level.
    let depth = path.bytes().skip(1).filter(|&b| b == b'/').count();
    if depth > MAX_PATH_DEPTH {
        return Err(Error::PathTooDeep);
    }

    Ok(())
}
