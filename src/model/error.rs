//! Validation and (de)serialization errors for the data model.

use core::fmt;

/// An error raised while validating or converting a model value.
///
/// Setters return this instead of panicking and leave the target untouched.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A required field was empty.
    Empty,
    /// A field exceeded its maximum length.
    TooLong,
    /// A field must have an exact length and did not.
    InvalidLength,
    /// A path contained a character outside `[0-9a-zA-Z/]`.
    InvalidCharacter,
    /// A path had more than ten levels.
    PathTooDeep,
    /// A path contained `//`.
    EmptyPathSegment,
    /// The attribute map would exceed fifty entries.
    TooManyAttributes,
    /// A measurement had no value, or an empty string/binary value.
    MissingValue,
    /// A double value was NaN or infinite.
    NonFiniteValue,
    /// The input was not the JSON shape this type expects.
    InvalidJson,
    /// A field required by the server representation was absent.
    MissingField,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Error::Empty => "field is empty",
            Error::TooLong => "field is too long",
            Error::InvalidLength => "field has the wrong length",
            Error::InvalidCharacter => "path contains an invalid character",
            Error::PathTooDeep => "path is too deep",
            Error::EmptyPathSegment => "path contains an empty segment",
            Error::TooManyAttributes => "too many attributes",
            Error::MissingValue => "measurement has no value",
            Error::NonFiniteValue => "measurement value is not finite",
            Error::InvalidJson => "invalid JSON",
            Error::MissingField => "required field missing",
        };
        f.write_str(message)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Empty => defmt::write!(f, "Empty"),
            Error::TooLong => defmt::write!(f, "TooLong"),
            Error::InvalidLength => defmt::write!(f, "InvalidLength"),
            Error::InvalidCharacter => defmt::write!(f, "InvalidCharacter"),
            Error::PathTooDeep => defmt::write!(f, "PathTooDeep"),
            Error::EmptyPathSegment => defmt::write!(f, "EmptyPathSegment"),
            Error::TooManyAttributes => defmt::write!(f, "TooManyAttributes"),
            Error::MissingValue => defmt::write!(f, "MissingValue"),
            Error::NonFiniteValue => defmt::write!(f, "NonFiniteValue"),
            Error::InvalidJson => defmt::write!(f, "InvalidJson"),
            Error::MissingField => defmt::write!(f, "MissingField"),
        }
    }
}
