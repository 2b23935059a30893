//! Measurement series returned by read queries.
//!
//! The server sends every sample value as text, whatever the datanode's
//! type. [`ReadDataPoint`] keeps that text and converts it when asked, so a
//! series whose values do not parse can still be listed and inspected.

use super::{DataType, Error};
use crate::encoding;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::Deserialize;

/// Why a sample could not be converted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConversionError {
    /// No sample at the requested index.
    OutOfRange,
    /// The series' declared type is not the requested type.
    TypeMismatch,
    /// The stored text does not parse as the declared type.
    Malformed,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::OutOfRange => f.write_str("sample index out of range"),
            ConversionError::TypeMismatch => f.write_str("sample type mismatch"),
            ConversionError::Malformed => f.write_str("malformed sample value"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConversionError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConversionError::OutOfRange => defmt::write!(f, "OutOfRange"),
            ConversionError::TypeMismatch => defmt::write!(f, "TypeMismatch"),
            ConversionError::Malformed => defmt::write!(f, "Malformed"),
        }
    }
}

/// Types a stored sample can be converted to.
pub trait SampleValue: Sized {
    /// Converts the raw text of a sample from a series of type `data_type`.
    fn from_sample(raw: &str, data_type: DataType) -> Result<Self, ConversionError>;
}

fn expect_type(actual: DataType, expected: DataType) -> Result<(), ConversionError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ConversionError::TypeMismatch)
    }
}

impl SampleValue for i64 {
    fn from_sample(raw: &str, data_type: DataType) -> Result<Self, ConversionError> {
        expect_type(data_type, DataType::Long)?;
        raw.trim().parse().map_err(|_| ConversionError::Malformed)
    }
}

impl SampleValue for f64 {
    fn from_sample(raw: &str, data_type: DataType) -> Result<Self, ConversionError> {
        expect_type(data_type, DataType::Double)?;
        raw.trim().parse().map_err(|_| ConversionError::Malformed)
    }
}

impl SampleValue for bool {
    fn from_sample(raw: &str, data_type: DataType) -> Result<Self, ConversionError> {
        expect_type(data_type, DataType::Boolean)?;
        match raw {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConversionError::Malformed),
        }
    }
}

impl SampleValue for Vec<u8> {
    fn from_sample(raw: &str, data_type: DataType) -> Result<Self, ConversionError> {
        expect_type(data_type, DataType::Binary)?;
        encoding::decode(raw).map_err(|_| ConversionError::Malformed)
    }
}

/// Any sample can be read back as its raw text.
impl SampleValue for String {
    fn from_sample(raw: &str, _data_type: DataType) -> Result<Self, ConversionError> {
        Ok(raw.into())
    }
}

/// One datanode with the samples a read query returned for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadDataPoint {
    name: String,
    path: String,
    unit: String,
    data_type: DataType,
    samples: Vec<(u64, String)>,
}

impl ReadDataPoint {
    /// Parses one element of a `datanodeReads` or datanode `items` array.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let wire: WireSeries =
            crate::json::from_slice(json.as_bytes()).ok_or(Error::InvalidJson)?;
        Ok(Self::from_wire(wire))
    }

    pub(crate) fn from_wire(wire: WireSeries) -> Self {
        Self {
            name: wire.name,
            path: wire.path.unwrap_or_default(),
            unit: wire.unit.unwrap_or_default(),
            data_type: wire
                .data_type
                .as_deref()
                .map_or(DataType::None, DataType::from_wire),
            samples: wire
                .values
                .unwrap_or_default()
                .into_iter()
                .map(|sample| (sample.ts, sample.v))
                .collect(),
        }
    }

    /// Datanode name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Datanode path, empty if the datanode has none.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Unit, empty if the datanode has none.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Declared type of the series.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` for a series without samples, as returned by datanode listings.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of sample `index` in milliseconds since the Unix epoch.
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        self.samples.get(index).map(|(ts, _)| *ts)
    }

    /// The text the server sent for sample `index`.
    pub fn raw_value(&self, index: usize) -> Option<&str> {
        self.samples.get(index).map(|(_, raw)| raw.as_str())
    }

    /// Iterates `(timestamp, raw text)` pairs in server order.
    pub fn samples(&self) -> impl Iterator<Item = (u64, &str)> {
        self.samples.iter().map(|(ts, raw)| (*ts, raw.as_str()))
    }

    /// Converts sample `index` to `T`.
    ///
    /// ```rust
    /// use iot_ticket::model::ReadDataPoint;
    ///
    /// let series = ReadDataPoint::from_json(
    ///     r#"{"name":"Speed","dataType":"long","values":[{"ts":1,"v":"42"}]}"#,
    /// ).unwrap();
    /// assert_eq!(series.converted::<i64>(0), Ok(42));
    /// assert!(series.converted::<f64>(0).is_err());
    /// ```
    pub fn converted<T: SampleValue>(&self, index: usize) -> Result<T, ConversionError> {
        let raw = self
            .raw_value(index)
            .ok_or(ConversionError::OutOfRange)?;
        T::from_sample(raw, self.data_type)
    }
}

/// JSON shape of a datanode with its samples.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSeries {
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(rename = "dataType", default)]
    data_type: Option<String>,
    #[serde(default)]
    values: Option<Vec<WireSample>>,
}

#[derive(Debug, Deserialize)]
struct WireSample {
    ts: u64,
    v: String,
}
