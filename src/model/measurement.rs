//! Measurement values written to the server.
//!
//! A [`MeasurementValue`] is one sample of one datanode. The payload is a
//! [`Value`], a tagged union whose variant decides the `dataType` sent on the
//! wire, so the type and the payload can never disagree.
//!
//! ```rust
//! use iot_ticket::model::MeasurementValue;
//!
//! let mut value = MeasurementValue::new();
//! value.set_name("Temperature").unwrap();
//! value.set_path("Engine/Sensors").unwrap();
//! value.set_unit("C").unwrap();
//! value.set_value(21.5);
//! value.set_timestamp(1_438_150_524_000);
//!
//! let json = value.to_json().unwrap();
//! assert!(json.contains(r#""dataType":"double""#));
//! ```

use super::{DataType, Error, MAX_NAME_LEN, MAX_PATH_LEN, MAX_UNIT_LEN, bounded, validate_path};
use crate::encoding;
use alloc::string::String as AllocString;
use alloc::vec::Vec;
use heapless::String;
use serde::Serialize;

/// Payload of a measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Sent as a JSON number with `dataType` `double`.
    Double(f64),
    /// Sent as a JSON number with `dataType` `long`.
    Long(i64),
    /// Sent as a JSON boolean with `dataType` `boolean`.
    Boolean(bool),
    /// Sent verbatim with `dataType` `string`.
    String(AllocString),
    /// Sent Base64 encoded with `dataType` `binary`.
    Binary(Vec<u8>),
}

impl Value {
    /// The data type this payload is sent as.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Double(_) => DataType::Double,
            Value::Long(_) => DataType::Long,
            Value::Boolean(_) => DataType::Boolean,
            Value::String(_) => DataType::String,
            Value::Binary(_) => DataType::Binary,
        }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        match self {
            Value::Double(_) => core::mem::size_of::<f64>(),
            Value::Long(_) => core::mem::size_of::<i64>(),
            Value::Boolean(_) => core::mem::size_of::<bool>(),
            Value::String(text) => text.len(),
            Value::Binary(bytes) => bytes.len(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<AllocString> for Value {
    fn from(value: AllocString) -> Self {
        Value::String(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

/// One measurement of one datanode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementValue {
    name: String<MAX_NAME_LEN>,
    path: String<MAX_PATH_LEN>,
    unit: String<MAX_UNIT_LEN>,
    timestamp: u64,
    value: Option<Value>,
}

impl MeasurementValue {
    /// Creates an empty measurement with no value and no timestamp.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the datanode name (at most 100 bytes).
    pub fn set_name(&mut self, name: &str) -> Result<(), Error> {
        self.name = bounded(name)?;
        Ok(())
    }

    /// The datanode name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the datanode path, e.g. `Engine/Sensors`.
    ///
    /// At most 1000 bytes of `[0-9a-zA-Z/]`, at most ten levels and no empty
    /// levels.
    pub fn set_path(&mut self, path: &str) -> Result<(), Error> {
        validate_path(path)?;
        self.path = bounded(path)?;
        Ok(())
    }

    /// The datanode path, empty if not set.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sets the unit (at most 10 bytes).
    pub fn set_unit(&mut self, unit: &str) -> Result<(), Error> {
        self.unit = bounded(unit)?;
        Ok(())
    }

    /// The unit, empty if not set.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Replaces the payload and with it the data type.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = Some(value.into());
    }

    /// The payload, if one was set.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The data type of the current payload.
    pub fn data_type(&self) -> DataType {
        self.value
            .as_ref()
            .map_or(DataType::None, Value::data_type)
    }

    /// Sets the sample time in milliseconds since the Unix epoch.
    ///
    /// Zero means "unset": no `ts` is sent and the server stamps the value.
    pub fn set_timestamp(&mut self, timestamp_ms: u64) {
        self.timestamp = timestamp_ms;
    }

    /// Lets the server assign the timestamp.
    pub fn clear_timestamp(&mut self) {
        self.timestamp = 0;
    }

    /// The sample time in milliseconds since the Unix epoch, 0 if unset.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Stamps the measurement with the current system time.
    #[cfg(feature = "std")]
    pub fn set_time_to_now(&mut self) {
        if let Ok(elapsed) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            self.timestamp = elapsed.as_millis() as u64;
        }
    }

    /// Encodes this measurement as a JSON object.
    ///
    /// Fails if the name is empty, no value is set, the value is an empty
    /// string or byte sequence, or a double is not finite.
    pub fn to_json(&self) -> Result<AllocString, Error> {
        let wire = self.to_wire()?;
        let bytes = crate::json::to_vec(&wire).map_err(|_| Error::InvalidJson)?;
        AllocString::from_utf8(bytes).map_err(|_| Error::InvalidJson)
    }

    pub(crate) fn to_wire(&self) -> Result<WireMeasurement<'_>, Error> {
        if self.name.is_empty() {
            return Err(Error::Empty);
        }
        let value = self.value.as_ref().ok_or(Error::MissingValue)?;
        if value.size() == 0 {
            return Err(Error::MissingValue);
        }

        let v = match value {
            Value::Double(number) if !number.is_finite() => return Err(Error::NonFiniteValue),
            Value::Double(number) => WirePayload::Double(*number),
            Value::Long(number) => WirePayload::Long(*number),
            Value::Boolean(flag) => WirePayload::Boolean(*flag),
            Value::String(text) => WirePayload::Text(text.as_str()),
            Value::Binary(bytes) => WirePayload::Encoded(encoding::encode(bytes)),
        };

        Ok(WireMeasurement {
            name: &self.name,
            path: (!self.path.is_empty()).then_some(self.path.as_str()),
            v,
            data_type: value.data_type().as_wire().unwrap_or_default(),
            ts: (self.timestamp != 0).then_some(self.timestamp),
            unit: (!self.unit.is_empty()).then_some(self.unit.as_str()),
        })
    }
}

/// JSON shape of one element of a `/process/write` body.
#[derive(Debug, Serialize)]
pub(crate) struct WireMeasurement<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    v: WirePayload<'a>,
    #[serde(rename = "dataType")]
    data_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePayload<'a> {
    Double(f64),
    Long(i64),
    Boolean(bool),
    Text(&'a str),
    Encoded(AllocString),
}
