//! Device registration and device descriptors.
//!
//! [`DeviceRegistration`] is what a client posts to `/devices`.
//! [`DeviceDescriptor`] is what the server returns: the registration plus the
//! server-assigned id, href and creation time. Descriptors are only ever built
//! by parsing a server response.
//!
//! Parsing never modifies an existing value half-way: the JSON is read into a
//! fresh value, every field goes through the same setters a caller would use,
//! and only a fully valid result is returned or committed.

use super::{
    DEVICE_ID_LEN, Error, MAX_ATTRIBUTE_LEN, MAX_ATTRIBUTES, MAX_CREATED_LEN,
    MAX_DESCRIPTION_LEN, MAX_HREF_LEN, MAX_NAME_LEN, bounded, non_empty,
};
use crate::json;
use alloc::string::String as AllocString;
use alloc::vec::Vec;
use heapless::{FnvIndexMap, String};
use serde::{Deserialize, Serialize};

/// Slots in the attribute map; must be a power of two of at least
/// [`MAX_ATTRIBUTES`].
const ATTRIBUTE_SLOTS: usize = 64;

/// Attribute key or value.
pub type AttributeString = String<MAX_ATTRIBUTE_LEN>;

/// Key/value attributes of a device.
pub type Attributes = FnvIndexMap<AttributeString, AttributeString, ATTRIBUTE_SLOTS>;

/// Information needed to register a new device.
///
/// ```rust
/// use iot_ticket::model::DeviceRegistration;
///
/// let mut device = DeviceRegistration::new();
/// device.set_name("MyTestDevice").unwrap();
/// device.set_manufacturer("Wapice").unwrap();
/// device.append_attribute("Firmware", "1.2.0").unwrap();
///
/// assert!(device.set_name("").is_err());
/// assert_eq!(device.name(), "MyTestDevice");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRegistration {
    name: String<MAX_NAME_LEN>,
    manufacturer: String<MAX_NAME_LEN>,
    kind: String<MAX_NAME_LEN>,
    description: String<MAX_DESCRIPTION_LEN>,
    attributes: Attributes,
}

impl DeviceRegistration {
    /// Creates an empty registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Short name of the device; required, 1 to 100 bytes.
    pub fn set_name(&mut self, name: &str) -> Result<(), Error> {
        self.name = non_empty(name)?;
        Ok(())
    }

    /// Short name of the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Manufacturer; required, 1 to 100 bytes.
    pub fn set_manufacturer(&mut self, manufacturer: &str) -> Result<(), Error> {
        self.manufacturer = non_empty(manufacturer)?;
        Ok(())
    }

    /// Manufacturer.
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Main category of the device; optional, 1 to 100 bytes when set.
    pub fn set_type(&mut self, kind: &str) -> Result<(), Error> {
        self.kind = non_empty(kind)?;
        Ok(())
    }

    /// Device type, empty if not set.
    pub fn device_type(&self) -> &str {
        &self.kind
    }

    /// Free-form description; optional, 1 to 255 bytes when set.
    pub fn set_description(&mut self, description: &str) -> Result<(), Error> {
        self.description = non_empty(description)?;
        Ok(())
    }

    /// Description, empty if not set.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replaces all attributes.
    ///
    /// Every entry of `attributes` is validated first; if any is rejected, or
    /// there are more than fifty distinct keys, the current attributes are
    /// kept unchanged.
    pub fn set_attributes<I, K, V>(&mut self, attributes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut scratch = Attributes::new();
        for (key, value) in attributes {
            insert_attribute(&mut scratch, key.as_ref(), value.as_ref())?;
        }
        self.attributes = scratch;
        Ok(())
    }

    /// Adds one attribute, replacing the value of an existing key.
    ///
    /// Keys and values must be 1 to 255 bytes; a fifty-first key is rejected.
    pub fn append_attribute(&mut self, key: &str, value: &str) -> Result<(), Error> {
        insert_attribute(&mut self.attributes, key, value)
    }

    /// Value of attribute `key`, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(candidate, _)| candidate.as_str() == key)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Encodes the registration as the body of `POST /devices`.
    ///
    /// Fails with [`Error::Empty`] if name or manufacturer is missing.
    pub fn to_json(&self) -> Result<AllocString, Error> {
        encode(&self.to_wire(None)?)
    }

    /// Parses a registration, validating every field.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let wire: WireDevice = json::from_slice(json.as_bytes()).ok_or(Error::InvalidJson)?;
        Self::from_wire(&wire)
    }

    /// Replaces `self` with the registration in `json`.
    ///
    /// On error `self` is left exactly as it was.
    pub fn load_json(&mut self, json: &str) -> Result<(), Error> {
        *self = Self::from_json(json)?;
        Ok(())
    }

    pub(crate) fn from_wire(wire: &WireDevice) -> Result<Self, Error> {
        let mut device = Self::new();
        device.set_name(wire.name.as_deref().ok_or(Error::MissingField)?)?;
        device.set_manufacturer(wire.manufacturer.as_deref().ok_or(Error::MissingField)?)?;
        if let Some(kind) = &wire.kind {
            device.set_type(kind)?;
        }
        if let Some(description) = &wire.description {
            device.set_description(description)?;
        }
        for attribute in wire.attributes.iter().flatten() {
            device.append_attribute(&attribute.key, &attribute.value)?;
        }
        Ok(device)
    }

    fn to_wire<'a>(
        &'a self,
        server: Option<&'a DeviceDescriptor>,
    ) -> Result<WireDeviceOut<'a>, Error> {
        if self.name.is_empty() || self.manufacturer.is_empty() {
            return Err(Error::Empty);
        }

        Ok(WireDeviceOut {
            device_id: server.map(|d| d.device_id.as_str()),
            href: server.map(|d| d.href.as_str()),
            created_at: server.map(|d| d.created_at.as_str()),
            name: &self.name,
            manufacturer: &self.manufacturer,
            kind: (!self.kind.is_empty()).then_some(self.kind.as_str()),
            description: (!self.description.is_empty()).then_some(self.description.as_str()),
            attributes: self
                .attributes
                .iter()
                .map(|(key, value)| WireAttribute {
                    key: key.as_str(),
                    value: value.as_str(),
                })
                .collect(),
        })
    }
}

fn insert_attribute(attributes: &mut Attributes, key: &str, value: &str) -> Result<(), Error> {
    let key: AttributeString = non_empty(key)?;
    let value: AttributeString = non_empty(value)?;

    if attributes.len() >= MAX_ATTRIBUTES && !attributes.contains_key(&key) {
        return Err(Error::TooManyAttributes);
    }
    attributes
        .insert(key, value)
        .map_err(|_| Error::TooManyAttributes)?;
    Ok(())
}

fn encode(wire: &WireDeviceOut<'_>) -> Result<AllocString, Error> {
    let bytes = json::to_vec(wire).map_err(|_| Error::InvalidJson)?;
    AllocString::from_utf8(bytes).map_err(|_| Error::InvalidJson)
}

/// A device as stored on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    device_id: String<DEVICE_ID_LEN>,
    href: String<MAX_HREF_LEN>,
    created_at: String<MAX_CREATED_LEN>,
    registration: DeviceRegistration,
}

impl DeviceDescriptor {
    /// Server-assigned id, exactly 32 characters.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// URL of the device resource.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Creation time as reported by the server.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// The registration data of the device.
    pub fn registration(&self) -> &DeviceRegistration {
        &self.registration
    }

    /// Consumes the descriptor, keeping only its registration data.
    pub fn into_registration(self) -> DeviceRegistration {
        self.registration
    }

    /// Encodes the descriptor with its server-assigned fields.
    pub fn to_json(&self) -> Result<AllocString, Error> {
        encode(&self.registration.to_wire(Some(self))?)
    }

    /// Parses a descriptor.
    ///
    /// `deviceId`, `href` and `createdAt` are required on top of the
    /// registration fields.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let wire: WireDevice = json::from_slice(json.as_bytes()).ok_or(Error::InvalidJson)?;
        Self::from_wire(&wire)
    }

    /// Replaces `self` with the descriptor in `json`, leaving it untouched on
    /// error.
    pub fn load_json(&mut self, json: &str) -> Result<(), Error> {
        *self = Self::from_json(json)?;
        Ok(())
    }

    pub(crate) fn from_wire(wire: &WireDevice) -> Result<Self, Error> {
        let device_id = wire.device_id.as_deref().ok_or(Error::MissingField)?;
        if device_id.len() != DEVICE_ID_LEN {
            return Err(Error::InvalidLength);
        }
        let device_id = bounded(device_id)?;
        let href = non_empty(wire.href.as_deref().ok_or(Error::MissingField)?)?;
        let created_at = non_empty(wire.created_at.as_deref().ok_or(Error::MissingField)?)?;
        let registration = DeviceRegistration::from_wire(wire)?;

        Ok(Self {
            device_id,
            href,
            created_at,
            registration,
        })
    }
}

/// JSON shape of a device, shared by registrations and descriptors.
#[derive(Debug, Deserialize)]
pub(crate) struct WireDevice {
    #[serde(rename = "deviceId", default)]
    device_id: Option<AllocString>,
    #[serde(default)]
    href: Option<AllocString>,
    #[serde(rename = "createdAt", default)]
    created_at: Option<AllocString>,
    #[serde(default)]
    name: Option<AllocString>,
    #[serde(default)]
    manufacturer: Option<AllocString>,
    #[serde(rename = "type", default)]
    kind: Option<AllocString>,
    #[serde(default)]
    description: Option<AllocString>,
    #[serde(default)]
    attributes: Option<Vec<WireAttribute<AllocString>>>,
}

#[derive(Debug, Serialize)]
struct WireDeviceOut<'a> {
    #[serde(rename = "deviceId", skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    href: Option<&'a str>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    created_at: Option<&'a str>,
    name: &'a str,
    manufacturer: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<WireAttribute<&'a str>>,
}

/// `{"key": .., "value": ..}`; borrowed when written, owned when read.
#[derive(Debug, Serialize, Deserialize)]
struct WireAttribute<S> {
    key: S,
    value: S,
}
