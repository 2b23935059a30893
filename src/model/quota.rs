//! Account and per-device quota reports.

use super::{DEVICE_ID_LEN, Error, bounded};
use crate::json;
use heapless::String;
use serde::Deserialize;

/// Usage and limits of the whole account, from `GET /quota/all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quota {
    total_devices: u64,
    max_number_of_devices: u64,
    max_datanodes_per_device: u64,
    used_storage_size: u64,
    max_storage_size: u64,
}

impl Quota {
    /// Parses a quota report. Every field is required.
    ///
    /// ```rust
    /// use iot_ticket::model::Quota;
    ///
    /// let quota = Quota::from_json(
    ///     r#"{"totalDevices":3,"maxNumberOfDevices":100,"maxDataNodePerDevice":50,
    ///        "usedStorageSize":1024,"maxStorageSize":1048576}"#,
    /// ).unwrap();
    /// assert_eq!(quota.total_devices(), 3);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let wire: WireQuota = json::from_slice(json.as_bytes()).ok_or(Error::InvalidJson)?;
        Self::from_wire(wire)
    }

    pub(crate) fn from_wire(wire: WireQuota) -> Result<Self, Error> {
        Ok(Self {
            total_devices: wire.total_devices.ok_or(Error::MissingField)?,
            max_number_of_devices: wire.max_number_of_devices.ok_or(Error::MissingField)?,
            max_datanodes_per_device: wire.max_datanodes_per_device.ok_or(Error::MissingField)?,
            used_storage_size: wire.used_storage_size.ok_or(Error::MissingField)?,
            max_storage_size: wire.max_storage_size.ok_or(Error::MissingField)?,
        })
    }

    /// Devices registered on the account.
    pub fn total_devices(&self) -> u64 {
        self.total_devices
    }

    /// Devices the account may register.
    pub fn max_number_of_devices(&self) -> u64 {
        self.max_number_of_devices
    }

    /// Datanodes allowed per device.
    pub fn max_datanodes_per_device(&self) -> u64 {
        self.max_datanodes_per_device
    }

    /// Storage in use, in bytes.
    pub fn used_storage_size(&self) -> u64 {
        self.used_storage_size
    }

    /// Storage available to the account, in bytes.
    pub fn max_storage_size(&self) -> u64 {
        self.max_storage_size
    }
}

/// Usage of one device, from `GET /quota/{deviceId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceQuota {
    device_id: String<DEVICE_ID_LEN>,
    total_requests_today: u64,
    max_read_requests_per_day: u64,
    number_of_datanodes: u64,
    storage_size: u64,
}

impl DeviceQuota {
    /// Parses a device quota report. Every field is required.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let wire: WireDeviceQuota =
            json::from_slice(json.as_bytes()).ok_or(Error::InvalidJson)?;
        Self::from_wire(wire)
    }

    pub(crate) fn from_wire(wire: WireDeviceQuota) -> Result<Self, Error> {
        let device_id = wire.device_id.as_deref().ok_or(Error::MissingField)?;
        if device_id.len() != DEVICE_ID_LEN {
            return Err(Error::InvalidLength);
        }

        Ok(Self {
            device_id: bounded(device_id)?,
            total_requests_today: wire.total_requests_today.ok_or(Error::MissingField)?,
            max_read_requests_per_day: wire.max_read_requests_per_day.ok_or(Error::MissingField)?,
            number_of_datanodes: wire.number_of_datanodes.ok_or(Error::MissingField)?,
            storage_size: wire.storage_size.ok_or(Error::MissingField)?,
        })
    }

    /// The device the report is about.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Read requests made today.
    pub fn total_requests_today(&self) -> u64 {
        self.total_requests_today
    }

    /// Read requests allowed per day.
    pub fn max_read_requests_per_day(&self) -> u64 {
        self.max_read_requests_per_day
    }

    /// Datanodes of the device.
    pub fn number_of_datanodes(&self) -> u64 {
        self.number_of_datanodes
    }

    /// Storage used by the device, in bytes.
    pub fn storage_size(&self) -> u64 {
        self.storage_size
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireQuota {
    #[serde(rename = "totalDevices", default)]
    total_devices: Option<u64>,
    #[serde(rename = "maxNumberOfDevices", default)]
    max_number_of_devices: Option<u64>,
    #[serde(rename = "maxDataNodePerDevice", default)]
    max_datanodes_per_device: Option<u64>,
    #[serde(rename = "usedStorageSize", default)]
    used_storage_size: Option<u64>,
    #[serde(rename = "maxStorageSize", default)]
    max_storage_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDeviceQuota {
    #[serde(rename = "deviceId", default)]
    device_id: Option<alloc::string::String>,
    #[serde(rename = "totalRequestToday", default)]
    total_requests_today: Option<u64>,
    #[serde(rename = "maxReadRequestPerDay", default)]
    max_read_requests_per_day: Option<u64>,
    #[serde(rename = "numberOfDataNodes", default)]
    number_of_datanodes: Option<u64>,
    #[serde(rename = "storageSize", default)]
    storage_size: Option<u64>,
}
