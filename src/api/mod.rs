//! Client for the IoT-Ticket REST API.
//!
//! [`Client`] turns model values into requests, hands them to an
//! [`HttpTransport`] and maps the answer to a typed result or an [`Error`].
//!
//! ```rust,no_run
//! use iot_ticket::api::{Client, ConnectionTransport, Options};
//! use iot_ticket::model::MeasurementValue;
//! # use iot_ticket::network::error::Error;
//! # use iot_ticket::network::{Close, Connect, Connection, Read, Write};
//! # struct Tcp;
//! # impl Connection for Tcp {}
//! # impl Read for Tcp {
//! #     type Error = Error;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Tcp {
//! #     type Error = Error;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for Tcp {
//! #     type Error = Error;
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Network;
//! # impl Connect for Network {
//! #     type Connection = Tcp;
//! #     type Error = Error;
//! #     fn connect(&mut self, _remote: &str) -> Result<Tcp, Error> { Ok(Tcp) }
//! # }
//!
//! let options = Options::new("https://my.iot-ticket.com/api/v1/", "user", "secret");
//! let mut client = Client::new(ConnectionTransport::new(Network), options);
//!
//! let mut value = MeasurementValue::new();
//! value.set_name("Temperature").unwrap();
//! value.set_value(21.5);
//!
//! client.send_one("0123456789abcdef0123456789abcdef", &value)?;
//! # Ok::<(), iot_ticket::api::Error>(())
//! ```

pub mod error;
pub mod transport;

pub use error::Error;
pub use transport::{
    ConnectionTransport, HttpTransport, Method, TransportRequest, TransportResponse,
};

use crate::json;
use crate::model::device::WireDevice;
use crate::model::measurement::WireMeasurement;
use crate::model::quota::{WireDeviceQuota, WireQuota};
use crate::model::series::WireSeries;
use crate::model::{
    DeviceDescriptor, DeviceQuota, DeviceRegistration, MeasurementValue, Quota, ReadDataPoint,
    ReadFilter,
};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Timeout used when [`Options::new`] builds the options.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
/// Response size limit used when [`Options::new`] builds the options.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 50_000;

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json"),
    ("Content-Type", "application/json"),
    ("charsets", "utf-8"),
];

/// Connection settings of a [`Client`].
///
/// ```rust
/// use core::time::Duration;
/// use iot_ticket::api::Options;
///
/// let options = Options {
///     timeout: Duration::from_secs(5),
///     ..Options::new("https://my.iot-ticket.com/api/v1", "user", "secret")
/// };
/// assert_eq!(options.max_response_size, 50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options<'a> {
    /// Address all resource paths are appended to, e.g.
    /// `https://my.iot-ticket.com/api/v1`. One trailing `/` is ignored.
    pub base_url: &'a str,
    /// Basic auth user. Requests carry no credentials when it is empty.
    pub username: &'a str,
    /// Basic auth password.
    pub password: &'a str,
    /// Handed to the transport with every request.
    pub timeout: Duration,
    /// Longest response body accepted, in bytes.
    pub max_response_size: usize,
}

impl<'a> Options<'a> {
    /// Options with the default timeout and response size limit.
    pub fn new(base_url: &'a str, username: &'a str, password: &'a str) -> Self {
        Self {
            base_url,
            username,
            password,
            timeout: DEFAULT_TIMEOUT,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

/// IoT-Ticket API client.
///
/// Every call performs exactly one request; nothing is retried or cached.
#[derive(Debug)]
pub struct Client<'a, T: HttpTransport> {
    transport: T,
    options: Options<'a>,
}

impl<'a, T: HttpTransport> Client<'a, T> {
    /// Creates a client sending requests through `transport`.
    pub fn new(transport: T, mut options: Options<'a>) -> Self {
        if let Some(base) = options.base_url.strip_suffix('/') {
            options.base_url = base;
        }
        Self { transport, options }
    }

    /// The options in use, with the trailing `/` of the base address removed.
    pub fn options(&self) -> &Options<'a> {
        &self.options
    }

    /// Gives the transport back.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Lists the devices of the account.
    ///
    /// Entries the server sends that are not valid descriptors are skipped.
    pub fn devices(&mut self) -> Result<Vec<DeviceDescriptor>, Error> {
        let body = self.exchange(Method::Get, "/devices", None)?;
        let list: ItemList<WireDevice> = decode(&body)?;

        let mut devices = Vec::with_capacity(list.items.len());
        for item in &list.items {
            match DeviceDescriptor::from_wire(item) {
                Ok(device) => devices.push(device),
                Err(error) => warn!("skipping invalid device: {}", error),
            }
        }
        Ok(devices)
    }

    /// Fetches one device.
    pub fn device(&mut self, device_id: &str) -> Result<DeviceDescriptor, Error> {
        let body = self.exchange(Method::Get, &format!("/devices/{}", device_id), None)?;
        let wire: WireDevice = decode(&body)?;
        DeviceDescriptor::from_wire(&wire).map_err(|_| shape_error(&body))
    }

    /// Registers a device and returns the id the server assigned to it.
    ///
    /// Fails with [`Error::BadParam`] before sending anything if the
    /// registration has no name or manufacturer.
    pub fn register_device(&mut self, device: &DeviceRegistration) -> Result<String, Error> {
        let request = device.to_json()?;
        let body = self.exchange(Method::Post, "/devices", Some(request.as_bytes()))?;
        let reply: Registered = decode(&body)?;
        Ok(reply.device_id)
    }

    /// Writes a batch of measurements to a device.
    ///
    /// Succeeds only if the server confirms every value; a partial write is
    /// reported as [`Error::WriteFailed`]. An empty batch or a value that
    /// cannot be encoded fails with [`Error::BadParam`] without a request.
    pub fn send(&mut self, device_id: &str, values: &[MeasurementValue]) -> Result<(), Error> {
        if values.is_empty() {
            return Err(Error::BadParam);
        }
        let batch = values
            .iter()
            .map(MeasurementValue::to_wire)
            .collect::<Result<Vec<WireMeasurement<'_>>, _>>()?;
        let request = json::to_vec(&batch).map_err(|_| Error::BadParam)?;

        let resource = format!("/process/write/{}", device_id);
        let body = self.exchange(Method::Post, &resource, Some(request.as_slice()))?;
        let reply: Written = decode(&body)?;

        if reply.total_written != values.len() as u64 {
            warn!(
                "server wrote {} of {} values",
                reply.total_written,
                values.len()
            );
            return Err(Error::WriteFailed);
        }
        Ok(())
    }

    /// Writes a single measurement.
    pub fn send_one(&mut self, device_id: &str, value: &MeasurementValue) -> Result<(), Error> {
        self.send(device_id, core::slice::from_ref(value))
    }

    /// Reads stored measurements selected by `filter`.
    ///
    /// Fails as a whole if any returned series is malformed.
    pub fn read(
        &mut self,
        device_id: &str,
        filter: &ReadFilter,
    ) -> Result<Vec<ReadDataPoint>, Error> {
        let resource = format!(
            "/process/read/{}{}",
            device_id,
            filter.build_parameter_string()
        );
        let body = self.exchange(Method::Get, &resource, None)?;
        let reply: Reads = decode(&body)?;
        Ok(reply
            .datanode_reads
            .into_iter()
            .map(ReadDataPoint::from_wire)
            .collect())
    }

    /// Lists the datanodes of a device, without samples.
    pub fn datanodes(&mut self, device_id: &str) -> Result<Vec<ReadDataPoint>, Error> {
        let resource = format!("/devices/{}/datanodes", device_id);
        let body = self.exchange(Method::Get, &resource, None)?;
        let list: ItemList<WireSeries> = decode(&body)?;
        Ok(list.items.into_iter().map(ReadDataPoint::from_wire).collect())
    }

    /// Usage and limits of the whole account.
    pub fn quota(&mut self) -> Result<Quota, Error> {
        let body = self.exchange(Method::Get, "/quota/all", None)?;
        let wire: WireQuota = decode(&body)?;
        Quota::from_wire(wire).map_err(|_| shape_error(&body))
    }

    /// Usage of one device.
    pub fn device_quota(&mut self, device_id: &str) -> Result<DeviceQuota, Error> {
        let body = self.exchange(Method::Get, &format!("/quota/{}", device_id), None)?;
        let wire: WireDeviceQuota = decode(&body)?;
        DeviceQuota::from_wire(wire).map_err(|_| shape_error(&body))
    }

    /// Performs one request and returns the body of a successful response.
    fn exchange(
        &mut self,
        method: Method,
        resource: &str,
        body: Option<&[u8]>,
    ) -> Result<Vec<u8>, Error> {
        let url = format!("{}{}", self.options.base_url, resource);
        debug!("{} {}", method.as_str(), url.as_str());

        let request = TransportRequest {
            method,
            url: &url,
            headers: DEFAULT_HEADERS,
            username: self.options.username,
            password: self.options.password,
            body,
            timeout: self.options.timeout,
            max_response_size: self.options.max_response_size,
        };
        let response = self.transport.execute(&request).map_err(|error| {
            warn!("request failed: {}", error);
            Error::from(error)
        })?;

        match response.status {
            200..=202 => Ok(response.body),
            401 => Err(Error::Auth),
            status => {
                let error = json::from_slice::<ErrorBody>(&response.body)
                    .and_then(|reply| reply.code)
                    .map_or(Error::General, Error::from_code);
                warn!("server answered {}: {}", status, error);
                Err(error)
            }
        }
    }
}

/// Parses a success body, falling back to the error `code` it may carry.
fn decode<W: DeserializeOwned>(body: &[u8]) -> Result<W, Error> {
    json::from_slice(body).ok_or_else(|| shape_error(body))
}

/// Error for a success status whose body is not the expected shape.
fn shape_error(body: &[u8]) -> Error {
    json::from_slice::<ErrorBody>(body)
        .and_then(|reply| reply.code)
        .map_or(Error::InvalidResponse, Error::from_code)
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
}

#[derive(Deserialize)]
struct ItemList<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct Registered {
    #[serde(rename = "deviceId")]
    device_id: String,
}

#[derive(Deserialize)]
struct Written {
    #[serde(rename = "totalWritten")]
    total_written: u64,
}

#[derive(Deserialize)]
struct Reads {
    #[serde(rename = "datanodeReads")]
    datanode_reads: Vec<WireSeries>,
}
