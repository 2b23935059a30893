//! # iot-ticket - IoT-Ticket client for embedded and hosted Rust
//!
//! A client library for the IoT-Ticket cloud data-logging service: register
//! devices, upload and download time-series measurements, inspect quotas and
//! discover datanodes over HTTP(S) with JSON payloads. The library is
//! `no_std` and needs only an allocator.
//!
//! ## Layers
//!
//! - [`model`]: measurement values, read series, device registrations, read
//!   filters and quota reports, with their validation and JSON encoding
//! - [`encoding`]: Base64 codec for binary values
//! - [`api`]: the protocol client and its error taxonomy
//! - [`network`]: connection traits and an HTTP/1.1 client the default
//!   transport is built on
//!
//! ## Usage
//!
//! ```rust
//! use iot_ticket::api::{Client, HttpTransport, Options, TransportRequest, TransportResponse};
//! use iot_ticket::model::MeasurementValue;
//! use iot_ticket::network::error::Error;
//!
//! // A transport that accepts every write.
//! struct Accepting;
//!
//! impl HttpTransport for Accepting {
//!     fn execute(&mut self, _request: &TransportRequest<'_>) -> Result<TransportResponse, Error> {
//!         Ok(TransportResponse { status: 200, body: br#"{"totalWritten":1}"#.to_vec() })
//!     }
//! }
//!
//! let options = Options::new("https://my.iot-ticket.com/api/v1", "user", "secret");
//! let mut client = Client::new(Accepting, options);
//!
//! let mut speed = MeasurementValue::new();
//! speed.set_name("Speed").unwrap();
//! speed.set_unit("km/h").unwrap();
//! speed.set_value(88i64);
//!
//! assert_eq!(client.send_one("0123456789abcdef0123456789abcdef", &speed), Ok(()));
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate alloc;

#[macro_use]
mod fmt;

mod json;

/// Base64 codec for binary measurement values.
pub mod encoding;

/// Data model: the values sent to and received from the service.
pub mod model;

/// Protocol client, transport capability and error taxonomy.
pub mod api;

/// Network abstraction layer providing connection traits and the HTTP client.
pub mod network;
