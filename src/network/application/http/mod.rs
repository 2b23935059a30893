//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! The client writes one request, then reads the response head and a body
//! framed by `Content-Length`, chunked transfer encoding, or the peer closing
//! the connection. The body is collected on the heap up to a caller-chosen
//! limit; anything larger fails with
//! [`Error::ResponseTooLarge`](crate::network::error::Error::ResponseTooLarge).
//!
//! ```rust,no_run
//! use iot_ticket::network::application::http::{Client, Method, Request};
//! # use iot_ticket::network::Connection;
//! # use iot_ticket::network::error::Error;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl iot_ticket::network::Read for MockConnection {
//! #     type Error = Error;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl iot_ticket::network::Write for MockConnection {
//! #     type Error = Error;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl iot_ticket::network::Close for MockConnection {
//! #     type Error = Error;
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let connection = MockConnection;
//! let mut client = Client::new(connection);
//!
//! let request = Request {
//!     method: Method::Get,
//!     path: "/api/status",
//!     headers: heapless::Vec::new(),
//!     body: None,
//! };
//!
//! // let response = client.request(&request)?;
//! ```

/// HTTP client implementation and supporting types.
pub mod client;

pub use client::{Client, Header, Method, Request, Response};
