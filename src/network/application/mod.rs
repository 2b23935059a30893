//! # Application Layer Network Protocols
//!
//! Protocol clients that work with any type implementing
//! [`Connection`](crate::network::Connection).

/// HTTP client implementation.
///
/// A small HTTP/1.1 client that sends one request per connection and reads
/// the response into a size-limited buffer.
pub mod http;
