//! Common error types for network operations

use core::fmt;

/// A common error type for network operations.
///
/// Connectors and connections report failures with these kinds so the layers
/// above can tell a refused connection from a broken response.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// A timeout occurred.
    Timeout,
    /// The connection was closed.
    ConnectionClosed,
    /// An invalid address was provided.
    InvalidAddress,
    /// The TLS handshake or session failed.
    Tls,
    /// A protocol-specific error occurred.
    ProtocolError,
    /// The peer sent more data than the caller allowed.
    ResponseTooLarge,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::NotOpen => "connection not open",
            Error::WriteError => "write failed",
            Error::ReadError => "read failed",
            Error::ConnectionRefused => "connection refused",
            Error::Timeout => "timed out",
            Error::ConnectionClosed => "connection closed",
            Error::InvalidAddress => "invalid address",
            Error::Tls => "TLS failure",
            Error::ProtocolError => "protocol error",
            Error::ResponseTooLarge => "response too large",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::Tls => defmt::write!(f, "Tls"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::ResponseTooLarge => defmt::write!(f, "ResponseTooLarge"),
        }
    }
}
