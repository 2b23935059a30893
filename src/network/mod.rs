//! Connection abstraction used by the HTTP transport.
//!
//! The crate never opens sockets itself. Platforms provide a [`Connect`]
//! implementation (plain TCP, TLS, a modem AT-command stack, ...) and the
//! [`application::http`] client speaks HTTP/1.1 over whatever
//! [`Connection`] it hands out.

#![allow(missing_docs)]
#![deny(unsafe_code)]

use core::time::Duration;

/// Common error types for network operations
pub mod error;

/// Application layer protocols
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Byte source of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection; `Ok(0)` means the peer closed it.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte sink of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Orderly shutdown of a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Open a connection to `remote`.
    ///
    /// The HTTP transport passes `scheme://host:port`; connectors that only
    /// support one scheme should refuse the others with
    /// [`error::Error::InvalidAddress`].
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;

    /// Timeout for connecting and for every read and write on connections
    /// opened afterwards. Connectors without timeout support ignore it.
    fn set_timeout(&mut self, _timeout: Duration) {}
}
