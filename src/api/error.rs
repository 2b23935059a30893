//! Errors returned by [`Client`](super::Client) operations.

use crate::model;
use crate::network::error::Error as NetworkError;
use core::fmt;

/// Application error code for a generic server failure.
pub const CODE_GENERAL: i64 = 8000;
/// Application error code for a permission failure.
pub const CODE_ACCESS: i64 = 8001;
/// Application error code for an exceeded quota.
pub const CODE_QUOTA: i64 = 8002;
/// Application error code for a rejected parameter.
pub const CODE_BAD_PARAM: i64 = 8003;
/// Application error code for a failed write.
pub const CODE_WRITE_FAILED: i64 = 8004;

/// Why an API call failed.
///
/// The first five variants come from the transport, the next five from the
/// `code` field of a server error body.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The server answered 401: the credentials were rejected.
    Auth,
    /// The server could not be reached, or the connection dropped or timed out.
    Connection,
    /// TLS setup or session failure.
    Tls,
    /// The base address is not a usable URL.
    MalformedUrl,
    /// The exchange failed after connecting: write, read, HTTP framing, or a
    /// response over the size limit.
    Transport,
    /// Server error 8000, or a failure with no recognised code.
    General,
    /// Server error 8001: no permission for the resource.
    Access,
    /// Server error 8002: a quota is exhausted.
    Quota,
    /// Server error 8003, or a request that could not be built locally.
    BadParam,
    /// Server error 8004, or fewer values written than sent.
    WriteFailed,
    /// The server reported success but the body had an unexpected shape.
    InvalidResponse,
}

impl Error {
    /// Maps an application error code from a server error body.
    pub fn from_code(code: i64) -> Self {
        match code {
            CODE_ACCESS => Error::Access,
            CODE_QUOTA => Error::Quota,
            CODE_BAD_PARAM => Error::BadParam,
            CODE_WRITE_FAILED => Error::WriteFailed,
            _ => Error::General,
        }
    }

    /// `true` for errors raised below the HTTP status level.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Auth | Error::Connection | Error::Tls | Error::MalformedUrl | Error::Transport
        )
    }
}

impl From<NetworkError> for Error {
    fn from(error: NetworkError) -> Self {
        match error {
            NetworkError::InvalidAddress => Error::MalformedUrl,
            NetworkError::ConnectionRefused
            | NetworkError::Timeout
            | NetworkError::NotOpen
            | NetworkError::ConnectionClosed => Error::Connection,
            NetworkError::Tls => Error::Tls,
            NetworkError::WriteError
            | NetworkError::ReadError
            | NetworkError::ProtocolError
            | NetworkError::ResponseTooLarge => Error::Transport,
        }
    }
}

/// A request that fails local validation never reaches the server.
impl From<model::Error> for Error {
    fn from(_: model::Error) -> Self {
        Error::BadParam
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::Auth => "authentication failed",
            Error::Connection => "connection failed",
            Error::Tls => "TLS failure",
            Error::MalformedUrl => "malformed URL",
            Error::Transport => "transport failure",
            Error::General => "general server error",
            Error::Access => "access denied",
            Error::Quota => "quota exceeded",
            Error::BadParam => "bad parameter",
            Error::WriteFailed => "write failed",
            Error::InvalidResponse => "invalid response",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Auth => defmt::write!(f, "Auth"),
            Error::Connection => defmt::write!(f, "Connection"),
            Error::Tls => defmt::write!(f, "Tls"),
            Error::MalformedUrl => defmt::write!(f, "MalformedUrl"),
            Error::Transport => defmt::write!(f, "Transport"),
            Error::General => defmt::write!(f, "General"),
            Error::Access => defmt::write!(f, "Access"),
            Error::Quota => defmt::write!(f, "Quota"),
            Error::BadParam => defmt::write!(f, "BadParam"),
            Error::WriteFailed => defmt::write!(f, "WriteFailed"),
            Error::InvalidResponse => defmt::write!(f, "InvalidResponse"),
        }
    }
}
