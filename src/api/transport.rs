//! The HTTP capability the API client runs on.
//!
//! [`HttpTransport`] performs one HTTP exchange. Tests and hosts with their
//! own HTTP stack implement it directly; [`ConnectionTransport`] implements it
//! on top of any [`Connect`] using the crate's HTTP/1.1 client.

use crate::encoding;
use crate::network::application::http::{Client, Header, Request};
use crate::network::error::Error;
use crate::network::{Connect, Read, Write};
use alloc::format;
use alloc::vec::Vec;
use core::time::Duration;

pub use crate::network::application::http::Method;

/// One HTTP exchange to perform.
#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    /// Request method.
    pub method: Method,
    /// Absolute URL, `http://` or `https://`.
    pub url: &'a str,
    /// Headers to send besides `Host` and `Authorization`.
    pub headers: &'a [(&'a str, &'a str)],
    /// Basic auth user; no `Authorization` header when empty.
    pub username: &'a str,
    /// Basic auth password.
    pub password: &'a str,
    /// Request body.
    pub body: Option<&'a [u8]>,
    /// Limit for connecting and for each read and write.
    pub timeout: Duration,
    /// Responses with a longer body fail with [`Error::ResponseTooLarge`].
    pub max_response_size: usize,
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// Executes HTTP requests.
///
/// Implementations return `Ok` for every response that arrived, error
/// statuses included, and `Err` only if no complete response was received.
pub trait HttpTransport {
    /// Performs `request`.
    fn execute(&mut self, request: &TransportRequest<'_>) -> Result<TransportResponse, Error>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &mut T {
    fn execute(&mut self, request: &TransportRequest<'_>) -> Result<TransportResponse, Error> {
        (**self).execute(request)
    }
}

/// [`HttpTransport`] over a [`Connect`], one connection per request.
///
/// The connector receives `scheme://host:port`, so a TLS-capable connector
/// can tell `https` targets apart.
#[derive(Debug)]
pub struct ConnectionTransport<N> {
    connector: N,
}

impl<N> ConnectionTransport<N> {
    /// Wraps `connector`.
    pub fn new(connector: N) -> Self {
        Self { connector }
    }

    /// The wrapped connector.
    pub fn connector_mut(&mut self) -> &mut N {
        &mut self.connector
    }

    /// Gives the connector back.
    pub fn into_inner(self) -> N {
        self.connector
    }
}

impl<N> HttpTransport for ConnectionTransport<N>
where
    N: Connect,
    N::Error: Into<Error>,
    <N::Connection as Read>::Error: Into<Error>,
    <N::Connection as Write>::Error: Into<Error>,
{
    fn execute(&mut self, request: &TransportRequest<'_>) -> Result<TransportResponse, Error> {
        let url = Url::parse(request.url)?;

        let mut headers = heapless::Vec::new();
        push_header(&mut headers, "Host", url.authority)?;
        for (name, value) in request.headers {
            push_header(&mut headers, name, value)?;
        }
        if !request.username.is_empty() {
            let credentials = format!("{}:{}", request.username, request.password);
            let value = format!("Basic {}", encoding::encode(credentials.as_bytes()));
            push_header(&mut headers, "Authorization", &value)?;
        }
        push_header(&mut headers, "Connection", "close")?;

        self.connector.set_timeout(request.timeout);
        let remote = format!("{}://{}:{}", url.scheme, url.host, url.port);
        let connection = self
            .connector
            .connect(&remote)
            .map_err(Into::<Error>::into)?;

        let mut client = Client::with_max_body(connection, request.max_response_size);
        let result = client.request(&Request {
            method: request.method,
            path: url.path,
            headers,
            body: request.body,
        });
        // The exchange is over either way; a failed close changes nothing for the caller.
        let _ = client.close();
        let response = result?;

        Ok(TransportResponse {
            status: response.status_code,
            body: response.body,
        })
    }
}

fn push_header<const N: usize>(
    headers: &mut heapless::Vec<Header, N>,
    name: &str,
    value: &str,
) -> Result<(), Error> {
    headers
        .push(Header::new(name, value)?)
        .map_err(|_| Error::ProtocolError)
}

/// The parts of an absolute `http`/`https` URL the transport needs.
#[derive(Debug, PartialEq, Eq)]
struct Url<'a> {
    scheme: &'a str,
    /// `host[:port]` exactly as written, for the `Host` header.
    authority: &'a str,
    host: &'a str,
    port: u16,
    /// Path and query, at least `/`.
    path: &'a str,
}

impl<'a> Url<'a> {
    fn parse(url: &'a str) -> Result<Self, Error> {
        let (scheme, rest) = url.split_once("://").ok_or(Error::InvalidAddress)?;
        let (scheme, default_port) = if scheme.eq_ignore_ascii_case("http") {
            ("http", 80)
        } else if scheme.eq_ignore_ascii_case("https") {
            ("https", 443)
        } else {
            return Err(Error::InvalidAddress);
        };

        let (authority, path) = match rest.find(['/', '?']) {
            Some(0) => return Err(Error::InvalidAddress),
            Some(index) if rest.as_bytes()[index] == b'?' => return Err(Error::InvalidAddress),
            Some(index) => (&rest[..index], &rest[index..]),
            None => (rest, "/"),
        };
        if authority.contains('@') || path.bytes().any(|b| b <= b' ' || b == 0x7f) {
            return Err(Error::InvalidAddress);
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) if !authority.ends_with(']') => {
                (host, port.parse::<u16>().map_err(|_| Error::InvalidAddress)?)
            }
            _ => (authority, default_port),
        };
        if host.is_empty() {
            return Err(Error::InvalidAddress);
        }

        Ok(Self {
            scheme,
            authority,
            host,
            port,
            path,
        })
    }
}
