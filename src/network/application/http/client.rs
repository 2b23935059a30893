use crate::network::{Close, Connection, Read, Write as _};
use crate::network::error::Error;
use alloc::string::String as AllocString;
use alloc::vec::Vec as AllocVec;
use core::fmt::Write;
use heapless::{String, Vec};

const MAX_HEADERS: usize = 16;
const MAX_HEADER_NAME_LEN: usize = 64;
const MAX_HEADER_VALUE_LEN: usize = 512;
/// Upper bound for the status line plus response headers.
const MAX_HEAD_LEN: usize = 8 * 1024;
const READ_CHUNK: usize = 512;
const USER_AGENT: &str = concat!("iot-ticket/", env!("CARGO_PKG_VERSION"));

/// Default limit for response bodies, in bytes.
pub const DEFAULT_MAX_BODY: usize = 50_000;

/// Request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// The method token as sent on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request or response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String<MAX_HEADER_NAME_LEN>,
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    /// Builds a header, failing with [`Error::ProtocolError`] if either part
    /// is too long or contains a line break.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        if name.contains(['\r', '\n', ':']) || value.contains(['\r', '\n']) {
            return Err(Error::ProtocolError);
        }
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::ProtocolError)?,
            value: String::try_from(value).map_err(|_| Error::ProtocolError)?,
        })
    }
}

#[derive(Debug)]
pub struct Request<'a> {
    pub method: Method,
    /// Path and query, starting with `/`.
    pub path: &'a str,
    pub headers: Vec<Header, MAX_HEADERS>,
    pub body: Option<&'a [u8]>,
}

#[derive(Debug)]
pub struct Response {
    pub status_code: u16,
    pub headers: Vec<Header, MAX_HEADERS>,
    pub body: AllocVec<u8>,
}

impl Response {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Length(usize),
    Chunked,
    UntilClose,
}

/// HTTP/1.1 client over a single connection.
#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
    max_body: usize,
}

impl<C> Client<C>
where
    C: Connection,
    <C as Read>::Error: Into<Error>,
    <C as crate::network::Write>::Error: Into<Error>,
{
    pub fn new(connection: C) -> Self {
        Self::with_max_body(connection, DEFAULT_MAX_BODY)
    }

    /// Creates a client that rejects response bodies longer than `max_body`.
    pub fn with_max_body(connection: C, max_body: usize) -> Self {
        Self {
            connection,
            max_body,
        }
    }

    /// Gives the connection back.
    pub fn into_inner(self) -> C {
        self.connection
    }

    pub fn request(&mut self, request: &Request) -> Result<Response, Error> {
        // --- Send Request ---
        let head = encode_head(request)?;
        self.write_all(head.as_bytes())?;
        if let Some(body) = request.body {
            self.write_all(body)?;
        }
        self.connection.flush().map_err(Into::<Error>::into)?;

        // --- Receive Head ---
        let mut buf = AllocVec::new();
        let head_end = loop {
            if let Some(pos) = find_slice(&buf, b"\r\n\r\n") {
                break pos;
            }
            if buf.len() > MAX_HEAD_LEN {
                return Err(Error::ProtocolError);
            }
            if self.fill(&mut buf)? == 0 {
                return Err(if buf.is_empty() {
                    Error::ConnectionClosed
                } else {
                    Error::ProtocolError
                });
            }
        };
        let (status_code, headers, framing) = parse_head(&buf[..head_end])?;
        let mut body = buf.split_off(head_end + 4);

        // --- Receive Body ---
        let body = match framing {
            Framing::Length(len) => {
                if len > self.max_body {
                    return Err(Error::ResponseTooLarge);
                }
                while body.len() < len {
                    if self.fill(&mut body)? == 0 {
                        return Err(Error::ConnectionClosed);
                    }
                }
                body.truncate(len);
                body
            }
            Framing::Chunked => {
                let mut decoded = AllocVec::new();
                loop {
                    match decode_chunks(&body, &mut decoded)? {
                        Chunks::Done => break decoded,
                        Chunks::Partial(consumed) => {
                            body.drain(..consumed);
                        }
                    }
                    // What is left is at most one chunk and its size line.
                    if decoded.len() > self.max_body
                        || body.len() > self.max_body + MAX_HEAD_LEN
                    {
                        return Err(Error::ResponseTooLarge);
                    }
                    if self.fill(&mut body)? == 0 {
                        return Err(Error::ConnectionClosed);
                    }
                }
            }
            Framing::UntilClose => {
                while body.len() <= self.max_body {
                    if self.fill(&mut body)? == 0 {
                        break;
                    }
                }
                body
            }
        };

        if body.len() > self.max_body {
            return Err(Error::ResponseTooLarge);
        }

        Ok(Response {
            status_code,
            headers,
            body,
        })
    }

    /// Closes the underlying connection.
    pub fn close(self) -> Result<(), Error> {
        Close::close(self.connection).map_err(|_| Error::ConnectionClosed)
    }

    fn write_all(&mut self, mut data: &[u8]) -> Result<(), Error> {
        while !data.is_empty() {
            match self.connection.write(data).map_err(Into::<Error>::into)? {
                0 => return Err(Error::WriteError),
                n => data = &data[n..],
            }
        }
        Ok(())
    }

    /// Appends one read's worth of data to `buf`, returning how much arrived.
    fn fill(&mut self, buf: &mut AllocVec<u8>) -> Result<usize, Error> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.connection.read(&mut chunk).map_err(Into::<Error>::into)?;
        buf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }
}

fn encode_head(request: &Request) -> Result<AllocString, Error> {
    let mut head = AllocString::with_capacity(256);

    // Writing into a String cannot fail.
    let _ = write!(head, "{} {} HTTP/1.1\r\n", request.method.as_str(), request.path);

    let mut has_user_agent = false;
    for header in &request.headers {
        if header.name.eq_ignore_ascii_case("User-Agent") {
            has_user_agent = true;
        }
        if header.name.eq_ignore_ascii_case("Content-Length") {
            return Err(Error::ProtocolError);
        }
        let _ = write!(head, "{}: {}\r\n", header.name, header.value);
    }
    if !has_user_agent {
        let _ = write!(head, "User-Agent: {}\r\n", USER_AGENT);
    }
    if let Some(body) = request.body {
        let _ = write!(head, "Content-Length: {}\r\n", body.len());
    }
    head.push_str("\r\n");

    Ok(head)
}

fn parse_head(data: &[u8]) -> Result<(u16, Vec<Header, MAX_HEADERS>, Framing), Error> {
    let header_str = core::str::from_utf8(data).map_err(|_| Error::ProtocolError)?;
    let mut lines = header_str.split("\r\n");

    // Parse status line
    let status_line = lines.next().ok_or(Error::ProtocolError)?;
    let mut status_parts = status_line.splitn(3, ' ');
    let version = status_parts.next().ok_or(Error::ProtocolError)?;
    if !version.starts_with("HTTP/") {
        return Err(Error::ProtocolError);
    }
    let status_code = status_parts
        .next()
        .ok_or(Error::ProtocolError)?
        .parse::<u16>()
        .map_err(|_| Error::ProtocolError)?;

    // Parse headers
    let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
    let mut framing = Framing::UntilClose;

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or(Error::ProtocolError)?;
        let (name, value) = (name.trim(), value.trim());

        if name.eq_ignore_ascii_case("Transfer-Encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            framing = Framing::Chunked;
        } else if name.eq_ignore_ascii_case("Content-Length") && framing != Framing::Chunked {
            let len = value.parse::<usize>().map_err(|_| Error::ProtocolError)?;
            framing = Framing::Length(len);
        }

        // Headers beyond what fits are not needed by anything above.
        if let Ok(header) = Header::new(name, value) {
            let _ = headers.push(header);
        }
    }

    Ok((status_code, headers, framing))
}

#[derive(Debug, PartialEq, Eq)]
enum Chunks {
    /// The terminating chunk arrived. Trailers are ignored.
    Done,
    /// More data is needed; this many bytes were decoded and can be dropped.
    Partial(usize),
}

/// Appends every complete chunk at the start of `raw` to `decoded`.
fn decode_chunks(raw: &[u8], decoded: &mut AllocVec<u8>) -> Result<Chunks, Error> {
    let mut consumed = 0;
    loop {
        let rest = &raw[consumed..];
        let Some(line_end) = find_slice(rest, b"\r\n") else {
            return Ok(Chunks::Partial(consumed));
        };
        let line = core::str::from_utf8(&rest[..line_end]).map_err(|_| Error::ProtocolError)?;
        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16).map_err(|_| Error::ProtocolError)?;

        if size == 0 {
            return Ok(Chunks::Done);
        }
        let framed = size.checked_add(2).ok_or(Error::ProtocolError)?;
        let data = &rest[line_end + 2..];
        if data.len() < framed {
            return Ok(Chunks::Partial(consumed));
        }
        if &data[size..framed] != b"\r\n" {
            return Err(Error::ProtocolError);
        }
        decoded.extend_from_slice(&data[..size]);
        consumed += line_end + 2 + framed;
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
