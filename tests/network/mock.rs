//! Mock connection and connector

use iot_ticket::network::error::Error;
use iot_ticket::network::{Close, Connect, Connection, Read, Write};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Everything the code under test did with the mock.
#[derive(Debug, Default)]
pub struct Log {
    pub remotes: Vec<String>,
    pub timeout: Option<Duration>,
    pub written: Vec<u8>,
    pub closed: bool,
}

impl Log {
    pub fn written_text(&self) -> String {
        String::from_utf8(self.written.clone()).unwrap()
    }
}

/// Connection that serves canned data in small pieces.
#[derive(Debug)]
pub struct MockConnection {
    data: Vec<u8>,
    read_pos: usize,
    chunk: usize,
    read_error: Option<Error>,
    log: Rc<RefCell<Log>>,
}

impl MockConnection {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            read_pos: 0,
            chunk: 7,
            read_error: None,
            log: Rc::default(),
        }
    }

    /// Fails every read once the canned data is used up.
    pub fn failing_with(mut self, error: Error) -> Self {
        self.read_error = Some(error);
        self
    }

    pub fn log(&self) -> Rc<RefCell<Log>> {
        self.log.clone()
    }
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.read_pos >= self.data.len() {
            return match self.read_error {
                Some(error) => Err(error),
                None => Ok(0),
            };
        }

        let remaining = self.data.len() - self.read_pos;
        let to_read = buf.len().min(remaining).min(self.chunk);
        buf[..to_read].copy_from_slice(&self.data[self.read_pos..self.read_pos + to_read]);
        self.read_pos += to_read;

        Ok(to_read)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // Accept at most 64 bytes per call to exercise partial writes.
        let len = buf.len().min(64);
        self.log.borrow_mut().written.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.log.borrow_mut().closed = true;
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Connector handing out one prepared connection.
#[derive(Debug)]
pub struct MockNetwork {
    connection: Option<MockConnection>,
    refuse_with: Option<Error>,
    log: Rc<RefCell<Log>>,
}

impl MockNetwork {
    pub fn serving(response: &[u8]) -> Self {
        Self::with_connection(MockConnection::new(response))
    }

    /// Hands out `connection` on the first connect.
    pub fn with_connection(connection: MockConnection) -> Self {
        let log = connection.log();
        Self {
            connection: Some(connection),
            refuse_with: None,
            log,
        }
    }

    pub fn refusing(error: Error) -> Self {
        Self {
            connection: None,
            refuse_with: Some(error),
            log: Rc::default(),
        }
    }

    pub fn log(&self) -> Rc<RefCell<Log>> {
        self.log.clone()
    }
}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        self.log.borrow_mut().remotes.push(remote.to_string());
        if let Some(error) = self.refuse_with {
            return Err(error);
        }
        self.connection.take().ok_or(Error::ConnectionRefused)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.log.borrow_mut().timeout = Some(timeout);
    }
}
