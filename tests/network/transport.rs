use crate::mock::{MockConnection, MockNetwork};
use iot_ticket::api::{
    Client, ConnectionTransport, Error as ApiError, HttpTransport, Method, Options,
    TransportRequest,
};
use iot_ticket::network::error::Error;
use std::time::Duration;

const HEADERS: &[(&str, &str)] = &[("Accept", "application/json")];

fn request<'a>(url: &'a str, username: &'a str, body: Option<&'a [u8]>) -> TransportRequest<'a> {
    TransportRequest {
        method: if body.is_some() { Method::Post } else { Method::Get },
        url,
        headers: HEADERS,
        username,
        password: "secret",
        body,
        timeout: Duration::from_secs(7),
        max_response_size: 1000,
    }
}

#[test]
fn test_get_over_connection() {
    let network = MockNetwork::serving(b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\n\r\n{\"items\":[]}");
    let log = network.log();
    let mut transport = ConnectionTransport::new(network);

    let response = transport
        .execute(&request("https://my.iot-ticket.com/api/v1/devices", "user", None))
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, br#"{"items":[]}"#);

    let log = log.borrow();
    assert_eq!(log.remotes, ["https://my.iot-ticket.com:443"]);
    assert_eq!(log.timeout, Some(Duration::from_secs(7)));
    assert!(log.closed);

    let written = log.written_text();
    assert!(written.starts_with("GET /api/v1/devices HTTP/1.1\r\nHost: my.iot-ticket.com\r\n"));
    assert!(written.contains("\r\nAccept: application/json\r\n"));
    // base64("user:secret")
    assert!(written.contains("\r\nAuthorization: Basic dXNlcjpzZWNyZXQ=\r\n"));
    assert!(written.contains("\r\nConnection: close\r\n"));
}

#[test]
fn test_post_without_credentials() {
    let network = MockNetwork::serving(b"HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n");
    let log = network.log();
    let mut transport = ConnectionTransport::new(network);

    let body = br#"[{"name":"A","v":1,"dataType":"long"}]"#;
    let response = transport
        .execute(&request("http://localhost:8080/process/write/x", "", Some(body)))
        .unwrap();
    assert_eq!(response.status, 201);

    let log = log.borrow();
    assert_eq!(log.remotes, ["http://localhost:8080"]);
    let written = log.written_text();
    assert!(written.starts_with("POST /process/write/x HTTP/1.1\r\nHost: localhost:8080\r\n"));
    assert!(!written.contains("Authorization"));
    assert!(written.ends_with(std::str::from_utf8(body).unwrap()));
}

#[test]
fn test_error_status_is_returned_not_failed() {
    let network = MockNetwork::serving(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 2\r\n\r\n{}");
    let mut transport = ConnectionTransport::new(network);
    let response = transport
        .execute(&request("https://host/devices", "user", None))
        .unwrap();
    assert_eq!(response.status, 401);
}

#[test]
fn test_failures_before_and_after_connecting() {
    let mut transport = ConnectionTransport::new(MockNetwork::refusing(Error::Tls));
    assert_eq!(
        transport.execute(&request("https://host/devices", "", None)),
        Err(Error::Tls)
    );

    let network = MockNetwork::refusing(Error::ConnectionRefused);
    let log = network.log();
    let mut transport = ConnectionTransport::new(network);
    assert_eq!(
        transport.execute(&request("not a url", "", None)),
        Err(Error::InvalidAddress)
    );
    assert!(log.borrow().remotes.is_empty());

    let network = MockNetwork::serving(b"HTTP/1.1 200 OK\r\n\r\n");
    let mut transport = ConnectionTransport::new(network);
    let mut oversized = request("http://host/devices", "", None);
    oversized.max_response_size = 0;
    // An empty body fits a zero limit.
    assert!(transport.execute(&oversized).is_ok());
}

#[test]
fn test_client_end_to_end() {
    let network = MockNetwork::serving(
        b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 18\r\n\r\n{\"totalWritten\":1}",
    );
    let log = network.log();
    let options = Options::new("https://my.iot-ticket.com/api/v1/", "user", "secret");
    let mut client = Client::new(ConnectionTransport::new(network), options);

    let mut value = iot_ticket::model::MeasurementValue::new();
    value.set_name("Speed").unwrap();
    value.set_value(88i64);
    assert_eq!(
        client.send_one("6a2c1c7d7e1b4d5a9c3f0e8b2a4d6c8e", &value),
        Ok(())
    );

    let written = log.borrow().written_text();
    assert!(written.starts_with(
        "POST /api/v1/process/write/6a2c1c7d7e1b4d5a9c3f0e8b2a4d6c8e HTTP/1.1\r\n"
    ));
    assert!(written.contains("\r\ncharsets: utf-8\r\n"));
    assert!(written.ends_with(r#"[{"name":"Speed","v":88,"dataType":"long"}]"#));
}

#[test]
fn test_client_reports_oversized_response_as_transport_failure() {
    let network = MockNetwork::serving(b"HTTP/1.1 200 OK\r\nContent-Length: 60000\r\n\r\n");
    let options = Options::new("https://my.iot-ticket.com/api/v1", "user", "secret");
    let mut client = Client::new(ConnectionTransport::new(network), options);
    assert_eq!(client.devices(), Err(ApiError::Transport));
}

#[test]
fn test_connection_is_closed_when_the_exchange_fails() {
    let connection = MockConnection::new(b"HTTP/1.1 200 OK\r\n").failing_with(Error::Timeout);
    let network = MockNetwork::with_connection(connection);
    let log = network.log();
    let mut transport = ConnectionTransport::new(network);

    assert_eq!(
        transport.execute(&request("http://host/devices", "", None)),
        Err(Error::Timeout)
    );
    assert!(log.borrow().closed);

    let network = MockNetwork::serving(b"HTTP/1.1 200 OK\r\nContent-Length: 2000\r\n\r\n");
    let log = network.log();
    let mut transport = ConnectionTransport::new(network);
    assert_eq!(
        transport.execute(&request("http://host/devices", "", None)),
        Err(Error::ResponseTooLarge)
    );
    assert!(log.borrow().closed);
}
