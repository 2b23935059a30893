use crate::mock::MockTransport;
use iot_ticket::api::{Client, Error, Method, Options};
use iot_ticket::model::{DataType, DeviceRegistration, MeasurementValue, ReadFilter};
use iot_ticket::network::error::Error as NetworkError;
use std::time::Duration;

const BASE: &str = "https://my.iot-ticket.com/api/v1/";
const DEVICE_ID: &str = "6a2c1c7d7e1b4d5a9c3f0e8b2a4d6c8e";

fn client(transport: MockTransport) -> Client<'static, MockTransport> {
    Client::new(transport, Options::new(BASE, "user", "secret"))
}

fn measurement(name: &str, value: i64) -> MeasurementValue {
    let mut measurement = MeasurementValue::new();
    measurement.set_name(name).unwrap();
    measurement.set_value(value);
    measurement
}

fn device_json(device_id: &str, name: &str) -> String {
    format!(
        r#"{{"deviceId":"{}","href":"{}devices/{}","createdAt":"2015-07-29T07:21:36UTC","name":"{}","manufacturer":"Wapice"}}"#,
        device_id, BASE, device_id, name
    )
}

#[test]
fn test_base_url_trailing_slash_is_stripped_once() {
    let client = Client::new(
        MockTransport::new(),
        Options::new("http://host/api//", "", ""),
    );
    assert_eq!(client.options().base_url, "http://host/api/");

    let client = self::client(MockTransport::new());
    assert_eq!(client.options().base_url, "https://my.iot-ticket.com/api/v1");
}

#[test]
fn test_requests_carry_defaults_and_credentials() {
    let mut client = client(MockTransport::new().reply(200, r#"{"items":[]}"#));
    assert_eq!(client.devices(), Ok(Vec::new()));

    let transport = client.into_transport();
    let request = transport.last();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, "https://my.iot-ticket.com/api/v1/devices");
    assert_eq!(request.username, "user");
    assert_eq!(request.password, "secret");
    assert_eq!(request.timeout, Duration::from_secs(20));
    assert_eq!(request.max_response_size, 50_000);
    assert_eq!(request.body, None);
    for (name, value) in [
        ("Accept", "application/json"),
        ("Content-Type", "application/json"),
        ("charsets", "utf-8"),
    ] {
        assert!(
            request
                .headers
                .contains(&(name.to_string(), value.to_string())),
            "missing {}",
            name
        );
    }
}

#[test]
fn test_options_are_handed_to_the_transport() {
    let options = Options {
        timeout: Duration::from_secs(3),
        max_response_size: 1024,
        ..Options::new(BASE, "", "")
    };
    let mut client = Client::new(
        MockTransport::new().reply(200, r#"{"items":[]}"#),
        options,
    );
    client.datanodes(DEVICE_ID).unwrap();

    let transport = client.into_transport();
    let request = transport.last();
    assert_eq!(request.timeout, Duration::from_secs(3));
    assert_eq!(request.max_response_size, 1024);
    assert_eq!(request.username, "");
}

#[test]
fn test_devices_skips_invalid_items() {
    let body = format!(
        r#"{{"offset":0,"limit":10,"fullSize":3,"items":[{},{},{}]}}"#,
        device_json(DEVICE_ID, "First"),
        device_json("tooshort", "Broken"),
        device_json("ffffffffffffffffffffffffffffffff", "Second"),
    );
    let mut client = client(MockTransport::new().reply(200, &body));

    let devices = client.devices().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].registration().name(), "First");
    assert_eq!(devices[1].device_id(), "ffffffffffffffffffffffffffffffff");
}

#[test]
fn test_device_by_id() {
    let mut client = client(MockTransport::new().reply(200, &device_json(DEVICE_ID, "One")));
    let device = client.device(DEVICE_ID).unwrap();
    assert_eq!(device.device_id(), DEVICE_ID);

    let transport = client.into_transport();
    assert_eq!(
        transport.last().url,
        format!("https://my.iot-ticket.com/api/v1/devices/{}", DEVICE_ID)
    );
}

#[test]
fn test_invalid_device_object_is_invalid_response() {
    let mut client = client(MockTransport::new().reply(200, r#"{"name":"NoId"}"#));
    assert_eq!(client.device(DEVICE_ID), Err(Error::InvalidResponse));
}

#[test]
fn test_register_device() {
    let mut registration = DeviceRegistration::new();
    registration.set_name("MyTestDevice").unwrap();
    registration.set_manufacturer("Wapice").unwrap();

    let reply = device_json(DEVICE_ID, "MyTestDevice");
    let mut client = client(MockTransport::new().reply(201, &reply));
    assert_eq!(
        client.register_device(&registration),
        Ok(DEVICE_ID.to_string())
    );

    let transport = client.into_transport();
    let request = transport.last();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, "https://my.iot-ticket.com/api/v1/devices");
    assert_eq!(
        request.body.as_deref(),
        Some(r#"{"name":"MyTestDevice","manufacturer":"Wapice"}"#)
    );
}

#[test]
fn test_register_incomplete_device_sends_nothing() {
    let mut client = client(MockTransport::new());
    assert_eq!(
        client.register_device(&DeviceRegistration::new()),
        Err(Error::BadParam)
    );
    assert!(client.into_transport().requests.is_empty());
}

#[test]
fn test_send_batch() {
    let values: Vec<MeasurementValue> = (0..5)
        .map(|i| measurement("Counter", i))
        .collect();
    let mut client = client(MockTransport::new().reply(200, r#"{"totalWritten":5}"#));
    assert_eq!(client.send(DEVICE_ID, &values), Ok(()));

    let transport = client.into_transport();
    let request = transport.last();
    assert_eq!(request.method, Method::Post);
    assert_eq!(
        request.url,
        format!("https://my.iot-ticket.com/api/v1/process/write/{}", DEVICE_ID)
    );
    let body = request.body.as_deref().unwrap();
    assert!(body.starts_with(r#"[{"name":"Counter","v":0,"dataType":"long"},"#));
    assert_eq!(body.matches(r#""name":"Counter""#).count(), 5);
}

#[test]
fn test_partial_write_fails() {
    let values: Vec<MeasurementValue> = (0..5)
        .map(|i| measurement("Counter", i))
        .collect();
    for status in [200, 201] {
        let mut client = client(MockTransport::new().reply(status, r#"{"totalWritten":4}"#));
        assert_eq!(client.send(DEVICE_ID, &values), Err(Error::WriteFailed));
    }
}

#[test]
fn test_send_one() {
    let mut client = client(MockTransport::new().reply(201, r#"{"totalWritten":1}"#));
    assert_eq!(client.send_one(DEVICE_ID, &measurement("Speed", 88)), Ok(()));

    let transport = client.into_transport();
    assert_eq!(
        transport.last().body.as_deref(),
        Some(r#"[{"name":"Speed","v":88,"dataType":"long"}]"#)
    );
}

#[test]
fn test_bad_batches_send_nothing() {
    let mut client = client(MockTransport::new());
    assert_eq!(client.send(DEVICE_ID, &[]), Err(Error::BadParam));

    let mut unnamed = MeasurementValue::new();
    unnamed.set_value(1.0);
    assert_eq!(
        client.send(DEVICE_ID, &[measurement("Fine", 1), unnamed]),
        Err(Error::BadParam)
    );

    let mut empty = MeasurementValue::new();
    empty.set_name("NoValue").unwrap();
    assert_eq!(client.send_one(DEVICE_ID, &empty), Err(Error::BadParam));

    assert!(client.into_transport().requests.is_empty());
}

#[test]
fn test_read() {
    let body = r#"{"href":"x","datanodeReads":[
        {"name":"Speed","unit":"km/h","dataType":"long","values":[{"ts":1,"v":"10"},{"ts":2,"v":"12"}]},
        {"name":"Temperature","path":"Engine","dataType":"double","values":[{"ts":1,"v":"21.5"}]}
    ]}"#;
    let mut client = client(MockTransport::new().reply(200, body));

    let mut filter = ReadFilter::new();
    filter.add_datanode("Speed");
    filter.add_datanode_at("Temperature", "Engine");
    filter.set_limit(2);

    let series = client.read(DEVICE_ID, &filter).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].converted::<i64>(1), Ok(12));
    assert_eq!(series[1].data_type(), DataType::Double);
    assert_eq!(series[1].converted::<f64>(0), Ok(21.5));

    let transport = client.into_transport();
    assert_eq!(
        transport.last().url,
        format!(
            "https://my.iot-ticket.com/api/v1/process/read/{}?datanodes=Speed,Engine/Temperature&limit=2",
            DEVICE_ID
        )
    );
}

#[test]
fn test_read_with_malformed_series_fails() {
    let body = r#"{"datanodeReads":[{"name":"Speed","values":[{"ts":1}]}]}"#;
    let mut client = client(MockTransport::new().reply(200, body));
    assert_eq!(
        client.read(DEVICE_ID, &ReadFilter::new()),
        Err(Error::InvalidResponse)
    );
}

#[test]
fn test_datanodes() {
    let body = r#"{"items":[{"name":"Speed","unit":"km/h","dataType":"long"},{"name":"Door","path":"Cabin","dataType":"boolean"}]}"#;
    let mut client = client(MockTransport::new().reply(200, body));

    let nodes = client.datanodes(DEVICE_ID).unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(nodes.iter().all(|node| node.is_empty()));
    assert_eq!(nodes[1].path(), "Cabin");

    let transport = client.into_transport();
    assert_eq!(
        transport.last().url,
        format!("https://my.iot-ticket.com/api/v1/devices/{}/datanodes", DEVICE_ID)
    );
}

#[test]
fn test_quotas() {
    let mut client = client(
        MockTransport::new()
            .reply(
                200,
                r#"{"totalDevices":3,"maxNumberOfDevices":100,"maxDataNodePerDevice":50,"usedStorageSize":1024,"maxStorageSize":1048576}"#,
            )
            .reply(
                200,
                &format!(
                    r#"{{"deviceId":"{}","totalRequestToday":12,"maxReadRequestPerDay":10000,"numberOfDataNodes":4,"storageSize":2048}}"#,
                    DEVICE_ID
                ),
            ),
    );

    assert_eq!(client.quota().unwrap().max_number_of_devices(), 100);
    assert_eq!(client.device_quota(DEVICE_ID).unwrap().storage_size(), 2048);

    let transport = client.into_transport();
    assert_eq!(
        transport.requests[0].url,
        "https://my.iot-ticket.com/api/v1/quota/all"
    );
    assert_eq!(
        transport.requests[1].url,
        format!("https://my.iot-ticket.com/api/v1/quota/{}", DEVICE_ID)
    );
}

#[test]
fn test_unauthorized_maps_to_auth_regardless_of_body() {
    let mut client = client(
        MockTransport::new()
            .reply(401, r#"{"code":8001,"description":"Unauthorized"}"#)
            .reply(401, "<html>denied</html>"),
    );
    assert_eq!(client.quota(), Err(Error::Auth));
    assert_eq!(client.devices(), Err(Error::Auth));
}

#[test]
fn test_error_status_maps_body_code() {
    let mut client = client(
        MockTransport::new()
            .reply(403, r#"{"description":"Forbidden","code":8001,"moreInfo":"x","apiver":1}"#)
            .reply(400, r#"{"code":8003}"#)
            .reply(500, r#"{"code":8004}"#)
            .reply(500, r#"{"code":9999}"#)
            .reply(500, "Internal Server Error")
            .reply(204, ""),
    );
    assert_eq!(client.devices(), Err(Error::Access));
    assert_eq!(client.devices(), Err(Error::BadParam));
    assert_eq!(client.devices(), Err(Error::WriteFailed));
    assert_eq!(client.devices(), Err(Error::General));
    assert_eq!(client.devices(), Err(Error::General));
    assert_eq!(client.devices(), Err(Error::General));
}

#[test]
fn test_success_status_with_error_code_maps_code() {
    let mut client = client(
        MockTransport::new()
            .reply(200, r#"{"code":8002,"description":"Quota exceeded"}"#)
            .reply(200, r#"{"code":8002}"#)
            .reply(200, r#"{"code":8002}"#),
    );
    assert_eq!(
        client.send_one(DEVICE_ID, &measurement("Speed", 1)),
        Err(Error::Quota)
    );
    assert_eq!(client.quota(), Err(Error::Quota));
    assert_eq!(client.device_quota(DEVICE_ID), Err(Error::Quota));
}

#[test]
fn test_success_status_with_wrong_shape() {
    let mut client = client(
        MockTransport::new()
            .reply(200, r#"{"unexpected":true}"#)
            .reply(200, "not json")
            .reply(202, r#"{"totalDevices":1}"#),
    );
    assert_eq!(client.devices(), Err(Error::InvalidResponse));
    assert_eq!(
        client.send_one(DEVICE_ID, &measurement("Speed", 1)),
        Err(Error::InvalidResponse)
    );
    assert_eq!(client.quota(), Err(Error::InvalidResponse));
}

#[test]
fn test_transport_failures() {
    let mut client = client(
        MockTransport::new()
            .fail(NetworkError::Timeout)
            .fail(NetworkError::ConnectionRefused)
            .fail(NetworkError::Tls)
            .fail(NetworkError::InvalidAddress)
            .fail(NetworkError::ResponseTooLarge)
            .fail(NetworkError::ProtocolError),
    );
    assert_eq!(client.devices(), Err(Error::Connection));
    assert_eq!(client.devices(), Err(Error::Connection));
    assert_eq!(client.devices(), Err(Error::Tls));
    assert_eq!(client.devices(), Err(Error::MalformedUrl));
    assert_eq!(client.devices(), Err(Error::Transport));
    assert_eq!(client.devices(), Err(Error::Transport));
}

#[test]
fn test_read_decodes_escaped_text() {
    let body = r#"{"datanodeReads":[{"name":"Note","dataType":"string","values":[{"ts":1,"v":"say \"hi\"\\ok\n\u00e9"}]}]}"#;
    let mut client = client(MockTransport::new().reply(200, body));

    let series = client.read(DEVICE_ID, &ReadFilter::new()).unwrap();
    assert_eq!(
        series[0].converted::<String>(0),
        Ok("say \"hi\"\\ok\n\u{e9}".to_string())
    );
}

#[test]
fn test_devices_decode_escaped_fields() {
    let body = format!(
        r#"{{"items":[{{"deviceId":"{}","href":"h","createdAt":"c","name":"Quote\"Dev","manufacturer":"W","attributes":[{{"key":"k","value":"a\\b"}}]}}]}}"#,
        DEVICE_ID
    );
    let mut client = client(MockTransport::new().reply(200, &body));

    let devices = client.devices().unwrap();
    assert_eq!(devices[0].registration().name(), "Quote\"Dev");
    assert_eq!(devices[0].registration().attribute("k"), Some("a\\b"));
}
