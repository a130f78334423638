//! Backend transports against a mock HTTP server and a fake bridge.

mod common;

use common::FakeBridge;

use sc_facade::{
    BackendRequest, BackendTransport, BridgeCommand, BridgeError, BridgedTransport,
    DirectTransport, FacadeConfig, FacadeError, HttpFailure, HttpMethod, ServerStatus,
    SidecarFacade, TransportError,
};

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

#[tokio::test]
async fn test_direct_transport_sends_json_content_type() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = DirectTransport::new(&FacadeConfig::with_base_url(mock_server.uri())).unwrap();
    let response = transport
        .send(BackendRequest::get("/api/status"))
        .await
        .unwrap();

    assert_eq!(response.status, Some(200));
    assert_eq!(response.text(), "{}");
}

#[tokio::test]
async fn test_direct_transport_sends_json_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/items/3"))
        .and(body_json(json!({"done": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string("updated"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = DirectTransport::new(&FacadeConfig::with_base_url(mock_server.uri())).unwrap();
    let response = transport
        .send(BackendRequest::new(
            HttpMethod::Put,
            "api/items/3",
            Some(json!({"done": true})),
        ))
        .await
        .unwrap();

    assert_eq!(response.body, "updated");
}

#[tokio::test]
async fn test_direct_transport_non_success_is_status_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&mock_server)
        .await;

    let transport = DirectTransport::new(&FacadeConfig::with_base_url(mock_server.uri())).unwrap();
    let err = transport
        .send(BackendRequest::get("/anything"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status: 503,
            body: "busy".into()
        }
    );
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let transport =
        DirectTransport::new(&FacadeConfig::with_base_url("http://127.0.0.1:4040/")).unwrap();
    assert_eq!(transport.base_url(), "http://127.0.0.1:4040");
}

#[tokio::test]
async fn test_bridged_transport_builds_make_http_request() {
    let bridge = FakeBridge::new();
    bridge.respond("make_http_request", Ok(r#"{"ok":true}"#.into()));
    let transport = BridgedTransport::new(bridge.clone(), FacadeConfig::default());

    let response = transport
        .send(BackendRequest::new(
            HttpMethod::Post,
            "/api/items",
            Some(json!({"name": "x"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, None);
    assert_eq!(response.body, r#"{"ok":true}"#);

    let invocations = bridge.invocations();
    let BridgeCommand::MakeHttpRequest { url, options } = &invocations[0] else {
        panic!("expected make_http_request, got {:?}", invocations[0]);
    };
    assert_eq!(url, "http://127.0.0.1:4040/api/items");
    assert_eq!(options.method(), HttpMethod::Post);
    assert_eq!(options.body.as_deref(), Some(r#"{"name":"x"}"#));
    assert_eq!(
        options
            .headers
            .as_ref()
            .and_then(|h| h.get("Content-Type"))
            .map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_bridged_transport_maps_http_failures() {
    let bridge = FakeBridge::new();
    let transport = BridgedTransport::new(bridge.clone(), FacadeConfig::default());

    bridge.respond(
        "make_http_request",
        Err(HttpFailure::Status {
            status: 404,
            body: "Not Found".into(),
        }
        .into()),
    );
    let err = transport.send(BackendRequest::get("/x")).await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Status {
            status: 404,
            body: "Not Found".into()
        }
    );

    bridge.respond(
        "make_http_request",
        Err(HttpFailure::Send {
            message: "connection refused".into(),
        }
        .into()),
    );
    let err = transport.send(BackendRequest::get("/x")).await.unwrap_err();
    assert!(matches!(err, TransportError::Unreachable { .. }));

    bridge.respond("make_http_request", Err(BridgeError::unavailable("no host")));
    let err = transport.send(BackendRequest::get("/x")).await.unwrap_err();
    assert!(matches!(err, TransportError::Unreachable { .. }));
}

#[tokio::test]
async fn given_bridged_status_failure_when_probe_then_unexpected_response() {
    let bridge = FakeBridge::new();
    bridge.respond(
        "make_http_request",
        Err(HttpFailure::Status {
            status: 500,
            body: "boom".into(),
        }
        .into()),
    );
    let facade = SidecarFacade::with_bridged_transport(bridge.clone(), FacadeConfig::default());

    let err = facade.probe_status().await.unwrap_err();

    assert!(matches!(err, FacadeError::UnexpectedResponse { .. }));
    assert_eq!(facade.status(), ServerStatus::NotStarted);
}

#[tokio::test]
async fn given_bridged_healthy_backend_when_probe_then_verified() {
    let bridge = FakeBridge::new();
    bridge.respond(
        "make_http_request",
        Ok(r#"{"status":"Backend is running","version":"1.0.0"}"#.into()),
    );
    let facade = SidecarFacade::with_bridged_transport(bridge.clone(), FacadeConfig::default());

    let payload = facade.probe_status().await.unwrap();

    assert_eq!(payload.version.as_deref(), Some("1.0.0"));
    assert_eq!(facade.status(), ServerStatus::RunningVerifiedByProbe);
}
