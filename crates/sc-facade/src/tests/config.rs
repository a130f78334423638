use crate::FacadeConfig;

use std::time::Duration;

#[test]
fn test_defaults() {
    let config = FacadeConfig::default();
    assert_eq!(config.base_url, "http://127.0.0.1:4040");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.status_path, "/api/status");
    assert_eq!(config.startup_banner, "Uvicorn running on");
    assert_eq!(config.expected_status.as_deref(), Some("Backend is running"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_document_uses_defaults() {
    let config: FacadeConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, FacadeConfig::default());
}

#[test]
fn test_url_for_joins_paths() {
    let config = FacadeConfig::with_base_url("http://127.0.0.1:4040/");
    assert_eq!(config.url_for("/api/status"), "http://127.0.0.1:4040/api/status");
    assert_eq!(config.url_for("api/items"), "http://127.0.0.1:4040/api/items");
}

#[test]
fn given_non_loopback_host_when_validate_then_error() {
    let config = FacadeConfig::with_base_url("http://example.com:4040");
    let err = config.validate().unwrap_err();
    assert!(err.contains("loopback"));
}

#[test]
fn given_localhost_and_ipv6_loopback_when_validate_then_ok() {
    assert!(FacadeConfig::with_base_url("http://localhost:4040").validate().is_ok());
    assert!(FacadeConfig::with_base_url("http://[::1]:4040").validate().is_ok());
}

#[test]
fn given_unparseable_url_when_validate_then_error() {
    let config = FacadeConfig::with_base_url("not a url");
    assert!(config.validate().is_err());
}

#[test]
fn given_non_http_scheme_when_validate_then_error() {
    let config = FacadeConfig::with_base_url("ftp://127.0.0.1:4040");
    assert!(config.validate().unwrap_err().contains("http"));
}

#[test]
fn given_zero_timeout_when_validate_then_error() {
    let config = FacadeConfig {
        request_timeout_secs: 0,
        ..Default::default()
    };
    assert!(config.validate().unwrap_err().contains("timeout"));
}

#[test]
fn given_relative_status_path_when_validate_then_error() {
    let config = FacadeConfig {
        status_path: "api/status".into(),
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn given_blank_banner_when_validate_then_error() {
    let config = FacadeConfig {
        startup_banner: "  ".into(),
        ..Default::default()
    };
    assert!(config.validate().unwrap_err().contains("banner"));
}

#[test]
fn given_privileged_port_when_validate_then_error() {
    let config = FacadeConfig::with_base_url("http://127.0.0.1:80");
    assert!(config.validate().unwrap_err().contains("port"));

    let config = FacadeConfig::with_base_url("http://127.0.0.1");
    assert!(config.validate().is_err());
}
