use crate::cli::{Cli, DEFAULT_CONFIG_DIR};
use crate::commands::Commands;

use sc_facade::HttpMethod;

use std::path::PathBuf;

use clap::Parser;

#[test]
fn test_run_defaults() {
    let cli = Cli::try_parse_from(["scctl", "run"]).unwrap();

    assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_DIR));
    assert!(!cli.verbose);
    let Commands::Run {
        via_bridge,
        requests,
        exit_after_requests,
    } = cli.command
    else {
        panic!("expected run");
    };
    assert!(!via_bridge);
    assert!(requests.is_empty());
    assert!(!exit_after_requests);
}

#[test]
fn test_run_collects_repeated_requests() {
    let cli = Cli::try_parse_from([
        "scctl",
        "run",
        "--via-bridge",
        "--request",
        "/api/status",
        "--request",
        "/api/items",
        "--exit-after-requests",
    ])
    .unwrap();

    let Commands::Run {
        via_bridge,
        requests,
        exit_after_requests,
    } = cli.command
    else {
        panic!("expected run");
    };
    assert!(via_bridge);
    assert_eq!(requests, vec!["/api/status", "/api/items"]);
    assert!(exit_after_requests);
}

#[test]
fn test_request_method_is_case_insensitive() {
    let cli = Cli::try_parse_from(["scctl", "request", "-X", "post", "/api/items", "--body", "{}"])
        .unwrap();

    let Commands::Request {
        method,
        endpoint,
        body,
    } = cli.command
    else {
        panic!("expected request");
    };
    assert_eq!(method, HttpMethod::Post);
    assert_eq!(endpoint, "/api/items");
    assert_eq!(body.as_deref(), Some("{}"));
}

#[test]
fn test_request_rejects_unknown_method() {
    let result = Cli::try_parse_from(["scctl", "request", "-X", "PATCH", "/api/items"]);

    assert!(result.is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli =
        Cli::try_parse_from(["scctl", "probe", "--config", "/tmp/sc", "--pretty", "-v"]).unwrap();

    assert!(matches!(cli.command, Commands::Probe));
    assert_eq!(cli.config, PathBuf::from("/tmp/sc"));
    assert!(cli.pretty);
    assert!(cli.verbose);
}
