use super::*;

fn config(base_url: &str) -> ClientConfig {
    ClientConfig::with_cookie_file(base_url, PathBuf::from("/tmp/chatline-config-test.json")).unwrap()
}

#[test]
fn defaults_prefer_auth_object_and_full_timestamps() {
    let cfg = config("http://127.0.0.1:5000/");
    assert_eq!(cfg.base_url, "http://127.0.0.1:5000");
    assert_eq!(cfg.endpoint, "ws://127.0.0.1:5000/socket");
    assert_eq!(cfg.auth_field, AuthField::AuthObject);
    assert_eq!(cfg.timestamp_style, TimestampStyle::Full);
    assert!(!cfg.validate_on_start);
    assert_eq!(cfg.reconnect.max_delay, Duration::from_secs(10));
    assert_eq!(cfg.reconnect.initial_delay, Duration::from_secs(1));
}

#[test]
fn api_url_joins_path_to_base() {
    let cfg = config("https://chat.example.test/");
    assert_eq!(cfg.api_url("/api/login"), "https://chat.example.test/api/login");
}

#[test]
fn new_rejects_non_http_base() {
    let err = ClientConfig::with_cookie_file("ftp://host", PathBuf::from("x")).unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
}

// =============================================================
// Endpoint derivation
// =============================================================

#[test]
fn derive_endpoint_maps_schemes() {
    assert_eq!(derive_endpoint("http://localhost:3000", None).unwrap(), "ws://localhost:3000/socket");
    assert_eq!(derive_endpoint("https://chat.example.test/app", None).unwrap(), "wss://chat.example.test/socket");
}

#[test]
fn derive_endpoint_substitutes_port() {
    assert_eq!(derive_endpoint("http://localhost:3000", Some(5000)).unwrap(), "ws://localhost:5000/socket");
    assert_eq!(derive_endpoint("http://localhost", Some(5000)).unwrap(), "ws://localhost:5000/socket");
    assert_eq!(derive_endpoint("http://[::1]:3000", Some(5000)).unwrap(), "ws://[::1]:5000/socket");
    assert_eq!(derive_endpoint("http://[::1]", Some(5000)).unwrap(), "ws://[::1]:5000/socket");
}

#[test]
fn derive_endpoint_rejects_missing_host() {
    assert!(derive_endpoint("http://", None).is_err());
    assert!(derive_endpoint("localhost:3000", None).is_err());
}

// =============================================================
// String option parsers
// =============================================================

#[test]
fn parse_auth_field_accepts_both_modes() {
    assert_eq!(parse_auth_field("query").unwrap(), AuthField::Query);
    assert_eq!(parse_auth_field("auth-object").unwrap(), AuthField::AuthObject);
    assert_eq!(parse_auth_field(" AUTH ").unwrap(), AuthField::AuthObject);
}

#[test]
fn parse_auth_field_unknown_errors() {
    let err = parse_auth_field("header").unwrap_err().to_string();
    assert!(err.contains("unknown auth field"));
}

#[test]
fn parse_timestamp_style_values() {
    assert_eq!(parse_timestamp_style("full").unwrap(), TimestampStyle::Full);
    assert_eq!(parse_timestamp_style("time").unwrap(), TimestampStyle::TimeOfDay);
    assert!(parse_timestamp_style("date").is_err());
}

#[test]
fn parse_log_level_defaults_to_warn() {
    assert_eq!(parse_log_level(None), tracing::Level::WARN);
    assert_eq!(parse_log_level(Some("bogus")), tracing::Level::WARN);
    assert_eq!(parse_log_level(Some("DEBUG")), tracing::Level::DEBUG);
}

#[test]
fn reconnect_cap_lowers_initial_delay() {
    let policy = ReconnectPolicy::capped_at(400).unwrap();
    assert_eq!(policy.max_delay, Duration::from_millis(400));
    assert_eq!(policy.initial_delay, Duration::from_millis(400));

    let policy = ReconnectPolicy::capped_at(30_000).unwrap();
    assert_eq!(policy.initial_delay, Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS));
}

#[test]
fn reconnect_cap_of_zero_is_rejected() {
    assert!(matches!(ReconnectPolicy::capped_at(0), Err(ClientError::Config(_))));
}

#[test]
fn default_cookie_file_lives_in_config_dir() {
    if let Some(base) = dirs::config_dir() {
        assert_eq!(default_cookie_file().unwrap(), base.join("chatline").join("cookies.json"));
    }
}
