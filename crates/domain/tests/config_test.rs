use ferrous_dig_domain::{CliOverrides, ClientConfig, Config, ConfigError, DohMethod};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::default();

    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.edns_payload, 4096);
    assert!(!config.dnssec_ok);
    assert_eq!(config.doh_method, DohMethod::Post);
    assert_eq!(config.resolv_conf, "/etc/resolv.conf");
}

#[test]
fn test_edns_from_config() {
    let config = ClientConfig {
        dnssec_ok: true,
        edns_payload: 1232,
        ..ClientConfig::default()
    };
    let edns = config.edns();
    assert_eq!(edns.max_payload, 1232);
    assert!(edns.dnssec_ok);
}

#[test]
fn test_load_from_file_with_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[client]
timeout_ms = 1500
doh_method = "get"

[logging]
level = "debug"
"#
    )
    .unwrap();

    let path = file.path().to_str().unwrap().to_string();

    let config = Config::load(Some(&path), CliOverrides::default()).unwrap();
    assert_eq!(config.client.timeout_ms, 1500);
    assert_eq!(config.client.doh_method, DohMethod::Get);
    assert_eq!(config.client.edns_payload, 4096);
    assert_eq!(config.logging.level, "debug");

    let overridden = Config::load(
        Some(&path),
        CliOverrides {
            timeout_ms: Some(250),
            doh_method: Some(DohMethod::Json),
            dnssec_ok: Some(true),
            log_level: Some("trace".to_string()),
        },
    )
    .unwrap();
    assert_eq!(overridden.client.timeout_ms, 250);
    assert_eq!(overridden.client.doh_method, DohMethod::Json);
    assert!(overridden.client.dnssec_ok);
    assert_eq!(overridden.logging.level, "trace");
}

#[test]
fn test_missing_file_is_an_error() {
    let result = Config::load(
        Some("/nonexistent/ferrous-dig.toml"),
        CliOverrides::default(),
    );
    assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[client\ntimeout_ms = ").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let result = Config::load(Some(&path), CliOverrides::default());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_validation_rejects_zero_timeout() {
    let config = ClientConfig {
        timeout_ms: 0,
        ..ClientConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_validation_rejects_tiny_payload() {
    let config = ClientConfig {
        edns_payload: 256,
        ..ClientConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_doh_method_from_str() {
    assert_eq!("POST".parse::<DohMethod>().unwrap(), DohMethod::Post);
    assert_eq!("get".parse::<DohMethod>().unwrap(), DohMethod::Get);
    assert_eq!("json".parse::<DohMethod>().unwrap(), DohMethod::Json);
    assert!("put".parse::<DohMethod>().is_err());
}
