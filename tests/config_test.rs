//! Integration tests for configuration loading

use parcel_tracker::infra::Config;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[store]
file = "/var/lib/parcel-tracker/deliveries.json"

[http]
timeout_secs = 20
user_agent = "test-agent/1.0"

[refresh]
interval_minutes = 15

[notifications]
enabled = false
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.store_file(), "/var/lib/parcel-tracker/deliveries.json");
    assert_eq!(config.http_timeout(), Duration::from_secs(20));
    assert_eq!(config.http_user_agent(), "test-agent/1.0");
    assert_eq!(config.refresh_interval(), Duration::from_secs(15 * 60));
    assert!(!config.notifications_enabled());
}

#[test]
fn test_partial_config_uses_section_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[refresh]\ninterval_minutes = 5\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.refresh_interval_minutes(), 5);
    assert_eq!(config.store_file(), "deliveries.json");
    assert_eq!(config.http_timeout(), Duration::from_secs(30));
    assert!(config.notifications_enabled());
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.store_file(), "deliveries.json");
    assert_eq!(config.refresh_interval_minutes(), 60);
    assert!(config.notifications_enabled());
    assert_eq!(config.config_file(), "default");
}
