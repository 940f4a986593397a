//! Loading configuration files from disk.

mod support;

use chainhub::adapter::inbound::cli::load_config;
use chainhub::error::{ConfigError, Error, ErrorKind};
use chainhub::infrastructure::config::settings::Config;
use chainhub::port::RemoteConfig;
use tempfile::TempDir;

use support::config::write_config;

#[test]
fn file_on_disk_is_loaded_and_validated() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "/tmp/reference.db",
        r#"
[reload]
chains_secs = 30

[swap_token]
expire_secs = 600

[remote.base_config]
unisat_api_config = '{"Bitcoin":{"Server":"https://open-api.unisat.io"}}'
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.database.url, "/tmp/reference.db");
    assert_eq!(config.database.max_connections, 2);
    assert_eq!(config.reload.chains_secs, 30);
    assert_eq!(config.reload.dtcs_secs, 60);
    assert_eq!(config.swap_token.policy().expire_after_idle.as_secs(), 600);

    let remote = config.remote_config();
    assert!(remote
        .get("base_config", "unisat_api_config")
        .unwrap()
        .contains("unisat.io"));
    assert_eq!(remote.get("base_config", "missing"), None);
}

#[test]
fn missing_file_is_read_error_but_cli_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));

    let config = load_config(&path).unwrap();
    assert_eq!(config.database.url, "chainhub.db");
}

#[test]
fn zero_interval_names_the_field() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "ref.db", "[reload]\nmakers_secs = 0\n");

    let err = load_config(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("reload.makers_secs"));
}

#[test]
fn malformed_toml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[database\nurl = 1").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn unknown_log_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nformat = \"xml\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("logging.format"));
}
