use std::path::{Path, PathBuf};

use chainhub::infrastructure::config::settings::Config;

/// TOML pointing at `db_url` with plain logging, plus any `extra` sections.
pub fn config_toml(db_url: &str, extra: &str) -> String {
    format!(
        r#"
[database]
url = "{db_url}"
max_connections = 2

[logging]
level = "warn"
format = "pretty"

{extra}
"#
    )
}

pub fn test_config(db_url: &str) -> Config {
    Config::parse_toml(&config_toml(db_url, "")).expect("valid test config")
}

/// Write `config.toml` into `dir` and return its path.
pub fn write_config(dir: &Path, db_url: &str, extra: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, config_toml(db_url, extra)).expect("write config");
    path
}
