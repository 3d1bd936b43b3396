//! Tests for configuration resolution
//!
//! Priority: CLI flag > environment variable > TOML file > built-in default.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that parse the command line read PRISM_* variables and are marked
//! with #[serial].

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use prism_web::config::TomlConfig;
use prism_web::{Cli, Config, ConfigError};
use serial_test::serial;

const ENV_VARS: [&str; 3] = ["PRISM_MODEL_PATH", "PRISM_BIND", "PRISM_CONFIG"];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

fn write_toml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn addr(text: &str) -> SocketAddr {
    text.parse().unwrap()
}

const FULL_TOML: &str = r#"
model_path = "/srv/prism/toml-model.txt"
bind_addr = "0.0.0.0:9000"

[logging]
level = "debug"
"#;

// ============================================================================
// Defaults
// ============================================================================

#[test]
#[serial]
fn test_zero_config_startup() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let cli = Cli::try_parse_from(["prism-web"]).unwrap();

    let config = Config::resolve_from(&cli, Some(dir.path().join("config.toml"))).unwrap();

    assert_eq!(config.model_path, PathBuf::from("./lgbm.txt"));
    assert_eq!(config.bind_addr, addr("127.0.0.1:8501"));
    assert_eq!(config.log_level, "info");
    assert_eq!(config.config_file, Some((dir.path().join("config.toml"), false)));
}

#[test]
fn test_empty_toml_uses_defaults() {
    let file = write_toml("");
    let toml = TomlConfig::load(file.path()).unwrap().unwrap();

    assert!(toml.model_path.is_none());
    assert!(toml.bind_addr.is_none());
    assert_eq!(toml.logging.level, "info");
}

// ============================================================================
// Priority
// ============================================================================

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();
    let file = write_toml(FULL_TOML);
    let cli = Cli::try_parse_from(["prism-web"]).unwrap();

    let config = Config::resolve_from(&cli, Some(file.path().to_path_buf())).unwrap();

    assert_eq!(config.model_path, PathBuf::from("/srv/prism/toml-model.txt"));
    assert_eq!(config.bind_addr, addr("0.0.0.0:9000"));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.config_file, Some((file.path().to_path_buf(), true)));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let file = write_toml(FULL_TOML);
    std::env::set_var("PRISM_MODEL_PATH", "/env/model.txt");
    std::env::set_var("PRISM_BIND", "127.0.0.1:7000");

    let cli = Cli::try_parse_from(["prism-web"]).unwrap();
    let config = Config::resolve_from(&cli, Some(file.path().to_path_buf())).unwrap();

    assert_eq!(config.model_path, PathBuf::from("/env/model.txt"));
    assert_eq!(config.bind_addr, addr("127.0.0.1:7000"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    std::env::set_var("PRISM_MODEL_PATH", "/env/model.txt");
    std::env::set_var("PRISM_BIND", "127.0.0.1:7000");

    let cli = Cli::try_parse_from([
        "prism-web",
        "--model-path",
        "/cli/model.txt",
        "--bind",
        "127.0.0.1:6000",
    ])
    .unwrap();
    let config = Config::resolve_from(&cli, None).unwrap();

    assert_eq!(config.model_path, PathBuf::from("/cli/model.txt"));
    assert_eq!(config.bind_addr, addr("127.0.0.1:6000"));

    clear_env();
}

#[test]
#[serial]
fn test_config_flag_replaces_default_location() {
    clear_env();
    let named = write_toml("model_path = \"/named/model.txt\"");
    let default = write_toml("model_path = \"/default/model.txt\"");

    let cli = Cli::try_parse_from(["prism-web", "--config", named.path().to_str().unwrap()])
        .unwrap();
    let config = Config::resolve_from(&cli, Some(default.path().to_path_buf())).unwrap();

    assert_eq!(config.model_path, PathBuf::from("/named/model.txt"));
}

#[test]
#[serial]
fn test_config_from_env() {
    clear_env();
    let file = write_toml("bind_addr = \"127.0.0.1:8600\"");
    std::env::set_var("PRISM_CONFIG", file.path());

    let cli = Cli::try_parse_from(["prism-web"]).unwrap();
    let config = Config::resolve_from(&cli, None).unwrap();

    assert_eq!(config.bind_addr, addr("127.0.0.1:8600"));

    clear_env();
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_unparsable_file_is_fatal() {
    let file = write_toml("model_path = [unterminated");
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Cli::default()
    };

    let err = Config::resolve_from(&cli, None).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_wrong_value_type_is_fatal() {
    let file = write_toml("bind_addr = 8501");
    let err = TomlConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_bad_bind_from_toml_rejected() {
    let file = write_toml("bind_addr = \"not an address\"");
    let err = Config::resolve_from(&Cli::default(), Some(file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBind(_)));
}
