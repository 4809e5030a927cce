//! Configuration resolution tests
//!
//! Covers priority order (ENV over TOML over defaults), required credentials,
//! value validation and TOML file loading.
//!
//! Tests that go through `Settings::load` read the real process environment and
//! are marked #[serial] so they never race on environment variables.

use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::io::Write;
use triage_common::config::{Environment, Settings, TomlConfig, CONFIG_PATH_ENV};
use triage_common::Error;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn credentials() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SPOTIFY_CLIENT_ID", "test_client_id"),
        ("SPOTIFY_CLIENT_SECRET", "test_client_secret"),
    ]
}

#[test]
fn test_settings_with_env_vars() {
    let mut pairs = credentials();
    pairs.extend([
        ("SPOTIFY_REDIRECT_URI", "http://localhost:8000/auth/callback"),
        ("ENVIRONMENT", "development"),
        ("DEBUG", "true"),
        ("LOG_LEVEL", "debug"),
    ]);

    let settings = Settings::resolve(TomlConfig::default(), env_from(&pairs)).unwrap();

    assert_eq!(settings.spotify_client_id, "test_client_id");
    assert_eq!(settings.spotify_client_secret, "test_client_secret");
    assert_eq!(settings.environment, Environment::Development);
    assert!(settings.debug);
    assert_eq!(settings.log_level, "DEBUG");
    assert_eq!(settings.tracing_level(), "debug");
    assert!(settings.is_development());
    assert!(!settings.is_production());
}

#[test]
fn test_defaults() {
    let settings = Settings::resolve(TomlConfig::default(), env_from(&credentials())).unwrap();

    assert_eq!(settings.app_name, "Playlist Triage API");
    assert_eq!(settings.spotify_redirect_uri, "http://localhost:8000/auth/callback");
    assert_eq!(settings.spotify_api_base_url, "https://api.spotify.com/v1");
    assert_eq!(settings.spotify_accounts_base_url, "https://accounts.spotify.com");
    assert_eq!(settings.environment, Environment::Development);
    assert!(!settings.debug);
    assert_eq!(settings.log_level, "INFO");
    assert_eq!(
        settings.cors_origins,
        vec!["http://localhost:3000", "http://localhost:8000"]
    );
    assert_eq!(settings.access_token_expire_minutes, 60);
    assert_eq!(settings.bind_address(), "127.0.0.1:8000");
    assert_eq!(settings.http_timeout_secs, 30);
}

#[test]
fn test_missing_credentials_rejected() {
    let err = Settings::resolve(TomlConfig::default(), env_from(&[])).unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("SPOTIFY_CLIENT_ID")));

    let err = Settings::resolve(
        TomlConfig::default(),
        env_from(&[("SPOTIFY_CLIENT_ID", "id")]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("SPOTIFY_CLIENT_SECRET")));
}

#[test]
fn test_log_level_validation() {
    let mut pairs = credentials();
    pairs.push(("LOG_LEVEL", "INVALID_LEVEL"));
    assert!(Settings::resolve(TomlConfig::default(), env_from(&pairs)).is_err());
}

#[test]
fn test_debug_field_conversion() {
    for (raw, expected) in [("true", true), ("false", false), ("on", true), ("nope", false)] {
        let mut pairs = credentials();
        pairs.push(("DEBUG", raw));
        let settings = Settings::resolve(TomlConfig::default(), env_from(&pairs)).unwrap();
        assert_eq!(settings.debug, expected, "DEBUG={}", raw);
    }
}

#[test]
fn test_env_overrides_toml() {
    let file: TomlConfig = toml::from_str(
        r#"
        spotify_client_id = "from_toml"
        spotify_client_secret = "toml_secret"
        environment = "staging"
        port = 9000
        cors_origins = ["https://triage.example.com"]
        "#,
    )
    .unwrap();

    let settings = Settings::resolve(
        file,
        env_from(&[("SPOTIFY_CLIENT_ID", "from_env"), ("PORT", "9100")]),
    )
    .unwrap();

    assert_eq!(settings.spotify_client_id, "from_env");
    assert_eq!(settings.spotify_client_secret, "toml_secret");
    assert_eq!(settings.environment, Environment::Staging);
    assert_eq!(settings.port, 9100);
    assert_eq!(settings.cors_origins, vec!["https://triage.example.com"]);
}

#[test]
fn test_cors_origins_from_env_list() {
    let mut pairs = credentials();
    pairs.push(("CORS_ORIGINS", "https://a.example, https://b.example ,"));
    let settings = Settings::resolve(TomlConfig::default(), env_from(&pairs)).unwrap();
    assert_eq!(settings.cors_origins, vec!["https://a.example", "https://b.example"]);
}

#[test]
fn test_invalid_port_rejected() {
    let mut pairs = credentials();
    pairs.push(("PORT", "eighty"));
    let err = Settings::resolve(TomlConfig::default(), env_from(&pairs)).unwrap_err();
    assert!(err.to_string().contains("PORT"));
}

#[test]
fn test_base_urls_lose_trailing_slash() {
    let mut pairs = credentials();
    pairs.push(("SPOTIFY_API_BASE_URL", "http://127.0.0.1:9999/v1/"));
    let settings = Settings::resolve(TomlConfig::default(), env_from(&pairs)).unwrap();
    assert_eq!(settings.spotify_api_base_url, "http://127.0.0.1:9999/v1");
}

#[test]
fn test_unknown_toml_keys_rejected() {
    let result = toml::from_str::<TomlConfig>("spotify_client_idd = \"typo\"");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_load_from_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
spotify_client_id = "file_id"
spotify_client_secret = "file_secret"
environment = "production"
log_level = "warning"
"#
    )
    .unwrap();

    for key in ["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET", "ENVIRONMENT", "LOG_LEVEL"] {
        env::remove_var(key);
    }

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.spotify_client_id, "file_id");
    assert!(settings.is_production());
    assert_eq!(settings.log_level, "WARNING");
    assert_eq!(settings.tracing_level(), "warn");
}

#[test]
#[serial]
fn test_load_explicit_missing_file_fails() {
    let err = Settings::load(Some(std::path::Path::new("/nonexistent/triage.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_load_from_config_env_var() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "spotify_client_id = \"env_path_id\"\nspotify_client_secret = \"s\""
    )
    .unwrap();

    env::remove_var("SPOTIFY_CLIENT_ID");
    env::remove_var("SPOTIFY_CLIENT_SECRET");
    env::set_var(CONFIG_PATH_ENV, file.path());

    let result = Settings::load(None);
    env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(result.unwrap().spotify_client_id, "env_path_id");
}
