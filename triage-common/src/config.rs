//! Configuration loading
//!
//! Settings are resolved once at startup and passed around explicitly.
//! Priority order:
//! 1. Command-line arguments (applied by the binary on top of the result)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults
//!
//! The Spotify client id and secret have no default; startup fails without them.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TRIAGE_CONFIG";

const CONFIG_DIR_NAME: &str = "playlist-triage";
const CONFIG_FILE_NAME: &str = "config.toml";

const VALID_LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(Error::Config(format!(
                "ENVIRONMENT must be one of development, staging, production (got '{}')",
                other
            ))),
        }
    }
}

/// Optional settings read from the TOML file
///
/// Every field may be omitted; missing values fall through to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_redirect_uri: Option<String>,
    pub spotify_api_base_url: Option<String>,
    pub spotify_accounts_base_url: Option<String>,
    pub app_name: Option<String>,
    pub environment: Option<Environment>,
    pub debug: Option<bool>,
    pub log_level: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub access_token_expire_minutes: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub http_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Resolved application settings
#[derive(Clone)]
pub struct Settings {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub spotify_api_base_url: String,
    pub spotify_accounts_base_url: String,
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub debug: bool,
    /// Normalized upper-case level, one of DEBUG/INFO/WARNING/ERROR/CRITICAL
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub access_token_expire_minutes: u64,
    pub host: String,
    pub port: u16,
    pub http_timeout_secs: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("spotify_client_id", &self.spotify_client_id)
            .field("spotify_client_secret", &"<redacted>")
            .field("spotify_redirect_uri", &self.spotify_redirect_uri)
            .field("spotify_api_base_url", &self.spotify_api_base_url)
            .field("spotify_accounts_base_url", &self.spotify_accounts_base_url)
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("cors_origins", &self.cors_origins)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment and an optional TOML file
    ///
    /// `config_path` takes precedence over `TRIAGE_CONFIG`, which takes
    /// precedence over the per-user default location. An explicitly named file
    /// must exist; the default location is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let file = match explicit {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                TomlConfig::load(&path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    TomlConfig::load(&path)?
                }
                None => TomlConfig::default(),
            },
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a TOML config with environment lookups and defaults
    ///
    /// `env` returns the value of an environment variable, if set. Injected so
    /// resolution can be exercised without touching the process environment.
    pub fn resolve<F>(file: TomlConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, from_file: Option<String>| -> Option<String> {
            env(key).filter(|v| !v.trim().is_empty()).or(from_file)
        };

        let spotify_client_id = pick("SPOTIFY_CLIENT_ID", file.spotify_client_id)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing("SPOTIFY_CLIENT_ID", "spotify_client_id"))?;
        let spotify_client_secret = pick("SPOTIFY_CLIENT_SECRET", file.spotify_client_secret)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing("SPOTIFY_CLIENT_SECRET", "spotify_client_secret"))?;

        let environment = match env("ENVIRONMENT") {
            Some(raw) => raw.parse()?,
            None => file.environment.unwrap_or(Environment::Development),
        };

        let debug = match env("DEBUG") {
            Some(raw) => parse_bool(&raw),
            None => file.debug.unwrap_or(false),
        };

        let log_level = validate_log_level(
            &pick("LOG_LEVEL", file.log_level).unwrap_or_else(|| "INFO".to_string()),
        )?;

        let cors_origins = match env("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => file.cors_origins.unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:8000".to_string(),
                ]
            }),
        };

        let settings = Self {
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri: pick("SPOTIFY_REDIRECT_URI", file.spotify_redirect_uri)
                .unwrap_or_else(|| "http://localhost:8000/auth/callback".to_string()),
            spotify_api_base_url: trim_slash(
                pick("SPOTIFY_API_BASE_URL", file.spotify_api_base_url)
                    .unwrap_or_else(|| "https://api.spotify.com/v1".to_string()),
            ),
            spotify_accounts_base_url: trim_slash(
                pick("SPOTIFY_ACCOUNTS_BASE_URL", file.spotify_accounts_base_url)
                    .unwrap_or_else(|| "https://accounts.spotify.com".to_string()),
            ),
            app_name: pick("APP_NAME", file.app_name)
                .unwrap_or_else(|| "Playlist Triage API".to_string()),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            debug,
            log_level,
            cors_origins,
            access_token_expire_minutes: parse_number(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                env("ACCESS_TOKEN_EXPIRE_MINUTES"),
                file.access_token_expire_minutes,
                60,
            )?,
            host: pick("HOST", file.host).unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_number("PORT", env("PORT"), file.port, 8000)?,
            http_timeout_secs: parse_number(
                "HTTP_TIMEOUT_SECS",
                env("HTTP_TIMEOUT_SECS"),
                file.http_timeout_secs,
                30,
            )?,
        };

        if settings.is_production() && settings.debug {
            warn!("DEBUG is enabled in a production environment");
        }

        Ok(settings)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `tracing` filter directive equivalent of `log_level`
    pub fn tracing_level(&self) -> &'static str {
        match self.log_level.as_str() {
            "DEBUG" => "debug",
            "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}

/// Per-user default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Accepts the usual truthy spellings; everything else is false
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Normalize and validate a log level name
pub fn validate_log_level(raw: &str) -> Result<String> {
    let upper = raw.trim().to_ascii_uppercase();
    if VALID_LOG_LEVELS.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(Error::Config(format!(
            "LOG_LEVEL must be one of {:?} (got '{}')",
            VALID_LOG_LEVELS, raw
        )))
    }
}

fn missing(env_key: &str, toml_key: &str) -> Error {
    Error::Config(format!(
        "{} not configured. Set the {} environment variable or `{}` in {}",
        toml_key, env_key, toml_key, CONFIG_FILE_NAME
    ))
}

fn parse_number<T>(key: &str, from_env: Option<String>, from_file: Option<T>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match from_env {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{} is invalid ('{}'): {}", key, raw, e))),
        None => Ok(from_file.unwrap_or(default)),
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
