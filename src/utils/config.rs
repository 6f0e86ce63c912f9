//! TOML-based configuration for Practica
//!
//! Configuration is read once at startup from `practica.toml` and handed to
//! component constructors as an immutable value. The JWT signing secret is
//! never written to the file: `auth.jwt_secret_env` names the environment
//! variable that holds it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minimum accepted length (in characters) of the JWT signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bounds on durations, keeping every derived timestamp representable.
pub const MAX_ACCESS_EXPIRY_HOURS: i64 = 8_760;
pub const MAX_REFRESH_EXPIRY_DAYS: i64 = 365;
pub const MAX_LEEWAY_SECS: u64 = 300;
pub const MAX_WINDOW_MINUTES: u64 = 1_440;
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Root configuration structure loaded from practica.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_access_token_expiry_hours")]
    pub access_token_expiry_hours: i64,

    #[serde(default = "default_refresh_token_expiry_days")]
    pub refresh_token_expiry_days: i64,

    /// Tolerated clock drift when checking token expiry.
    #[serde(default = "default_clock_skew_leeway_secs")]
    pub clock_skew_leeway_secs: u64,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_access_token_expiry_hours() -> i64 {
    24
}

fn default_refresh_token_expiry_days() -> i64 {
    7
}

fn default_clock_skew_leeway_secs() -> u64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            access_token_expiry_hours: default_access_token_expiry_hours(),
            refresh_token_expiry_days: default_refresh_token_expiry_days(),
            clock_skew_leeway_secs: default_clock_skew_leeway_secs(),
        }
    }
}

// ============= Rate Limit Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window.
    #[serde(default = "default_rate_limit_requests")]
    pub requests: u32,

    #[serde(default = "default_rate_limit_window_minutes")]
    pub window_minutes: u64,

    /// Key clients by the first `X-Forwarded-For` entry. Only enable behind a
    /// proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_rate_limit_requests() -> u32 {
    100
}

fn default_rate_limit_window_minutes() -> u64 {
    1
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: default_rate_limit_requests(),
            window_minutes: default_rate_limit_window_minutes(),
            trust_forwarded_for: false,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_minutes.saturating_mul(60))
    }
}

// ============= Pagination Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_limit")]
    pub default_limit: i64,

    #[serde(default = "default_max_page_limit")]
    pub max_limit: i64,
}

fn default_page_limit() -> i64 {
    20
}

fn default_max_page_limit() -> i64 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_page_limit(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading.
///
/// All of them are fatal: the server refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("JWT secret must be at least {MIN_SECRET_LEN} characters (got {0})")]
    WeakSecret(usize),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AppConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric settings. The secret is checked separately by
    /// [`AppConfig::jwt_secret`] since it comes from the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let auth = &self.auth;
        if !(1..=MAX_ACCESS_EXPIRY_HOURS).contains(&auth.access_token_expiry_hours) {
            return Err(ConfigError::ValidationError(format!(
                "auth.access_token_expiry_hours must be between 1 and {MAX_ACCESS_EXPIRY_HOURS}"
            )));
        }
        if !(1..=MAX_REFRESH_EXPIRY_DAYS).contains(&auth.refresh_token_expiry_days) {
            return Err(ConfigError::ValidationError(format!(
                "auth.refresh_token_expiry_days must be between 1 and {MAX_REFRESH_EXPIRY_DAYS}"
            )));
        }
        if auth.clock_skew_leeway_secs > MAX_LEEWAY_SECS {
            return Err(ConfigError::ValidationError(format!(
                "auth.clock_skew_leeway_secs must be at most {MAX_LEEWAY_SECS}"
            )));
        }
        if self.rate_limit.requests == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.requests must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_WINDOW_MINUTES).contains(&self.rate_limit.window_minutes) {
            return Err(ConfigError::ValidationError(format!(
                "rate_limit.window_minutes must be between 1 and {MAX_WINDOW_MINUTES}"
            )));
        }
        if !(1..=MAX_SWEEP_INTERVAL_SECS).contains(&self.rate_limit.sweep_interval_secs) {
            return Err(ConfigError::ValidationError(format!(
                "rate_limit.sweep_interval_secs must be between 1 and {MAX_SWEEP_INTERVAL_SECS}"
            )));
        }
        if self.pagination.default_limit <= 0
            || self.pagination.max_limit < self.pagination.default_limit
        {
            return Err(ConfigError::ValidationError(
                "pagination limits must satisfy 0 < default_limit <= max_limit".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the JWT secret from the environment, rejecting weak values.
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        let secret = std::env::var(&self.auth.jwt_secret_env)
            .map_err(|_| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))?;
        check_secret_strength(&secret)?;
        Ok(secret)
    }
}

pub fn check_secret_strength(secret: &str) -> Result<(), ConfigError> {
    let len = secret.chars().count();
    if len < MIN_SECRET_LEN {
        return Err(ConfigError::WeakSecret(len));
    }
    Ok(())
}
