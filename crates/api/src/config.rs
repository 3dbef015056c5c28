use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

/// Defaults shipped in `config/default.toml`, embedded so the binary and the
/// tests can build a configuration without touching the filesystem.
const EMBEDDED_DEFAULTS: &str = include_str!("../../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub status_source: StatusSourceConfig,
    pub monitor: MonitorConfig,
    pub history: HistoryConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

/// Where devices, history and users are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process memory; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// External ping engine endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSourceConfig {
    #[serde(default = "default_status_source_url")]
    pub base_url: String,

    /// Timeout for the live host listing.
    #[serde(default = "default_status_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for the proxied status history.
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Online hosts slower than this are reported as `warning`.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_ms: f64,

    /// Number of recent alerts kept for `GET /api/alerts`.
    #[serde(default = "default_alert_feed_capacity")]
    pub alert_feed_capacity: usize,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Whether to append samples from the poll loop.
    #[serde(default = "default_true")]
    pub record: bool,

    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for access tokens.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    #[serde(default = "default_master_login")]
    pub master_login: String,

    /// Master account is created on startup when this is set.
    #[serde(default)]
    pub master_password: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_status_source_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_status_timeout_ms() -> u64 {
    5_000
}
fn default_history_timeout_ms() -> u64 {
    10_000
}
fn default_poll_interval() -> u64 {
    1
}
fn default_warning_threshold() -> f64 {
    domain::services::DEFAULT_WARNING_THRESHOLD_MS
}
fn default_alert_feed_capacity() -> usize {
    100
}
fn default_true() -> bool {
    true
}
fn default_sample_interval() -> u64 {
    60
}
fn default_retention_days() -> u32 {
    7
}
fn default_token_expiry() -> i64 {
    86_400
}
fn default_master_login() -> String {
    "admin".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with HW__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                EMBEDDED_DEFAULTS,
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("HW")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build a configuration from the embedded defaults plus overrides.
    ///
    /// Ignores config files and the environment, and skips validation so
    /// tests can use partial configurations.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            EMBEDDED_DEFAULTS,
            config::FileFormat::Toml,
        ));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "HW__DATABASE__URL must be set when storage.backend is postgres".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "HW__AUTH__JWT_SECRET must be set".to_string(),
            ));
        }

        if self.monitor.poll_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "monitor.poll_interval_secs must be at least 1".to_string(),
            ));
        }

        if !self.monitor.warning_threshold_ms.is_finite() || self.monitor.warning_threshold_ms < 0.0
        {
            return Err(ConfigValidationError::InvalidValue(
                "monitor.warning_threshold_ms must be a non-negative number".to_string(),
            ));
        }

        if self.history.record && self.history.sample_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "history.sample_interval_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
