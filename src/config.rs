//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file and defines constants for
//! default addresses, the startup gate, and logging. `AppConfig` is the root
//! configuration struct containing all settings. Every field carries a serde
//! default, so the service starts with sensible defaults when no config file
//! is present.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// HTTP Listener Defaults
// =============================================================================

/// Default HTTP listener host (all interfaces)
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP listener port
pub const DEFAULT_HTTP_PORT: u16 = 8000;

// =============================================================================
// Coordinator Defaults
// =============================================================================

/// Default coordination service host
pub const DEFAULT_COORDINATOR_HOST: &str = "127.0.0.1";

/// Default coordination service port
pub const DEFAULT_COORDINATOR_PORT: u16 = 6379;

/// Pre-formatted default coordinator address (compile-time concatenation)
pub const DEFAULT_COORDINATOR_ADDR: &str =
    formatcp!("{}:{}", DEFAULT_COORDINATOR_HOST, DEFAULT_COORDINATOR_PORT);

/// Seconds to wait for the coordinator before connecting (flat startup gate)
pub const DEFAULT_STARTUP_DELAY_SECS: u64 = 30;

/// Timeout in seconds for the coordinator connect/handshake
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum probe attempts when the readiness probe replaces the flat delay
pub const DEFAULT_PROBE_ATTEMPTS: u32 = 30;

/// Delay in seconds between readiness probe attempts
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 1;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "greetgate=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Greeting returned by the root route
pub const GREETING_BODY: &str = "Hello from Ray microservice!";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Coordination service configuration
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }

    /// Listener address as "host:port"
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Coordination service configuration.
///
/// The coordinator protocol is opaque here: a successful TCP connect within
/// the timeout counts as a successful handshake. With `probe = false`
/// (the default) the startup gate is a flat sleep of `startup_delay_seconds`;
/// with `probe = true` the gate is a bounded-retry TCP readiness check.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "CoordinatorConfig::default_host")]
    pub host: String,
    #[serde(default = "CoordinatorConfig::default_port")]
    pub port: u16,
    /// Flat delay before the connect attempt (ignored when probing)
    #[serde(default = "CoordinatorConfig::default_startup_delay")]
    pub startup_delay_seconds: u64,
    /// Connect/handshake timeout
    #[serde(default = "CoordinatorConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Replace the flat delay with a bounded-retry readiness probe
    #[serde(default)]
    pub probe: bool,
    #[serde(default = "CoordinatorConfig::default_probe_attempts")]
    pub probe_attempts: u32,
    #[serde(default = "CoordinatorConfig::default_probe_interval")]
    pub probe_interval_seconds: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            startup_delay_seconds: Self::default_startup_delay(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            probe: false,
            probe_attempts: Self::default_probe_attempts(),
            probe_interval_seconds: Self::default_probe_interval(),
        }
    }
}

impl CoordinatorConfig {
    fn default_host() -> String {
        DEFAULT_COORDINATOR_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_COORDINATOR_PORT
    }

    fn default_startup_delay() -> u64 {
        DEFAULT_STARTUP_DELAY_SECS
    }

    fn default_connect_timeout() -> u64 {
        DEFAULT_CONNECT_TIMEOUT_SECS
    }

    fn default_probe_attempts() -> u32 {
        DEFAULT_PROBE_ATTEMPTS
    }

    fn default_probe_interval() -> u64 {
        DEFAULT_PROBE_INTERVAL_SECS
    }

    /// Coordinator address as "host:port"
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the built-in defaults, which reproduce the
    /// service's stock behavior (listen on 0.0.0.0:8000, coordinator at
    /// 127.0.0.1:6379, 30 second startup gate). An unreadable or malformed
    /// file is a fatal configuration error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "logging.format must be \"text\" or \"json\", got \"{}\"",
                    other
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
