use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,

    /// Largest request body accepted, in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

/// Which document store backs the users collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Redis,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "mem" => Some(StoreBackend::Memory),
            "redis" => Some(StoreBackend::Redis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_store_url")]
    pub url: String,

    /// Prefix for every key the service writes
    #[serde(default = "default_store_prefix")]
    pub prefix: String,

    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// HTML file served at `/`, read on every request
    #[serde(default = "default_dashboard_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_store_prefix() -> String {
    "userboard:users:".to_string()
}

fn default_pool_size() -> usize {
    10
}

fn default_command_timeout_ms() -> u64 {
    3000
}

fn default_dashboard_path() -> String {
    "index.html".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
            prefix: default_store_prefix(),
            pool_size: default_pool_size(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            path: default_dashboard_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the process.
    ///
    /// Uses `path` when given, otherwise `config.toml` if it exists, otherwise
    /// defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::read_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                log::debug!("No configuration file, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        log::info!("Loading configuration from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply `USERBOARD_*` overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("USERBOARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("USERBOARD_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::config("Invalid USERBOARD_PORT value"))?;
        }

        if let Some(backend) = lookup("USERBOARD_STORE") {
            self.store.backend = StoreBackend::parse(&backend)
                .ok_or_else(|| Error::config(format!("Invalid USERBOARD_STORE value: {}", backend)))?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.store.url = url;
        }
        // The service-specific variable wins over the generic one
        if let Some(url) = lookup("USERBOARD_REDIS_URL") {
            self.store.url = url;
        }
        if let Some(prefix) = lookup("USERBOARD_STORE_PREFIX") {
            self.store.prefix = prefix;
        }

        if let Some(path) = lookup("USERBOARD_DASHBOARD") {
            self.dashboard.path = path;
        }

        if let Some(level) = lookup("USERBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config("server.host must not be empty"));
        }
        if self.server.port == 0 {
            return Err(Error::config("server.port must be between 1 and 65535"));
        }
        if self.server.max_body_size == 0 {
            return Err(Error::config("server.max_body_size must be at least 1"));
        }
        if self.store.backend == StoreBackend::Redis {
            if self.store.url.trim().is_empty() {
                return Err(Error::config("store.url is required for the redis backend"));
            }
            if self.store.pool_size == 0 {
                return Err(Error::config("store.pool_size must be at least 1"));
            }
        }
        if self.dashboard.path.trim().is_empty() {
            return Err(Error::config("dashboard.path must not be empty"));
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
