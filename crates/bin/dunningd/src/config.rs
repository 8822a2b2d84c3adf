//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `dunning.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use dunning_adapter_mail_resend::ResendConfig;
use dunning_adapter_mail_resend::mailer::{DEFAULT_ENDPOINT, DEFAULT_FROM};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Where the state document lives.
    pub storage: StorageConfig,
    /// Background reminder loop.
    pub scheduler: SchedulerConfig,
    /// Outbound email provider.
    pub mail: MailConfig,
    /// Initial invoice set.
    pub invoices: InvoicesConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// JSON state document configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub state_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Start the loop at boot. The "run now" endpoint works either way.
    pub enabled: bool,
    /// Seconds between two ticks.
    pub tick_interval_secs: u64,
}

/// Resend settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub resend_api_key: Option<String>,
    /// Sender address.
    pub from: String,
    /// Public URL of the invoice portal, linked from every email.
    pub app_url: String,
    pub endpoint: String,
}

/// Source of the invoice set loaded at startup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InvoicesConfig {
    /// JSON array of invoice rows. No invoices are known when unset.
    pub path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `dunning.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("dunning.toml")?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("DUNNING_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("DUNNING_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("DUNNING_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("DUNNING_STATE_PATH") {
            self.storage.state_path = PathBuf::from(val);
        }
        if let Some(val) = var("DUNNING_INVOICES_PATH") {
            self.invoices.path = Some(PathBuf::from(val));
        }
        if let Some(secs) = var("DUNNING_TICK_SECS").and_then(|val| val.parse().ok()) {
            self.scheduler.tick_interval_secs = secs;
        }
        if let Some(val) = var("RESEND_API_KEY") {
            self.mail.resend_api_key = Some(val);
        }
        if let Some(val) = var("RESEND_FROM_EMAIL") {
            self.mail.from = val;
        }
        if let Some(val) = var("APP_URL") {
            self.mail.app_url = val;
        }
        if let Some(val) = var("DUNNING_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.tick_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "scheduler tick interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.scheduler.tick_interval_secs)
    }

    /// Settings for the Resend mailer. A blank API key counts as unset.
    #[must_use]
    pub fn resend(&self) -> ResendConfig {
        ResendConfig {
            api_key: self
                .mail
                .resend_api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            from: self.mail.from.clone(),
            app_url: self.mail.app_url.clone(),
            endpoint: self.mail.endpoint.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("data/app-state.json"),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_secs: 60,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from: DEFAULT_FROM.to_string(),
            app_url: "http://localhost:5173".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "dunningd=info,dunning=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
