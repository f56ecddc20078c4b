/*!
 * Configuration management for SensorLink.
 *
 * This module provides functionality to load, validate, and access
 * configuration settings for SensorLink sessions.
 */
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config::{Config as ConfigLib, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Core configuration for SensorLink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to stdout
    #[serde(default = "default_log_stdout")]
    pub stdout: bool,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Capacity of the client event queue
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Timeout for synchronous sensor connects in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Timeout for a single IO system listing pass in milliseconds
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,

    /// Sample period of the simulated IO system in milliseconds
    #[serde(default = "default_sim_sample_period_ms")]
    pub sim_sample_period_ms: u64,
}

impl SessionConfig {
    /// The connect timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// The discovery timeout as a [`Duration`]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// The simulated sample period as a [`Duration`]
    pub fn sim_sample_period(&self) -> Duration {
        Duration::from_millis(self.sim_sample_period_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            stdout: default_log_stdout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: default_event_queue_capacity(),
            connect_timeout_ms: default_connect_timeout_ms(),
            discovery_timeout_ms: default_discovery_timeout_ms(),
            sim_sample_period_ms: default_sim_sample_period_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_stdout() -> bool {
    true
}

fn default_event_queue_capacity() -> usize {
    1024
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

fn default_discovery_timeout_ms() -> u64 {
    10000
}

fn default_sim_sample_period_ms() -> u64 {
    5
}

/// A builder for creating a configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<String>,
    environment_prefix: Option<String>,
    override_with: Option<Config>,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the config file path
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Set the environment variable prefix for configuration
    pub fn with_environment_prefix<S: AsRef<str>>(mut self, prefix: S) -> Self {
        self.environment_prefix = Some(prefix.as_ref().to_string());
        self
    }

    /// Override with an existing config
    pub fn override_with(mut self, config: Config) -> Self {
        self.override_with = Some(config);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        let mut config_builder = ConfigLib::builder();

        // Start with default values
        let default_config = Config::default();
        config_builder = config_builder
            .add_source(config::Config::try_from(&default_config)
                .map_err(|e| Error::config(format!("Failed to create default config: {}", e)))?);

        // Add configuration from file if specified
        if let Some(config_file) = self.config_file {
            let path = Path::new(&config_file);
            if path.exists() {
                debug!("Loading configuration from {}", config_file);
                config_builder = config_builder.add_source(File::with_name(&config_file));
            } else {
                debug!("Configuration file {} does not exist, using defaults", config_file);
            }
        }

        // Add configuration from environment variables if prefix is specified
        if let Some(prefix) = self.environment_prefix {
            debug!("Loading configuration from environment variables with prefix {}", prefix);
            config_builder = config_builder.add_source(
                Environment::with_prefix(&prefix)
                    .separator("__")
                    .try_parsing(true)
            );
        }

        // Build the config
        let config_lib = config_builder.build()
            .map_err(|e| Error::config(format!("Failed to build configuration: {}", e)))?;

        // Convert to our config type
        let mut config: Config = config_lib.try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize configuration: {}", e)))?;

        // Override with provided config if specified
        if let Some(override_config) = self.override_with {
            config = override_config;
        }

        info!("Configuration loaded successfully");
        Ok(config)
    }
}

/// A thread-safe reference to a configuration
#[derive(Debug, Clone)]
pub struct SharedConfig(Arc<Config>);

impl SharedConfig {
    /// Create a new SharedConfig
    pub fn new(config: Config) -> Self {
        Self(Arc::new(config))
    }

    /// Get a reference to the config
    pub fn get(&self) -> &Config {
        &self.0
    }
}

impl From<Config> for SharedConfig {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}

impl AsRef<Config> for SharedConfig {
    fn as_ref(&self) -> &Config {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.session.event_queue_capacity, 1024);
        assert_eq!(config.session.connect_timeout_ms, 3000);
        assert_eq!(config.session.sim_sample_period_ms, 5);
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.session.discovery_timeout_ms, 10000);
    }

    #[test]
    fn test_config_builder_with_file() -> Result<()> {
        let dir = tempdir().map_err(|e| Error::other(e.to_string()))?;
        let file_path = dir.path().join("config.toml");

        {
            let mut file = File::create(&file_path).map_err(|e| Error::other(e.to_string()))?;
            file.write_all(br#"
                [logging]
                level = "debug"

                [session]
                event_queue_capacity = 64
                connect_timeout_ms = 500
            "#).map_err(|e| Error::other(e.to_string()))?;
        }

        let config = ConfigBuilder::new()
            .with_config_file(file_path)
            .build()?;

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.session.event_queue_capacity, 64);
        assert_eq!(config.session.connect_timeout_ms, 500);
        // Untouched keys keep defaults
        assert_eq!(config.session.discovery_timeout_ms, 10000);

        Ok(())
    }

    #[test]
    fn test_config_builder_with_env() -> Result<()> {
        env::set_var("SENSORLINK__SESSION__EVENT_QUEUE_CAPACITY", "32");
        env::set_var("SENSORLINK__LOGGING__LEVEL", "trace");

        let config = ConfigBuilder::new()
            .with_environment_prefix("sensorlink")
            .build()?;

        assert_eq!(config.session.event_queue_capacity, 32);
        assert_eq!(config.logging.level, "trace");

        // Clean up
        env::remove_var("SENSORLINK__SESSION__EVENT_QUEUE_CAPACITY");
        env::remove_var("SENSORLINK__LOGGING__LEVEL");

        Ok(())
    }

    #[test]
    fn test_shared_config() {
        let config = Config::default();
        let shared = SharedConfig::new(config);

        assert_eq!(shared.get().logging.level, "info");

        let shared2 = shared.clone();
        assert_eq!(shared2.get().session.event_queue_capacity, 1024);
    }

    #[test]
    fn test_duration_accessors() {
        let session = SessionConfig::default();
        assert_eq!(session.connect_timeout(), Duration::from_millis(3000));
        assert_eq!(session.discovery_timeout(), Duration::from_millis(10000));
        assert_eq!(session.sim_sample_period(), Duration::from_millis(5));
    }
}
