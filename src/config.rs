use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use miclo_core::Endpoints;

/// Default remote data source.
pub const DEFAULT_SERVER_URL: &str = "https://miclo1.azurewebsites.net";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn set(&mut self, value: T, source: ConfigSource) {
        self.value = value;
        self.source = source;
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the remote data source
    pub server_url: ConfigValue<String>,
    /// Directory holding persisted preferences
    pub data_dir: ConfigValue<PathBuf>,
    /// Per-request timeout for the remote data source
    pub request_timeout_secs: ConfigValue<u64>,
    /// Drop fetch responses that settle after a newer one was applied
    pub discard_superseded: ConfigValue<bool>,
    /// Endpoint paths on the remote data source
    pub endpoints: Endpoints,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    server_url: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    discard_superseded: Option<bool>,
    endpoints: Option<Endpoints>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut server_url =
            ConfigValue::new(DEFAULT_SERVER_URL.to_string(), ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut request_timeout_secs =
            ConfigValue::new(DEFAULT_REQUEST_TIMEOUT_SECS, ConfigSource::Default);
        let mut discard_superseded = ConfigValue::new(false, ConfigSource::Default);
        let mut endpoints = Endpoints::default();
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.server_url {
                server_url.set(url, ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Relative to the config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir.set(resolved, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs.set(secs, ConfigSource::File);
            }
            if let Some(discard) = file_config.discard_superseded {
                discard_superseded.set(discard, ConfigSource::File);
            }
            if let Some(paths) = file_config.endpoints {
                endpoints = paths;
            }
        }

        if let Ok(url) = std::env::var("MICLO_SERVER_URL") {
            server_url.set(url, ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("MICLO_DATA_DIR") {
            data_dir.set(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(value) = std::env::var("MICLO_DISCARD_SUPERSEDED") {
            let discard = parse_flag(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar("MICLO_DISCARD_SUPERSEDED".to_string(), value)
            })?;
            discard_superseded.set(discard, ConfigSource::Environment);
        }

        Ok(Self {
            server_url,
            data_dir,
            request_timeout_secs,
            discard_superseded,
            endpoints,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/miclo/
    /// - macOS: ~/Library/Application Support/miclo/
    /// - Windows: %APPDATA%/miclo/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("miclo")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/miclo/
    /// - macOS: ~/Library/Application Support/miclo/
    /// - Windows: %APPDATA%/miclo/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("miclo")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnvVar(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnvVar(name, value) => {
                write!(f, "Invalid value '{}' for {}: expected true or false", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
