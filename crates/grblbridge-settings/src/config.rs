//! Configuration for GrblBridge
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Server settings (bind address, polling, receive buffer)
//! - Capture settings (program file, communication log, backups)
//! - UI preferences (message language)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use grblbridge_communication::{BridgeConfig, CapturePaths, DEFAULT_MAX_LINE_LEN};
use grblbridge_core::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Listening socket settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// TCP port; `0` picks an ephemeral port
    pub port: u16,
    /// Listen backlog
    pub backlog: u32,
    /// Accept/receive poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Bytes read from the socket per receive
    pub read_chunk_size: usize,
    /// Longest accepted G-code line in bytes
    pub max_line_len: usize,
}

impl ServerSettings {
    /// `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 23,
            backlog: 1,
            poll_interval_ms: 1000,
            read_chunk_size: 1024,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Capture file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Program file handed to the downstream controller
    pub program_file: PathBuf,
    /// Append-only communication log
    pub log_file: PathBuf,
    /// Directory receiving timestamped program backups
    pub backup_dir: PathBuf,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            program_file: PathBuf::from("lightburn_program.ngc"),
            log_file: PathBuf::from("lightburn_log.txt"),
            backup_dir: PathBuf::from("."),
        }
    }
}

/// UI preference settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Language of status messages
    pub language: Language,
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings
    pub server: ServerSettings,
    /// Capture settings
    pub capture: CaptureSettings,
    /// UI preferences
    pub ui: UiSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location, e.g. `~/.config/grblbridge/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("grblbridge").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(invalid("server.host", "must not be empty"));
        }

        if self.server.backlog == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "server.backlog".to_string(),
                value: self.server.backlog.to_string(),
            }
            .into());
        }

        if self.server.poll_interval_ms == 0 {
            return Err(invalid("server.poll_interval_ms", "must be > 0"));
        }

        if self.server.read_chunk_size == 0 {
            return Err(invalid("server.read_chunk_size", "must be > 0"));
        }

        if self.server.max_line_len == 0 {
            return Err(invalid("server.max_line_len", "must be > 0"));
        }

        if self.capture.program_file.as_os_str().is_empty() {
            return Err(invalid("capture.program_file", "must not be empty"));
        }

        if self.capture.log_file.as_os_str().is_empty() {
            return Err(invalid("capture.log_file", "must not be empty"));
        }

        if self.capture.program_file == self.capture.log_file {
            return Err(invalid(
                "capture.log_file",
                "must differ from the program file",
            ));
        }

        Ok(())
    }

    /// Runtime listener configuration derived from these settings
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::from(self)
    }
}

impl From<&Config> for BridgeConfig {
    fn from(config: &Config) -> Self {
        BridgeConfig {
            host: config.server.host.clone(),
            port: config.server.port,
            backlog: config.server.backlog,
            poll_interval: Duration::from_millis(config.server.poll_interval_ms),
            read_chunk_size: config.server.read_chunk_size,
            max_line_len: config.server.max_line_len,
            capture: CapturePaths::new(
                config.capture.program_file.clone(),
                config.capture.log_file.clone(),
            ),
            language: config.ui.language,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_addr(), "0.0.0.0:23");
        assert_eq!(config.ui.language, Language::En);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let mut config = Config::default();
        config.server.poll_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));

        let mut config = Config::default();
        config.server.backlog = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));

        let mut config = Config::default();
        config.server.max_line_len = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.capture.log_file = config.capture.program_file.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bridge_config_conversion() {
        let mut config = Config::default();
        config.server.port = 2323;
        config.server.poll_interval_ms = 250;
        config.server.max_line_len = 80;
        config.ui.language = Language::De;

        let bridge = config.bridge_config();
        assert_eq!(bridge.bind_addr(), "0.0.0.0:2323");
        assert_eq!(bridge.poll_interval, Duration::from_millis(250));
        assert_eq!(bridge.max_line_len, 80);
        assert_eq!(bridge.language, Language::De);
        assert_eq!(
            bridge.capture.program_file,
            PathBuf::from("lightburn_program.ngc")
        );
    }

    #[test]
    fn test_unsupported_format() {
        let err = ConfigFormat::from_path(Path::new("bridge.yaml")).unwrap_err();
        assert_eq!(err.to_string(), "Config error: Unsupported config format: yaml");
    }
}
