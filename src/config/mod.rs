//! Configuration management for mcp-hub
//!
//! This module handles loading, parsing, and managing configuration from:
//! 1. Embedded default_config.toml (compile-time defaults)
//! 2. User config at ~/.config/mcp-hub/config.toml (or platform-specific location)
//! 3. Project-local config at ./.mcp-hub/config.toml

use crate::infrastructure::mcp::McpServerConfig;
use crate::logging::{self, LogFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default configuration embedded in binary
const DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub mcp: McpSection,
}

/// A user or project config file; absent sections leave the base alone
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigOverlay {
    logging: Option<LoggingSection>,
    mcp: Option<McpSection>,
}

/// Logging configuration as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub timestamps: bool,
    #[serde(default = "default_false")]
    pub file_line: bool,
    #[serde(default = "default_true")]
    pub file_output: bool,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            timestamps: true,
            file_line: false,
            file_output: true,
            file_path: None,
        }
    }
}

impl LoggingSection {
    /// Convert to the logging module's runtime configuration
    pub fn to_logging_config(&self) -> logging::LoggingConfig {
        logging::LoggingConfig {
            level: logging::parse_level(&self.level),
            format: LogFormat::from_str(&self.format),
            timestamps: self.timestamps,
            file_line: self.file_line,
            file_output: self.file_output,
            file_path: self.file_path.as_ref().map(|path| {
                let raw = path.to_string_lossy();
                PathBuf::from(shellexpand::tilde(&raw).into_owned())
            }),
        }
    }
}

/// MCP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpSection {
    /// Entries kept in the in-memory activity log
    #[serde(default = "default_activity_buffer_size")]
    pub activity_buffer_size: usize,
    #[serde(default)]
    pub servers: Vec<McpServerConfig>,
}

impl Default for McpSection {
    fn default() -> Self {
        Self {
            activity_buffer_size: default_activity_buffer_size(),
            servers: Vec::new(),
        }
    }
}

impl McpSection {
    /// Servers offered as capability sources
    pub fn enabled_servers(&self) -> impl Iterator<Item = &McpServerConfig> {
        self.servers.iter().filter(|server| server.enabled)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_activity_buffer_size() -> usize {
    200
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

// ============================================================================
// Configuration loading
// ============================================================================

impl HubConfig {
    /// Load configuration with fallback chain:
    /// 1. Project-local .mcp-hub/config.toml
    /// 2. User config ~/.config/mcp-hub/config.toml
    /// 3. Embedded default_config.toml
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::embedded()?;

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::read_file(&user_config_path) {
                    Ok(user_config) => {
                        config = Self::merge(config, user_config);
                        tracing::info!("Loaded user config from {:?}", user_config_path);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load user config: {}", e);
                    }
                }
            }
        }

        if let Some(project_config_path) = Self::project_config_path() {
            if project_config_path.exists() {
                match Self::read_file(&project_config_path) {
                    Ok(project_config) => {
                        config = Self::merge(config, project_config);
                        tracing::info!("Loaded project config from {:?}", project_config_path);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load project config: {}", e);
                    }
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, overlaid on the defaults
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::merge(Self::embedded()?, Self::read_file(path)?);
        config.validate()?;
        Ok(config)
    }

    fn embedded() -> Result<Self, ConfigError> {
        toml::from_str(DEFAULT_CONFIG).map_err(|e| {
            ConfigError::ParseError(format!("Failed to parse default config: {}", e))
        })
    }

    fn read_file(path: &Path) -> Result<ConfigOverlay, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Get the user config path (~/.config/mcp-hub/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config_dir| config_dir.join("mcp-hub").join("config.toml"))
    }

    /// Get the project-local config path (./.mcp-hub/config.toml)
    pub fn project_config_path() -> Option<PathBuf> {
        std::env::current_dir()
            .ok()
            .map(|cwd| cwd.join(".mcp-hub").join("config.toml"))
    }

    /// Replace the sections the overlay gives, keep the rest of `base`
    fn merge(base: Self, overlay: ConfigOverlay) -> Self {
        Self {
            logging: overlay.logging.unwrap_or(base.logging),
            mcp: overlay.mcp.unwrap_or(base.mcp),
        }
    }

    /// Reject server lists the hub cannot address unambiguously
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for server in &self.mcp.servers {
            if server.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "MCP server name must not be empty".to_string(),
                ));
            }
            if !seen.insert(server.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate MCP server name '{}'",
                    server.name
                )));
            }
        }
        Ok(())
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let toml_string =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml_string).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            logging: LoggingSection::default(),
            mcp: McpSection::default(),
        })
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mcp::McpTransport;
    use std::io::Write;

    #[test]
    fn test_default_config_loads() {
        let config = HubConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.mcp.activity_buffer_size, 200);
        assert!(config.mcp.servers.is_empty());
    }

    #[test]
    fn test_embedded_default_config_is_valid() {
        let result: Result<HubConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(result.is_ok(), "Default config should be valid TOML");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = HubConfig::default();
        config
            .mcp
            .servers
            .push(McpServerConfig::http("remote", "http://localhost:8000/mcp"));
        let toml_string = toml::to_string(&config).unwrap();
        let parsed: HubConfig = toml::from_str(&toml_string).unwrap();

        assert_eq!(parsed.mcp.servers, config.mcp.servers);
        assert_eq!(parsed.logging.level, config.logging.level);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[mcp]
activity_buffer_size = 10

[[mcp.servers]]
name = "git"
transport = {{ type = "stdio", command = "uvx", args = ["mcp-server-git"] }}

[[mcp.servers]]
name = "remote"
enabled = false
timeout_ms = 5000
transport = {{ type = "http", url = "http://localhost:8000/mcp" }}
"#
        )
        .unwrap();

        let config = HubConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.mcp.activity_buffer_size, 10);
        assert_eq!(config.mcp.servers.len(), 2);
        assert!(matches!(
            config.mcp.servers[0].transport,
            McpTransport::Stdio { .. }
        ));

        let enabled: Vec<&str> = config
            .mcp
            .enabled_servers()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(enabled, vec!["git"]);

        // logging section not given, defaults kept
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_duplicate_server_names_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[mcp.servers]]
name = "git"
transport = {{ type = "stdio", command = "a" }}

[[mcp.servers]]
name = "git"
transport = {{ type = "stdio", command = "b" }}
"#
        )
        .unwrap();

        let err = HubConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("'git'"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[mcp\nbroken").unwrap();

        let err = HubConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = HubConfig::load_from_file(Path::new("/nonexistent/mcp-hub.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    fn overlay(toml_text: &str) -> ConfigOverlay {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_logging_only_overlay_keeps_servers() {
        let user = overlay(
            r#"
[[mcp.servers]]
name = "git"
transport = { type = "stdio", command = "uvx", args = ["mcp-server-git"] }
"#,
        );
        let project = overlay(
            r#"
[logging]
level = "debug"
"#,
        );

        let config = HubConfig::merge(HubConfig::merge(HubConfig::default(), user), project);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.mcp.servers.len(), 1);
        assert_eq!(config.mcp.servers[0].name, "git");
    }

    #[test]
    fn test_overlay_section_replaces_whole_section() {
        let user = overlay(
            r#"
[mcp]
activity_buffer_size = 10

[[mcp.servers]]
name = "a"
transport = { type = "http", url = "http://a" }
"#,
        );
        let project = overlay(
            r#"
[[mcp.servers]]
name = "b"
transport = { type = "http", url = "http://b" }
"#,
        );

        let config = HubConfig::merge(HubConfig::merge(HubConfig::default(), user), project);

        let names: Vec<&str> = config.mcp.servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
        // fields missing from the given section fall back to their defaults
        assert_eq!(config.mcp.activity_buffer_size, 200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_to_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = HubConfig::default();
        config.mcp.servers.push(McpServerConfig::stdio("fs", "server-fs"));
        config.save_to(&path).unwrap();

        let loaded = HubConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.mcp.servers[0].name, "fs");
    }

    #[test]
    fn test_logging_section_conversion() {
        let section = LoggingSection {
            level: "debug".to_string(),
            format: "json".to_string(),
            ..LoggingSection::default()
        };
        let config = section.to_logging_config();
        assert_eq!(config.level, tracing::Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
    }
}
