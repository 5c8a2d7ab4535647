//! mcp-hub Error Types
//!
//! Centralized error handling using thiserror for type-safe errors.

use crate::config::ConfigError;
use crate::mcp::McpError;
use thiserror::Error;

/// Top-level error type for mcp-hub
#[derive(Error, Debug)]
pub enum HubError {
    /// Nothing to operate on, e.g. no MCP servers configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config file error: {0}")]
    Config(#[from] ConfigError),

    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `HubError`
pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HubError::Configuration("no MCP servers are configured".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: no MCP servers are configured"
        );
    }

    #[test]
    fn test_error_conversion() {
        let mcp_err = McpError::not_connected("git");
        let hub_err: HubError = mcp_err.into();
        assert!(matches!(hub_err, HubError::Mcp(_)));
        assert!(hub_err.to_string().contains("'git'"));

        let config_err = ConfigError::Invalid("duplicate server".to_string());
        let hub_err: HubError = config_err.into();
        assert!(matches!(hub_err, HubError::Config(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let hub_err: HubError = io_err.into();
        assert!(matches!(hub_err, HubError::Io(_)));
    }
}
