//! MCP Server Configuration
//!
//! Configuration types for MCP server connections, as read from the
//! `[[mcp.servers]]` tables of the hub config.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Transport type for MCP server connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpTransport {
    /// Standard I/O transport (child process)
    Stdio {
        /// Command to execute
        command: String,
        /// Command arguments
        #[serde(default)]
        args: Vec<String>,
        /// Working directory, `~` and `$VAR` are expanded
        #[serde(default)]
        working_dir: Option<PathBuf>,
        /// Environment variables
        #[serde(default)]
        env: HashMap<String, String>,
    },
    /// Streamable HTTP transport
    Http {
        /// Endpoint URL
        url: String,
    },
}

/// MCP Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpServerConfig {
    /// Unique server name; also the source name in the registry
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Disabled servers are not offered as sources
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Connection timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Transport configuration
    pub transport: McpTransport,
}

fn default_timeout() -> u64 {
    30000 // 30 seconds
}

fn default_true() -> bool {
    true
}

impl McpServerConfig {
    /// Create a new stdio server configuration
    pub fn stdio(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            timeout_ms: default_timeout(),
            transport: McpTransport::Stdio {
                command: command.into(),
                args: Vec::new(),
                working_dir: None,
                env: HashMap::new(),
            },
        }
    }

    /// Create a new streamable HTTP server configuration
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            timeout_ms: default_timeout(),
            transport: McpTransport::Http { url: url.into() },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Add command arguments (for stdio transport)
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        if let McpTransport::Stdio { args: ref mut a, .. } = self.transport {
            *a = args;
        }
        self
    }

    /// Set working directory (for stdio transport)
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        if let McpTransport::Stdio { working_dir: ref mut w, .. } = self.transport {
            *w = Some(dir);
        }
        self
    }

    /// Add environment variable (for stdio transport)
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let McpTransport::Stdio { env: ref mut e, .. } = self.transport {
            e.insert(key.into(), value.into());
        }
        self
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self.transport, McpTransport::Stdio { .. })
    }

    pub fn is_http(&self) -> bool {
        matches!(self.transport, McpTransport::Http { .. })
    }

    /// Working directory with `~` and environment variables expanded
    pub fn expanded_working_dir(&self) -> Option<PathBuf> {
        match &self.transport {
            McpTransport::Stdio {
                working_dir: Some(dir),
                ..
            } => {
                let raw = dir.to_string_lossy();
                let expanded = shellexpand::full(&raw)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                Some(PathBuf::from(expanded))
            }
            _ => None,
        }
    }
}
