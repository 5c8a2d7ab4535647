//! MCP capability synchronization
//!
//! Domain side of the hub: capability types, the host registry, the
//! prompt/resource cache and the reconciler that keeps them in step with
//! the configured MCP servers. Transports live in `infrastructure::mcp`.

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod capability;
pub mod content;
pub mod error;
pub mod host;
pub mod operator;
pub mod provider;
pub mod reconciler;
pub mod summary;

pub use cache::{KnownCapabilities, SourceCapabilities};
pub use capability::{
    Category, PromptArgument, PromptCapability, ResourceCapability, ToolCapability,
    CATEGORY_PREFIX,
};
pub use content::{format_tool_result, ContentItem, ExtractedText, ToolCallResponse};
pub use error::{McpError, McpResult};
pub use host::{context_key, ContextEntry, ContextKind, HostRegistry, ToolRegistry};
pub use operator::{select_with_all, Operator, ALL_CHOICE};
pub use provider::{CapabilitySourceProvider, StartReport};
pub use reconciler::{ConnectRequest, DisconnectRequest, HubState, Reconciler};
pub use summary::{
    ConnectOutcome, ConnectSummary, DisconnectOutcome, DisconnectSummary, RefreshSummary,
    SourceStatus, UseOutcome,
};

/// Connection status for an MCP server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Not connected
    #[default]
    Disconnected,
    /// Currently connecting
    Connecting,
    /// Successfully connected
    Connected,
    /// Connection failed or was lost
    Error,
}

impl ConnectionStatus {
    /// Check if the connection is active
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if the connection is in progress
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }

    /// Check if the connection is inactive
    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Error)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Error => write!(f, "Error"),
        }
    }
}
