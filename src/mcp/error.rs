use thiserror::Error;

/// Errors raised at the capability-provider boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    /// The source exists but is not connected
    #[error("MCP server '{0}' is not connected")]
    NotConnected(String),

    /// No source with this name is configured
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    /// Connecting to the source failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport-level errors (process spawn, HTTP)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A request to a connected source failed
    #[error("Request error: {0}")]
    Request(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl McpError {
    /// Create a not-connected error
    pub fn not_connected<S: Into<String>>(source: S) -> Self {
        Self::NotConnected(source.into())
    }

    /// Create a server not found error
    pub fn server_not_found<S: Into<String>>(source: S) -> Self {
        Self::ServerNotFound(source.into())
    }

    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a request error
    pub fn request<S: Into<String>>(msg: S) -> Self {
        Self::Request(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for provider operations
pub type McpResult<T> = Result<T, McpError>;
