//! MCP (Model Context Protocol) Integration
//!
//! rmcp-backed implementation of the capability source provider.
//!
//! # Architecture
//!
//! - `client`: MCP client wrapper for single server connections
//! - `pool`: Configured servers, implements `CapabilitySourceProvider`
//! - `server_config`: Configuration types for MCP servers
//! - `tools`: Conversions from rmcp wire types
//!
//! # Example
//!
//! ```ignore
//! use mcp_hub::infrastructure::mcp::{McpServerConfig, McpServerPool};
//! use mcp_hub::mcp::{ConnectRequest, HubState, Reconciler};
//!
//! let pool = McpServerPool::from_configs(&[
//!     McpServerConfig::stdio("git", "uvx").with_args(vec!["mcp-server-git".to_string()]),
//! ]);
//! let reconciler = Reconciler::new(pool);
//! let mut state = HubState::default();
//!
//! reconciler.connect(&mut state, &mut operator, ConnectRequest::all()).await?;
//! ```

pub mod client;
pub mod pool;
pub mod server_config;
pub mod tools;

pub use client::{create_client_handle, McpClient, McpClientHandle};
pub use pool::McpServerPool;
pub use server_config::{McpServerConfig, McpTransport};
pub use tools::parse_tool_arguments;
