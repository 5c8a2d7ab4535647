//! mcp-hub Library
//!
//! This library keeps a host tool registry synchronized with a set of MCP
//! servers:
//! - Connect/disconnect reconciliation of server tool categories
//! - Prompt and resource caching with use-time connection checks
//! - rmcp-backed server pool (stdio and streamable HTTP)

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod mcp;

pub use error::{HubError, Result};
