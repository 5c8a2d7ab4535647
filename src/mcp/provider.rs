//! Capability source provider
//!
//! The narrow interface the reconciler uses to reach MCP servers. Protocol
//! framing and process management live behind it.

use super::capability::{PromptCapability, ResourceCapability, ToolCapability};
use super::content::ToolCallResponse;
use super::error::McpResult;
use super::ConnectionStatus;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

/// Completion of a bulk start request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    /// Sources that came up
    pub started: Vec<String>,
    /// Sources that could not be brought up, with the reason
    pub failed: Vec<(String, String)>,
}

/// Source of remote tools, prompts and resources
#[async_trait]
pub trait CapabilitySourceProvider: Send + Sync {
    /// Names of all configured sources
    fn list_sources(&self) -> Vec<String>;

    /// Current connection status of a source
    async fn connection_status(&self, source: &str) -> ConnectionStatus;

    /// Ask the provider to bring up `sources`
    ///
    /// Returns immediately. The receiver fires once, after every source
    /// has been attempted; some may have failed.
    fn start_sources(&self, sources: Vec<String>) -> oneshot::Receiver<StartReport>;

    /// Ask the provider to stop a source; no acknowledgement
    fn stop_source(&self, source: &str);

    /// Tools of a connected source
    async fn list_tools(&self, source: &str) -> McpResult<Vec<ToolCapability>>;

    /// Prompts of a connected source
    async fn list_prompts(&self, source: &str) -> McpResult<Vec<PromptCapability>>;

    /// Resources of a connected source
    async fn list_resources(&self, source: &str) -> McpResult<Vec<ResourceCapability>>;

    /// Raw `prompts/get` payload
    async fn get_prompt(&self, source: &str, prompt: &str) -> McpResult<Value>;

    /// Raw `resources/read` payload
    async fn read_resource(&self, source: &str, uri: &str) -> McpResult<Value>;

    /// Invoke a tool on a connected source
    async fn call_tool(
        &self,
        source: &str,
        tool: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> McpResult<ToolCallResponse>;
}
