//! MCP Client
//!
//! rmcp client wrapper for a single configured MCP server.

use super::server_config::{McpServerConfig, McpTransport};
use super::tools;
use crate::mcp::{
    ConnectionStatus, McpError, McpResult, PromptCapability, ResourceCapability, ToolCallResponse,
    ToolCapability,
};
use rmcp::{
    model::{
        CallToolRequestParam, ClientInfo, GetPromptRequestParam, ReadResourceRequestParam,
        ServerInfo,
    },
    service::{Peer, RunningService},
    transport::{StreamableHttpClientTransport, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::RwLock;

/// MCP Client wrapper
pub struct McpClient {
    config: McpServerConfig,
    status: ConnectionStatus,
    service: Option<RunningService<RoleClient, ClientInfo>>,
    server_info: Option<ServerInfo>,
}

impl McpClient {
    /// Create a new MCP client (not connected)
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            status: ConnectionStatus::Disconnected,
            service: None,
            server_info: None,
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected && self.service.is_some()
    }

    /// Server info reported during the handshake
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    fn peer(&self) -> McpResult<&Peer<RoleClient>> {
        self.service
            .as_ref()
            .map(|s| s.peer())
            .ok_or_else(|| McpError::not_connected(self.config.name.clone()))
    }

    /// Connect to the server, bounded by the configured timeout
    pub async fn connect(&mut self) -> McpResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.status = ConnectionStatus::Connecting;
        let timeout = Duration::from_millis(self.config.timeout_ms);

        let result = match tokio::time::timeout(timeout, self.open()).await {
            Ok(result) => result,
            Err(_) => Err(McpError::timeout(format!(
                "connecting to '{}' after {}ms",
                self.config.name, self.config.timeout_ms
            ))),
        };

        match result {
            Ok(service) => {
                self.server_info = service.peer().peer_info().cloned();
                self.service = Some(service);
                self.status = ConnectionStatus::Connected;
                Ok(())
            }
            Err(e) => {
                self.status = ConnectionStatus::Error;
                Err(e)
            }
        }
    }

    async fn open(&self) -> McpResult<RunningService<RoleClient, ClientInfo>> {
        match &self.config.transport {
            McpTransport::Stdio {
                command, args, env, ..
            } => {
                self.open_stdio(command, args, self.config.expanded_working_dir(), env)
                    .await
            }
            McpTransport::Http { url } => {
                let transport = StreamableHttpClientTransport::from_uri(url.as_str());
                ClientInfo::default()
                    .serve(transport)
                    .await
                    .map_err(|e| McpError::connection(e.to_string()))
            }
        }
    }

    async fn open_stdio(
        &self,
        command: &str,
        args: &[String],
        working_dir: Option<PathBuf>,
        env: &HashMap<String, String>,
    ) -> McpResult<RunningService<RoleClient, ClientInfo>> {
        let command = shellexpand::tilde(command).into_owned();
        let mut cmd = Command::new(command);
        cmd.args(args);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in env {
            cmd.env(key, value);
        }

        let transport =
            TokioChildProcess::new(cmd).map_err(|e| McpError::transport(e.to_string()))?;

        ClientInfo::default()
            .serve(transport)
            .await
            .map_err(|e| McpError::connection(e.to_string()))
    }

    /// Disconnect from the server
    pub async fn disconnect(&mut self) -> McpResult<()> {
        self.status = ConnectionStatus::Disconnected;
        self.server_info = None;

        if let Some(service) = self.service.take() {
            service
                .cancel()
                .await
                .map_err(|e| McpError::transport(e.to_string()))?;
        }

        Ok(())
    }

    /// List all tools (handling pagination)
    pub async fn list_tools(&self) -> McpResult<Vec<ToolCapability>> {
        let tools = self
            .peer()?
            .list_all_tools()
            .await
            .map_err(|e| McpError::request(e.to_string()))?;

        Ok(tools
            .iter()
            .map(|tool| tools::tool_capability(self.name(), tool))
            .collect())
    }

    pub async fn list_prompts(&self) -> McpResult<Vec<PromptCapability>> {
        let prompts = self
            .peer()?
            .list_all_prompts()
            .await
            .map_err(|e| McpError::request(e.to_string()))?;

        Ok(prompts
            .iter()
            .map(|prompt| tools::prompt_capability(self.name(), prompt))
            .collect())
    }

    pub async fn list_resources(&self) -> McpResult<Vec<ResourceCapability>> {
        let resources = self
            .peer()?
            .list_all_resources()
            .await
            .map_err(|e| McpError::request(e.to_string()))?;

        Ok(resources
            .iter()
            .map(|resource| tools::resource_capability(self.name(), resource))
            .collect())
    }

    /// Fetch a prompt without arguments, as a JSON payload
    pub async fn get_prompt(&self, name: &str) -> McpResult<Value> {
        let params = GetPromptRequestParam {
            name: name.to_string(),
            arguments: None,
        };

        let result = self
            .peer()?
            .get_prompt(params)
            .await
            .map_err(|e| McpError::request(e.to_string()))?;

        serde_json::to_value(result).map_err(|e| McpError::request(e.to_string()))
    }

    /// Read a resource, as a JSON payload
    pub async fn read_resource(&self, uri: &str) -> McpResult<Value> {
        let params = ReadResourceRequestParam {
            uri: uri.to_string(),
        };

        let result = self
            .peer()?
            .read_resource(params)
            .await
            .map_err(|e| McpError::request(e.to_string()))?;

        serde_json::to_value(result).map_err(|e| McpError::request(e.to_string()))
    }

    /// Call a tool
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> McpResult<ToolCallResponse> {
        let params = CallToolRequestParam {
            name: name.to_string().into(),
            arguments,
            task: None, // Not using task scheduling
        };

        let result = self
            .peer()?
            .call_tool(params)
            .await
            .map_err(|e| McpError::request(e.to_string()))?;

        Ok(tools::tool_response(&result))
    }
}

/// Thread-safe MCP client handle
pub type McpClientHandle = Arc<RwLock<McpClient>>;

/// Create a new client handle
pub fn create_client_handle(config: McpServerConfig) -> McpClientHandle {
    Arc::new(RwLock::new(McpClient::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = McpClient::new(McpServerConfig::stdio("test", "echo"));

        assert_eq!(client.name(), "test");
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert!(!client.is_connected());
        assert!(client.server_info().is_none());
    }

    #[tokio::test]
    async fn test_requests_need_connection() {
        let client = McpClient::new(McpServerConfig::stdio("git", "echo"));

        let err = client.list_tools().await.unwrap_err();
        assert_eq!(err, McpError::not_connected("git"));
        assert!(client.read_resource("file:///x").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_spawn_sets_error_status() {
        let mut client = McpClient::new(
            McpServerConfig::stdio("broken", "/nonexistent/mcp-hub-test-binary").with_timeout(2000),
        );

        assert!(client.connect().await.is_err());
        assert_eq!(client.status(), ConnectionStatus::Error);

        client.disconnect().await.unwrap();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }
}
