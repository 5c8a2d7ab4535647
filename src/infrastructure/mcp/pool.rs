//! MCP Server Pool
//!
//! One rmcp client per configured server, exposed to the reconciler as a
//! `CapabilitySourceProvider`. Starts and stops run on spawned tasks.

use super::client::{create_client_handle, McpClientHandle};
use super::server_config::McpServerConfig;
use crate::mcp::{
    CapabilitySourceProvider, ConnectionStatus, McpError, McpResult, PromptCapability,
    ResourceCapability, StartReport, ToolCallResponse, ToolCapability,
};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Configured MCP servers and their clients
pub struct McpServerPool {
    servers: HashMap<String, McpClientHandle>,
    /// Source names in configuration order
    order: Vec<String>,
}

impl McpServerPool {
    pub fn new() -> Self {
        Self {
            servers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Pool of the enabled servers among `configs`
    pub fn from_configs<'a>(configs: impl IntoIterator<Item = &'a McpServerConfig>) -> Self {
        let mut pool = Self::new();
        for config in configs {
            if config.enabled {
                pool.register(config.clone());
            } else {
                debug!(source = %config.name, "Skipping disabled MCP server");
            }
        }
        pool
    }

    /// Register a server; a server of the same name is replaced
    pub fn register(&mut self, config: McpServerConfig) -> McpClientHandle {
        let name = config.name.clone();
        let handle = create_client_handle(config);
        if self.servers.insert(name.clone(), handle.clone()).is_none() {
            self.order.push(name);
        }
        handle
    }

    pub fn get(&self, name: &str) -> Option<&McpClientHandle> {
        self.servers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    fn handle(&self, name: &str) -> McpResult<&McpClientHandle> {
        self.servers
            .get(name)
            .ok_or_else(|| McpError::server_not_found(name))
    }

    /// Disconnect every server, waiting for each
    pub async fn shutdown(&self) {
        let tasks = self.order.iter().filter_map(|name| {
            let handle = self.servers.get(name)?.clone();
            Some(async move {
                let mut client = handle.write().await;
                if client.status().is_inactive() {
                    return;
                }
                if let Err(e) = client.disconnect().await {
                    warn!(source = %client.name(), error = %e, "Failed to stop MCP server");
                }
            })
        });
        join_all(tasks).await;
    }
}

impl Default for McpServerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilitySourceProvider for McpServerPool {
    fn list_sources(&self) -> Vec<String> {
        self.order.clone()
    }

    async fn connection_status(&self, source: &str) -> ConnectionStatus {
        match self.servers.get(source) {
            Some(handle) => handle.read().await.status(),
            None => ConnectionStatus::Disconnected,
        }
    }

    fn start_sources(&self, sources: Vec<String>) -> oneshot::Receiver<StartReport> {
        let (tx, rx) = oneshot::channel();

        let mut report = StartReport::default();
        let mut handles = Vec::new();
        for name in sources {
            match self.servers.get(&name) {
                Some(handle) => handles.push((name, handle.clone())),
                None => report
                    .failed
                    .push((name.clone(), McpError::server_not_found(name).to_string())),
            }
        }

        tokio::spawn(async move {
            let attempts = handles.into_iter().map(|(name, handle)| async move {
                let result = handle.write().await.connect().await;
                (name, result)
            });

            for (name, result) in join_all(attempts).await {
                match result {
                    Ok(()) => {
                        info!(source = %name, "MCP server connected");
                        report.started.push(name);
                    }
                    Err(e) => {
                        warn!(source = %name, error = %e, "MCP server failed to connect");
                        report.failed.push((name, e.to_string()));
                    }
                }
            }

            // Receiver may have gone away; nothing to report to then
            let _ = tx.send(report);
        });

        rx
    }

    fn stop_source(&self, source: &str) {
        let Some(handle) = self.servers.get(source).cloned() else {
            warn!(source = %source, "Stop requested for unknown MCP server");
            return;
        };

        let name = source.to_string();
        tokio::spawn(async move {
            match handle.write().await.disconnect().await {
                Ok(()) => info!(source = %name, "MCP server stopped"),
                Err(e) => warn!(source = %name, error = %e, "Failed to stop MCP server"),
            }
        });
    }

    async fn list_tools(&self, source: &str) -> McpResult<Vec<ToolCapability>> {
        self.handle(source)?.read().await.list_tools().await
    }

    async fn list_prompts(&self, source: &str) -> McpResult<Vec<PromptCapability>> {
        self.handle(source)?.read().await.list_prompts().await
    }

    async fn list_resources(&self, source: &str) -> McpResult<Vec<ResourceCapability>> {
        self.handle(source)?.read().await.list_resources().await
    }

    async fn get_prompt(&self, source: &str, prompt: &str) -> McpResult<Value> {
        self.handle(source)?.read().await.get_prompt(prompt).await
    }

    async fn read_resource(&self, source: &str, uri: &str) -> McpResult<Value> {
        self.handle(source)?.read().await.read_resource(uri).await
    }

    async fn call_tool(
        &self,
        source: &str,
        tool: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> McpResult<ToolCallResponse> {
        self.handle(source)?
            .read()
            .await
            .call_tool(tool, arguments)
            .await
    }
}
