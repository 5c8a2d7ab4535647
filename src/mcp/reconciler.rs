//! Registry reconciler
//!
//! Keeps the host registry consistent with the set of configured MCP
//! servers: connect registers the tools of servers not yet registered,
//! disconnect removes whole categories, and refresh keeps the
//! prompt/resource cache current.
//!
//! The caller issues one operation at a time against a given `HubState`;
//! nothing here locks against two operations racing on the same source.

use super::cache::KnownCapabilities;
use super::capability::{Category, PromptCapability, ResourceCapability};
use super::content::{prompt_text, resource_text, ToolCallResponse};
use super::host::{context_key, ContextEntry, ContextKind, HostRegistry, ToolRegistry};
use super::operator::{select_with_all, Operator};
use super::provider::CapabilitySourceProvider;
use super::summary::{
    ConnectOutcome, ConnectSummary, DisconnectOutcome, DisconnectSummary, RefreshSummary,
    SourceStatus, UseOutcome,
};
use crate::error::{HubError, Result};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Registry and cache owned by one session
#[derive(Debug, Default)]
pub struct HubState<R = ToolRegistry> {
    pub registry: R,
    pub cache: KnownCapabilities,
}

impl<R: HostRegistry> HubState<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            cache: KnownCapabilities::new(),
        }
    }

    /// Sources that own at least one registered category
    pub fn registered_sources(&self) -> BTreeSet<String> {
        self.registry
            .registered_categories()
            .iter()
            .map(|category| category.source().to_string())
            .collect()
    }

    /// Prompts offered for selection (cache only)
    pub fn prompts(&self) -> Vec<&PromptCapability> {
        self.cache.prompts()
    }

    /// Resources offered for selection (cache only)
    pub fn resources(&self) -> Vec<&ResourceCapability> {
        self.cache.resources()
    }
}

/// Completion hook of a connect operation
pub type ConnectCallback = Box<dyn FnOnce(&ConnectSummary)>;

/// Parameters of `Reconciler::connect`
#[derive(Default)]
pub struct ConnectRequest {
    /// Source names; empty means every known source
    pub sources: Vec<String>,
    /// Let the operator narrow the working set
    pub interactive: bool,
    on_complete: Option<ConnectCallback>,
}

impl ConnectRequest {
    /// Every known source, non-interactive
    pub fn all() -> Self {
        Self::default()
    }

    /// The named sources, non-interactive
    pub fn sources<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Run `callback` once the operation has produced its summary
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(&ConnectSummary) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

/// Parameters of `Reconciler::disconnect`
#[derive(Debug, Clone, Default)]
pub struct DisconnectRequest {
    /// Source names; empty means every registered source
    pub sources: Vec<String>,
    /// Let the operator narrow the selection and confirm stopping
    pub interactive: bool,
    /// Non-interactive only: also stop the chosen sources
    pub stop_sources: bool,
}

impl DisconnectRequest {
    /// Every registered source, non-interactive
    pub fn all() -> Self {
        Self::default()
    }

    /// The named sources, non-interactive
    pub fn sources<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    #[must_use]
    pub fn stop_sources(mut self, stop: bool) -> Self {
        self.stop_sources = stop;
        self
    }
}

/// Reconciles a host registry against a capability provider
pub struct Reconciler<P> {
    provider: P,
}

impl<P: CapabilitySourceProvider> Reconciler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn known_sources(&self) -> Result<Vec<String>> {
        let sources = self.provider.list_sources();
        if sources.is_empty() {
            return Err(HubError::Configuration(
                "no MCP servers are configured".to_string(),
            ));
        }
        Ok(sources)
    }

    /// Register the tools of every requested source not yet registered
    ///
    /// Fails only when no sources are configured. Start failures and
    /// per-source query failures end up in the summary.
    #[tracing::instrument(name = "mcp_connect", skip_all, fields(op = %Uuid::new_v4()))]
    pub async fn connect<R: HostRegistry>(
        &self,
        state: &mut HubState<R>,
        operator: &mut dyn Operator,
        request: ConnectRequest,
    ) -> Result<ConnectSummary> {
        let ConnectRequest {
            sources: requested,
            interactive,
            on_complete,
        } = request;

        let known = self.known_sources()?;
        let resolved = resolve_requested(&known, &requested, operator);

        let summary = if resolved.is_empty() {
            ConnectSummary::without_work(ConnectOutcome::Cancelled)
        } else {
            let registered = state.registered_sources();
            let unregistered: Vec<String> = resolved
                .into_iter()
                .filter(|source| !registered.contains(source))
                .collect();

            if unregistered.is_empty() {
                debug!("all requested MCP servers already registered");
                self.refresh_prompts_and_resources(state, &known).await;
                ConnectSummary::without_work(ConnectOutcome::AlreadyRegistered)
            } else {
                let working = if interactive {
                    select_with_all(operator, "Select MCP servers to connect", &unregistered)
                } else {
                    unregistered
                };

                if working.is_empty() {
                    ConnectSummary::without_work(ConnectOutcome::Cancelled)
                } else {
                    self.connect_working_set(state, operator, working).await
                }
            }
        };

        info!(
            outcome = ?summary.outcome,
            tools_added = summary.tools_added,
            failed = summary.failed.len(),
            "MCP connect finished"
        );
        operator.notify(&summary.to_string());

        if let Some(callback) = on_complete {
            callback(&summary);
        }

        Ok(summary)
    }

    async fn connect_working_set<R: HostRegistry>(
        &self,
        state: &mut HubState<R>,
        operator: &mut dyn Operator,
        working: Vec<String>,
    ) -> ConnectSummary {
        let mut attempted_start = Vec::new();
        for source in &working {
            let status = self.provider.connection_status(source).await;
            if status.is_connecting() {
                debug!(source = %source, "MCP server still connecting, requesting start");
            }
            if !status.is_active() {
                attempted_start.push(source.clone());
            }
        }

        if !attempted_start.is_empty() {
            info!(sources = ?attempted_start, "Starting MCP servers");
            match self.provider.start_sources(attempted_start.clone()).await {
                Ok(report) => {
                    for (source, reason) in &report.failed {
                        warn!(source = %source, %reason, "MCP server failed to start");
                    }
                }
                Err(_) => warn!("MCP start request dropped without completion"),
            }
        }

        let mut failed = Vec::new();
        let mut live = Vec::new();
        let mut tools_added = 0;

        for source in &working {
            let status = self.provider.connection_status(source).await;
            if !status.is_active() {
                if attempted_start.contains(source) {
                    failed.push(source.clone());
                } else {
                    warn!(source = %source, %status, "MCP server dropped during connect");
                }
                continue;
            }
            live.push(source.clone());

            match self.provider.list_tools(source).await {
                Ok(tools) => {
                    let category = Category::for_source(source.clone());
                    for mut tool in tools {
                        tool.source = source.clone();
                        if state.registry.register_tool(&category, tool) {
                            tools_added += 1;
                        }
                    }
                    debug!(source = %source, category = %category, "Registered MCP tools");
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "Failed to list MCP tools");
                    operator.notify(&format!("Failed to load tools from '{source}': {e}"));
                }
            }
        }

        self.refresh_prompts_and_resources(state, &live).await;

        ConnectSummary {
            outcome: ConnectOutcome::Connected,
            sources: working,
            tools_added,
            attempted_start,
            failed,
            live,
        }
    }

    /// Remove the categories of the requested sources
    #[tracing::instrument(name = "mcp_disconnect", skip_all, fields(op = %Uuid::new_v4()))]
    pub async fn disconnect<R: HostRegistry>(
        &self,
        state: &mut HubState<R>,
        operator: &mut dyn Operator,
        request: DisconnectRequest,
    ) -> Result<DisconnectSummary> {
        let registered = state.registry.registered_categories();
        let matching: Vec<Category> = if request.sources.is_empty() {
            registered
        } else {
            registered
                .into_iter()
                .filter(|category| request.sources.iter().any(|s| category.is_from(s)))
                .collect()
        };

        let summary = if matching.is_empty() {
            self.shutdown_active(operator, request.interactive).await
        } else {
            let names: Vec<String> = matching
                .iter()
                .map(|category| category.source().to_string())
                .collect();
            let chosen = if request.interactive {
                select_with_all(operator, "Select MCP servers to disconnect", &names)
            } else {
                names
            };

            if chosen.is_empty() {
                DisconnectSummary::new(DisconnectOutcome::Cancelled)
            } else {
                let mut summary = DisconnectSummary::new(DisconnectOutcome::Removed);
                for source in &chosen {
                    let removed = state
                        .registry
                        .unregister_category(&Category::for_source(source.clone()));
                    debug!(source = %source, removed, "Unregistered MCP category");
                    summary.tools_removed += removed;
                    summary.removed.push(source.clone());
                }

                let stop = if request.interactive {
                    operator.confirm("Also stop the selected MCP server connection(s)?")
                } else {
                    request.stop_sources
                };
                if stop {
                    for source in &chosen {
                        self.provider.stop_source(source);
                    }
                    summary.stopped = chosen;
                }
                summary
            }
        };

        if request.interactive || summary.outcome != DisconnectOutcome::AllInactive {
            operator.notify(&summary.to_string());
        }
        info!(
            outcome = ?summary.outcome,
            tools_removed = summary.tools_removed,
            stopped = summary.stopped.len(),
            "MCP disconnect finished"
        );
        Ok(summary)
    }

    async fn shutdown_active(
        &self,
        operator: &mut dyn Operator,
        interactive: bool,
    ) -> DisconnectSummary {
        let mut active = Vec::new();
        for source in self.provider.list_sources() {
            if !self.provider.connection_status(&source).await.is_inactive() {
                active.push(source);
            }
        }

        if active.is_empty() {
            return DisconnectSummary::new(DisconnectOutcome::AllInactive);
        }

        let proceed = !interactive
            || operator.confirm(&format!(
                "No registered MCP tools match. Stop all {} active MCP server(s)?",
                active.len()
            ));
        if !proceed {
            return DisconnectSummary::new(DisconnectOutcome::Cancelled);
        }

        for source in &active {
            self.provider.stop_source(source);
        }
        let mut summary = DisconnectSummary::new(DisconnectOutcome::Shutdown);
        summary.stopped = active;
        summary
    }

    /// Re-fetch prompts and resources of connected sources
    ///
    /// An empty `sources` means every known source. Entries of sources that
    /// are not connected, or whose fetch fails, are left as they were.
    pub async fn refresh_prompts_and_resources<R: HostRegistry>(
        &self,
        state: &mut HubState<R>,
        sources: &[String],
    ) -> RefreshSummary {
        let names = if sources.is_empty() {
            self.provider.list_sources()
        } else {
            sources.to_vec()
        };

        let mut summary = RefreshSummary::default();
        for source in names {
            if !self.provider.connection_status(&source).await.is_active() {
                summary.skipped.push(source);
                continue;
            }

            let fetched = match self.provider.list_prompts(&source).await {
                Ok(prompts) => match self.provider.list_resources(&source).await {
                    Ok(resources) => Ok((prompts, resources)),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };

            match fetched {
                Ok((mut prompts, mut resources)) => {
                    prompts.iter_mut().for_each(|p| p.source = source.clone());
                    resources.iter_mut().for_each(|r| r.source = source.clone());
                    debug!(
                        source = %source,
                        prompts = prompts.len(),
                        resources = resources.len(),
                        "Refreshed MCP prompts and resources"
                    );
                    state.cache.store(source.clone(), prompts, resources);
                    summary.refreshed.push(source);
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "Failed to refresh MCP prompts/resources");
                    summary.failed.push((source, e.to_string()));
                }
            }
        }

        summary
    }

    /// Fetch a cached prompt and deliver its text to the operator
    pub async fn send_prompt<R: HostRegistry>(
        &self,
        state: &HubState<R>,
        operator: &mut dyn Operator,
        source: &str,
        name: &str,
    ) -> UseOutcome {
        if state.cache.find_prompt(source, name).is_none() {
            operator.notify(&format!(
                "Prompt '{name}' is not known for MCP server '{source}'."
            ));
            return UseOutcome::NotFound;
        }

        if let Some(outcome) = self.require_connected(operator, source).await {
            return outcome;
        }

        let payload = match self.provider.get_prompt(source, name).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(source = %source, prompt = %name, error = %e, "Failed to get MCP prompt");
                operator.notify(&format!("Failed to get prompt '{name}' from '{source}': {e}"));
                return UseOutcome::Failed(e.to_string());
            }
        };

        match prompt_text(&payload).into_text() {
            Some(text) => {
                info!(source = %source, prompt = %name, "Sending MCP prompt");
                operator.deliver(&text);
                UseOutcome::Sent
            }
            None => {
                operator.notify(&format!(
                    "Prompt '{name}' from '{source}' returned no content."
                ));
                UseOutcome::EmptyResult
            }
        }
    }

    /// Read a cached resource and add it to the chat context
    pub async fn add_resource_to_context<R: HostRegistry>(
        &self,
        state: &mut HubState<R>,
        operator: &mut dyn Operator,
        source: &str,
        uri: &str,
    ) -> UseOutcome {
        let Some(resource) = state.cache.find_resource(source, uri).cloned() else {
            operator.notify(&format!(
                "Resource '{uri}' is not known for MCP server '{source}'."
            ));
            return UseOutcome::NotFound;
        };

        if let Some(outcome) = self.require_connected(operator, source).await {
            return outcome;
        }

        let payload = match self.provider.read_resource(source, uri).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(source = %source, uri = %uri, error = %e, "Failed to read MCP resource");
                operator.notify(&format!("Failed to read '{uri}' from '{source}': {e}"));
                return UseOutcome::Failed(e.to_string());
            }
        };

        let Some(content) = resource_text(&payload).into_text() else {
            operator.notify(&format!("Resource '{uri}' from '{source}' has no content."));
            return UseOutcome::EmptyResult;
        };

        let key = context_key(source, uri);
        let entry = ContextEntry {
            kind: ContextKind::McpResource,
            source: source.to_string(),
            uri: uri.to_string(),
            name: resource.name,
            description: resource.description,
            content,
            added_at: Utc::now(),
        };

        if state.registry.add_context_entry(key.clone(), entry) {
            info!(source = %source, key = %key, "Added MCP resource to context");
            operator.notify(&format!("Added {key} to context."));
            UseOutcome::Added { key }
        } else {
            operator.notify(&format!("{key} is already in context."));
            UseOutcome::AlreadyPresent { key }
        }
    }

    async fn require_connected(
        &self,
        operator: &mut dyn Operator,
        source: &str,
    ) -> Option<UseOutcome> {
        let status = self.provider.connection_status(source).await;
        if status.is_active() {
            return None;
        }
        debug!(source = %source, %status, "MCP server not connected at use");
        operator.notify(&format!(
            "MCP server '{source}' is not connected ({status}). Connect it first."
        ));
        Some(UseOutcome::DisconnectedAtUse {
            source: source.to_string(),
        })
    }

    /// Let the operator pick one cached prompt and send it
    pub async fn pick_prompt<R: HostRegistry>(
        &self,
        state: &HubState<R>,
        operator: &mut dyn Operator,
    ) -> Option<UseOutcome> {
        let entries: Vec<(String, String, String)> = state
            .prompts()
            .into_iter()
            .map(|p| (p.label(), p.source.clone(), p.name.clone()))
            .collect();
        if entries.is_empty() {
            operator.notify("No MCP prompts available. Connect or refresh a server first.");
            return None;
        }

        let labels: Vec<String> = entries.iter().map(|(label, _, _)| label.clone()).collect();
        let picked = operator.select("Select an MCP prompt", &labels);
        let (_, source, name) = entries
            .iter()
            .find(|(label, _, _)| picked.first() == Some(label))?;

        Some(self.send_prompt(state, operator, source, name).await)
    }

    /// Let the operator pick cached resources and add each to the context
    pub async fn pick_resources<R: HostRegistry>(
        &self,
        state: &mut HubState<R>,
        operator: &mut dyn Operator,
    ) -> Vec<UseOutcome> {
        let entries: Vec<(String, String, String)> = state
            .resources()
            .into_iter()
            .map(|r| (r.label(), r.source.clone(), r.uri.clone()))
            .collect();
        if entries.is_empty() {
            operator.notify("No MCP resources available. Connect or refresh a server first.");
            return Vec::new();
        }

        let labels: Vec<String> = entries.iter().map(|(label, _, _)| label.clone()).collect();
        let picked = operator.select("Select MCP resources to add to context", &labels);

        let mut outcomes = Vec::new();
        for (label, source, uri) in &entries {
            if picked.contains(label) {
                outcomes.push(self.add_resource_to_context(state, operator, source, uri).await);
            }
        }
        outcomes
    }

    /// Dispatch a registered tool to its source
    pub async fn call_tool<R: HostRegistry>(
        &self,
        state: &HubState<R>,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> ToolCallResponse {
        let Some(tool) = state.registry.find_tool(name) else {
            return ToolCallResponse::error(format!("Unknown tool: {name}"));
        };

        let status = self.provider.connection_status(&tool.source).await;
        if !status.is_active() {
            return ToolCallResponse::error(format!(
                "MCP server '{}' is not connected ({status})",
                tool.source
            ));
        }

        debug!(source = %tool.source, tool = %tool.name, "Calling MCP tool");
        match self
            .provider
            .call_tool(&tool.source, &tool.name, arguments)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(source = %tool.source, tool = %tool.name, error = %e, "MCP tool call failed");
                ToolCallResponse::error(e.to_string())
            }
        }
    }

    /// Status of every known source
    pub async fn status<R: HostRegistry>(&self, state: &HubState<R>) -> Vec<SourceStatus> {
        let mut rows = Vec::new();
        for name in self.provider.list_sources() {
            let status = self.provider.connection_status(&name).await;
            let tools = state
                .registry
                .tools_in(&Category::for_source(name.clone()))
                .len();
            let cached = state.cache.get(&name);
            rows.push(SourceStatus {
                prompts: cached.map(|c| c.prompts.len()),
                resources: cached.map(|c| c.resources.len()),
                name,
                status,
                tools,
            });
        }
        rows
    }
}

/// Requested names that are known, deduplicated; unknown ones are reported
fn resolve_requested(
    known: &[String],
    requested: &[String],
    operator: &mut dyn Operator,
) -> Vec<String> {
    if requested.is_empty() {
        return known.to_vec();
    }

    let mut resolved: Vec<String> = Vec::new();
    let mut unknown = Vec::new();
    for name in requested {
        if !known.contains(name) {
            unknown.push(name.as_str());
        } else if !resolved.contains(name) {
            resolved.push(name.clone());
        }
    }

    if !unknown.is_empty() {
        warn!(unknown = ?unknown, "Ignoring unknown MCP servers");
        operator.notify(&format!("Unknown MCP server(s): {}", unknown.join(", ")));
    }
    resolved
}
