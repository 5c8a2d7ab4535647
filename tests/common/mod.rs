//! Shared fixtures: an in-memory capability provider and a scripted operator

#![allow(dead_code)]

use async_trait::async_trait;
use mcp_hub::mcp::{
    CapabilitySourceProvider, ConnectionStatus, ContentItem, McpError, McpResult, Operator,
    PromptCapability, ResourceCapability, StartReport, ToolCallResponse, ToolCapability,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// One fake MCP server
#[derive(Debug, Clone)]
pub struct FakeSource {
    pub name: String,
    pub status: ConnectionStatus,
    pub start_succeeds: bool,
    pub tools: Vec<String>,
    pub prompts: Vec<PromptCapability>,
    pub resources: Vec<ResourceCapability>,
    pub prompt_payloads: HashMap<String, Value>,
    pub resource_payloads: HashMap<String, Value>,
    pub listing_fails: bool,
}

impl FakeSource {
    fn with_status(name: &str, status: ConnectionStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            start_succeeds: true,
            tools: Vec::new(),
            prompts: Vec::new(),
            resources: Vec::new(),
            prompt_payloads: HashMap::new(),
            resource_payloads: HashMap::new(),
            listing_fails: false,
        }
    }

    pub fn connected(name: &str) -> Self {
        Self::with_status(name, ConnectionStatus::Connected)
    }

    pub fn disconnected(name: &str) -> Self {
        Self::with_status(name, ConnectionStatus::Disconnected)
    }

    pub fn tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn fails_to_start(mut self) -> Self {
        self.start_succeeds = false;
        self
    }

    pub fn listing_fails(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Prompt whose `prompts/get` payload carries `text` as its first message
    pub fn prompt(mut self, name: &str, text: &str) -> Self {
        self.prompts
            .push(PromptCapability::new(self.name.clone(), name, ""));
        self.prompt_payloads
            .insert(name.to_string(), prompt_payload(text));
        self
    }

    pub fn prompt_with_payload(mut self, name: &str, payload: Value) -> Self {
        self.prompts
            .push(PromptCapability::new(self.name.clone(), name, ""));
        self.prompt_payloads.insert(name.to_string(), payload);
        self
    }

    /// Resource whose `resources/read` payload carries `text`
    pub fn resource(mut self, uri: &str, name: &str, text: &str) -> Self {
        self.resources
            .push(ResourceCapability::new(self.name.clone(), uri, name, ""));
        self.resource_payloads.insert(
            uri.to_string(),
            json!({ "contents": [{ "uri": uri, "mimeType": "text/plain", "text": text }] }),
        );
        self
    }
}

pub fn prompt_payload(text: &str) -> Value {
    json!({
        "description": "test prompt",
        "messages": [{ "role": "user", "content": { "type": "text", "text": text } }]
    })
}

type Sources = Arc<Mutex<BTreeMap<String, FakeSource>>>;

/// In-memory provider
///
/// Starts complete before `start_sources` returns unless a start delay is
/// set, in which case a spawned task applies them and reports afterwards.
#[derive(Default)]
pub struct FakeProvider {
    order: Vec<String>,
    sources: Sources,
    start_delay: Option<Duration>,
    start_requests: Mutex<Vec<Vec<String>>>,
    stopped: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, String, Option<serde_json::Map<String, Value>>)>>,
}

impl FakeProvider {
    pub fn new(sources: Vec<FakeSource>) -> Self {
        Self {
            order: sources.iter().map(|s| s.name.clone()).collect(),
            sources: Arc::new(Mutex::new(
                sources.into_iter().map(|s| (s.name.clone(), s)).collect(),
            )),
            ..Self::default()
        }
    }

    /// Finish starts on a background task after `delay`
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn set_status(&self, source: &str, status: ConnectionStatus) {
        if let Some(s) = self.sources.lock().unwrap().get_mut(source) {
            s.status = status;
        }
    }

    pub fn update(&self, source: &str, f: impl FnOnce(&mut FakeSource)) {
        if let Some(s) = self.sources.lock().unwrap().get_mut(source) {
            f(s);
        }
    }

    pub fn start_requests(&self) -> Vec<Vec<String>> {
        self.start_requests.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.start_requests().into_iter().flatten().collect()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }

    pub fn tool_calls(&self) -> Vec<(String, String, Option<serde_json::Map<String, Value>>)> {
        self.calls.lock().unwrap().clone()
    }

    fn connected_source(&self, source: &str) -> McpResult<FakeSource> {
        let sources = self.sources.lock().unwrap();
        let s = sources
            .get(source)
            .ok_or_else(|| McpError::server_not_found(source))?;
        if s.status != ConnectionStatus::Connected {
            return Err(McpError::not_connected(source));
        }
        Ok(s.clone())
    }
}

fn apply_starts(known: &Sources, sources: Vec<String>) -> StartReport {
    let mut report = StartReport::default();
    let mut known = known.lock().unwrap();
    for name in sources {
        match known.get_mut(&name) {
            Some(s) if s.start_succeeds => {
                s.status = ConnectionStatus::Connected;
                report.started.push(name);
            }
            Some(s) => {
                s.status = ConnectionStatus::Error;
                report.failed.push((name, "spawn failed".to_string()));
            }
            None => report.failed.push((name, "unknown".to_string())),
        }
    }
    report
}

#[async_trait]
impl CapabilitySourceProvider for FakeProvider {
    fn list_sources(&self) -> Vec<String> {
        self.order.clone()
    }

    async fn connection_status(&self, source: &str) -> ConnectionStatus {
        self.sources
            .lock()
            .unwrap()
            .get(source)
            .map(|s| s.status)
            .unwrap_or_default()
    }

    fn start_sources(&self, sources: Vec<String>) -> oneshot::Receiver<StartReport> {
        self.start_requests.lock().unwrap().push(sources.clone());

        let (tx, rx) = oneshot::channel();
        match self.start_delay {
            Some(delay) => {
                let known = Arc::clone(&self.sources);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(apply_starts(&known, sources));
                });
            }
            None => {
                let _ = tx.send(apply_starts(&self.sources, sources));
            }
        }
        rx
    }

    fn stop_source(&self, source: &str) {
        self.stopped.lock().unwrap().push(source.to_string());
        self.set_status(source, ConnectionStatus::Disconnected);
    }

    async fn list_tools(&self, source: &str) -> McpResult<Vec<ToolCapability>> {
        let s = self.connected_source(source)?;
        if s.listing_fails {
            return Err(McpError::request("tools/list failed"));
        }
        Ok(s.tools
            .iter()
            .map(|t| ToolCapability::new(source, t.as_str()))
            .collect())
    }

    async fn list_prompts(&self, source: &str) -> McpResult<Vec<PromptCapability>> {
        let s = self.connected_source(source)?;
        if s.listing_fails {
            return Err(McpError::request("prompts/list failed"));
        }
        Ok(s.prompts)
    }

    async fn list_resources(&self, source: &str) -> McpResult<Vec<ResourceCapability>> {
        let s = self.connected_source(source)?;
        if s.listing_fails {
            return Err(McpError::request("resources/list failed"));
        }
        Ok(s.resources)
    }

    async fn get_prompt(&self, source: &str, prompt: &str) -> McpResult<Value> {
        let s = self.connected_source(source)?;
        s.prompt_payloads
            .get(prompt)
            .cloned()
            .ok_or_else(|| McpError::request(format!("unknown prompt {prompt}")))
    }

    async fn read_resource(&self, source: &str, uri: &str) -> McpResult<Value> {
        let s = self.connected_source(source)?;
        s.resource_payloads
            .get(uri)
            .cloned()
            .ok_or_else(|| McpError::request(format!("unknown resource {uri}")))
    }

    async fn call_tool(
        &self,
        source: &str,
        tool: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> McpResult<ToolCallResponse> {
        self.connected_source(source)?;
        self.calls
            .lock()
            .unwrap()
            .push((source.to_string(), tool.to_string(), arguments));
        Ok(ToolCallResponse::from_content(
            vec![ContentItem::Text(format!("{source}:{tool} ok"))],
            false,
        ))
    }
}

/// Operator answering from queues and recording everything shown
#[derive(Default)]
pub struct ScriptedOperator {
    pub selections: VecDeque<Vec<String>>,
    pub confirmations: VecDeque<bool>,
    /// (title, choices) of every selection offered
    pub offered: Vec<(String, Vec<String>)>,
    pub questions: Vec<String>,
    pub notices: Vec<String>,
    pub delivered: Vec<String>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selecting(mut self, picks: &[&str]) -> Self {
        self.selections
            .push_back(picks.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn last_notice(&self) -> &str {
        self.notices.last().map(String::as_str).unwrap_or("")
    }
}

impl Operator for ScriptedOperator {
    fn select(&mut self, title: &str, choices: &[String]) -> Vec<String> {
        self.offered.push((title.to_string(), choices.to_vec()));
        self.selections.pop_front().unwrap_or_default()
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn deliver(&mut self, text: &str) {
        self.delivered.push(text.to_string());
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
