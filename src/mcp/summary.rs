//! Operation summaries
//!
//! Every reconciler operation ends in one of these; their `Display` is the
//! message shown to the operator.

use super::ConnectionStatus;
use std::fmt;

/// How a connect operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Working set was processed
    Connected,
    /// Every requested source was already registered
    AlreadyRegistered,
    /// Operator selected nothing
    Cancelled,
}

/// Result of `Reconciler::connect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSummary {
    pub outcome: ConnectOutcome,
    /// Sources the operation worked on
    pub sources: Vec<String>,
    /// Tools newly registered
    pub tools_added: usize,
    /// Sources that were inactive and had to be started
    pub attempted_start: Vec<String>,
    /// Sources still inactive after the start request
    pub failed: Vec<String>,
    /// Sources that were connected when their tools were queried
    pub live: Vec<String>,
}

impl ConnectSummary {
    pub(crate) fn without_work(outcome: ConnectOutcome) -> Self {
        Self {
            outcome,
            sources: Vec::new(),
            tools_added: 0,
            attempted_start: Vec::new(),
            failed: Vec::new(),
            live: Vec::new(),
        }
    }

    /// Sources that were started by this operation
    pub fn started(&self) -> usize {
        self.attempted_start.len() - self.failed.len()
    }
}

impl fmt::Display for ConnectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            ConnectOutcome::AlreadyRegistered => write!(
                f,
                "All MCP servers are already connected; prompts and resources refreshed."
            ),
            ConnectOutcome::Cancelled => write!(f, "No MCP servers selected."),
            ConnectOutcome::Connected => {
                write!(
                    f,
                    "Added {} tool(s) from {} MCP server(s).",
                    self.tools_added,
                    self.live.len()
                )?;
                if !self.attempted_start.is_empty() {
                    write!(
                        f,
                        " Started {}/{} server(s).",
                        self.started(),
                        self.attempted_start.len()
                    )?;
                }
                if !self.failed.is_empty() {
                    write!(
                        f,
                        " {}/{} servers failed to start: {}",
                        self.failed.len(),
                        self.attempted_start.len(),
                        self.failed.join(", ")
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// How a disconnect operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Categories were removed from the registry
    Removed,
    /// Nothing registered matched and every source was already inactive
    AllInactive,
    /// Nothing registered matched; active sources were shut down
    Shutdown,
    /// Operator declined or selected nothing
    Cancelled,
}

/// Result of `Reconciler::disconnect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectSummary {
    pub outcome: DisconnectOutcome,
    /// Sources whose category was removed
    pub removed: Vec<String>,
    /// Tools dropped from the registry
    pub tools_removed: usize,
    /// Sources asked to stop
    pub stopped: Vec<String>,
}

impl DisconnectSummary {
    pub(crate) fn new(outcome: DisconnectOutcome) -> Self {
        Self {
            outcome,
            removed: Vec::new(),
            tools_removed: 0,
            stopped: Vec::new(),
        }
    }
}

impl fmt::Display for DisconnectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            DisconnectOutcome::AllInactive => write!(f, "All MCP servers are already inactive."),
            DisconnectOutcome::Cancelled => write!(f, "No MCP servers disconnected."),
            DisconnectOutcome::Shutdown => write!(
                f,
                "Stopped {} active MCP server(s): {}",
                self.stopped.len(),
                self.stopped.join(", ")
            ),
            DisconnectOutcome::Removed => {
                write!(
                    f,
                    "Removed {} tool(s) from {} MCP server(s).",
                    self.tools_removed,
                    self.removed.len()
                )?;
                if !self.stopped.is_empty() {
                    write!(f, " Stopped: {}", self.stopped.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Result of a prompt/resource cache refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Sources whose entry was overwritten
    pub refreshed: Vec<String>,
    /// Sources skipped because they were not connected
    pub skipped: Vec<String>,
    /// Sources whose fetch failed, entry left untouched
    pub failed: Vec<(String, String)>,
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Refreshed {} MCP server(s)", self.refreshed.len())?;
        if !self.skipped.is_empty() {
            write!(f, ", {} not connected", self.skipped.len())?;
        }
        if !self.failed.is_empty() {
            write!(f, ", {} failed", self.failed.len())?;
        }
        write!(f, ".")
    }
}

/// Result of sending a prompt or adding a resource to context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseOutcome {
    /// Prompt text delivered to the interaction surface
    Sent,
    /// Resource added to the context under this key
    Added { key: String },
    /// Context already held this key
    AlreadyPresent { key: String },
    /// Not in the known-capabilities cache
    NotFound,
    /// Source not connected at use time
    DisconnectedAtUse { source: String },
    /// Call succeeded but returned nothing usable
    EmptyResult,
    /// Call to the source failed
    Failed(String),
}

/// One row of `Reconciler::status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: String,
    pub status: ConnectionStatus,
    /// Tools registered with the host
    pub tools: usize,
    /// Cached prompt count, if the source was ever refreshed
    pub prompts: Option<usize>,
    /// Cached resource count, if the source was ever refreshed
    pub resources: Option<usize>,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = |n: Option<usize>| n.map_or_else(|| "-".to_string(), |n| n.to_string());
        write!(
            f,
            "{:<20} {:<12} tools={} prompts={} resources={}",
            self.name,
            self.status.to_string(),
            self.tools,
            count(self.prompts),
            count(self.resources)
        )
    }
}
