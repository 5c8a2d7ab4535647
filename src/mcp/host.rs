//! Host registry
//!
//! The host's flat, category-keyed tool registry and its chat context
//! store. `ToolRegistry` is the in-memory implementation.

use super::capability::{Category, ToolCapability};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scheme of synthetic context keys (`mcp://<source>/<uri>`)
pub const CONTEXT_KEY_SCHEME: &str = "mcp";

/// Build the context key for a resource
pub fn context_key(source: &str, uri: &str) -> String {
    format!("{CONTEXT_KEY_SCHEME}://{source}/{uri}")
}

/// Kind of a context entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Content read from an MCP resource
    McpResource,
}

/// Entry in the chat context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub kind: ContextKind,
    pub source: String,
    pub uri: String,
    pub name: String,
    pub description: String,
    pub content: String,
    pub added_at: DateTime<Utc>,
}

/// Registry the reconciler writes into
///
/// All mutation goes through `&mut self`, so a category is removed as a
/// whole before any reader can observe the registry again.
pub trait HostRegistry {
    /// Register `tool` under `category`; false if the pair was already present
    fn register_tool(&mut self, category: &Category, tool: ToolCapability) -> bool;

    /// Remove every tool of `category`; returns how many were removed
    fn unregister_category(&mut self, category: &Category) -> usize;

    /// Categories that currently hold at least one tool
    fn registered_categories(&self) -> Vec<Category>;

    /// Tool names registered under `category`, sorted
    fn tools_in(&self, category: &Category) -> Vec<String>;

    /// Insert a context entry; false (and no change) if `key` already exists
    fn add_context_entry(&mut self, key: String, entry: ContextEntry) -> bool;

    /// Look a tool up by plain or `source:tool` qualified name
    fn find_tool(&self, name: &str) -> Option<&ToolCapability>;
}

/// In-memory host registry
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    categories: BTreeMap<Category, BTreeMap<String, ToolCapability>>,
    context: BTreeMap<String, ContextEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered tools
    pub fn tool_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    /// Snapshot as `category -> tool names`
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.categories
            .iter()
            .map(|(category, tools)| (category.to_string(), tools.keys().cloned().collect()))
            .collect()
    }

    /// Context entries, keyed
    pub fn context_entries(&self) -> &BTreeMap<String, ContextEntry> {
        &self.context
    }

    /// Drop a context entry
    pub fn remove_context_entry(&mut self, key: &str) -> Option<ContextEntry> {
        self.context.remove(key)
    }
}

impl HostRegistry for ToolRegistry {
    fn register_tool(&mut self, category: &Category, tool: ToolCapability) -> bool {
        self.categories
            .entry(category.clone())
            .or_default()
            .insert(tool.name.clone(), tool)
            .is_none()
    }

    fn unregister_category(&mut self, category: &Category) -> usize {
        self.categories
            .remove(category)
            .map(|tools| tools.len())
            .unwrap_or(0)
    }

    fn registered_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|(_, tools)| !tools.is_empty())
            .map(|(category, _)| category.clone())
            .collect()
    }

    fn tools_in(&self, category: &Category) -> Vec<String> {
        self.categories
            .get(category)
            .map(|tools| tools.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn add_context_entry(&mut self, key: String, entry: ContextEntry) -> bool {
        if self.context.contains_key(&key) {
            return false;
        }
        self.context.insert(key, entry);
        true
    }

    fn find_tool(&self, name: &str) -> Option<&ToolCapability> {
        if let Some((source, tool)) = name.split_once(':') {
            let qualified = self
                .categories
                .get(&Category::for_source(source))
                .and_then(|tools| tools.get(tool));
            if qualified.is_some() {
                return qualified;
            }
        }

        self.categories.values().find_map(|tools| tools.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, uri: &str, content: &str) -> ContextEntry {
        ContextEntry {
            kind: ContextKind::McpResource,
            source: source.to_string(),
            uri: uri.to_string(),
            name: uri.to_string(),
            description: String::new(),
            content: content.to_string(),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_register_without_duplicates() {
        let mut registry = ToolRegistry::new();
        let category = Category::for_source("git");

        assert!(registry.register_tool(&category, ToolCapability::new("git", "status")));
        assert!(!registry.register_tool(&category, ToolCapability::new("git", "status")));
        assert!(registry.register_tool(&category, ToolCapability::new("git", "log")));

        assert_eq!(registry.tool_count(), 2);
        assert_eq!(registry.tools_in(&category), vec!["log", "status"]);
    }

    #[test]
    fn test_unregister_category_is_whole() {
        let mut registry = ToolRegistry::new();
        let a = Category::for_source("a");
        let b = Category::for_source("b");
        registry.register_tool(&a, ToolCapability::new("a", "t1"));
        registry.register_tool(&a, ToolCapability::new("a", "t2"));
        registry.register_tool(&b, ToolCapability::new("b", "t3"));

        assert_eq!(registry.unregister_category(&a), 2);
        assert_eq!(registry.unregister_category(&a), 0);
        assert_eq!(registry.registered_categories(), vec![b.clone()]);
        assert_eq!(registry.tools_in(&b), vec!["t3"]);
    }

    #[test]
    fn test_find_tool() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(&Category::for_source("a"), ToolCapability::new("a", "search"));
        registry.register_tool(&Category::for_source("b"), ToolCapability::new("b", "search"));

        assert_eq!(registry.find_tool("b:search").map(|t| t.source.as_str()), Some("b"));
        assert!(registry.find_tool("search").is_some());
        assert!(registry.find_tool("missing").is_none());
    }

    #[test]
    fn test_context_key_dedup() {
        let mut registry = ToolRegistry::new();
        let key = context_key("fs", "file:///notes.md");
        assert_eq!(key, "mcp://fs/file:///notes.md");

        assert!(registry.add_context_entry(key.clone(), entry("fs", "file:///notes.md", "v1")));
        assert!(!registry.add_context_entry(key.clone(), entry("fs", "file:///notes.md", "v2")));

        assert_eq!(registry.context_entries().len(), 1);
        assert_eq!(registry.context_entries()[&key].content, "v1");
    }

    #[test]
    fn test_removed_context_entry_can_be_added_again() {
        let mut registry = ToolRegistry::new();
        let key = context_key("fs", "file:///a");
        registry.add_context_entry(key.clone(), entry("fs", "file:///a", "v1"));

        let removed = registry.remove_context_entry(&key);
        assert_eq!(removed.map(|e| e.content), Some("v1".to_string()));
        assert!(registry.remove_context_entry(&key).is_none());

        assert!(registry.add_context_entry(key.clone(), entry("fs", "file:///a", "v2")));
        assert_eq!(registry.context_entries()[&key].content, "v2");
    }
}
