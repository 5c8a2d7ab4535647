//! Known-capabilities cache
//!
//! Most recently fetched prompt and resource listings per source. Entries
//! are only overwritten by a successful fetch from a connected source, so
//! an entry may outlive its source's connection.

use super::capability::{PromptCapability, ResourceCapability};
use std::collections::BTreeMap;

/// Cached listings of one source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCapabilities {
    pub prompts: Vec<PromptCapability>,
    pub resources: Vec<ResourceCapability>,
}

/// Prompt/resource listings keyed by source name
#[derive(Debug, Clone, Default)]
pub struct KnownCapabilities {
    entries: BTreeMap<String, SourceCapabilities>,
}

impl KnownCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry of `source`
    pub fn store(
        &mut self,
        source: impl Into<String>,
        prompts: Vec<PromptCapability>,
        resources: Vec<ResourceCapability>,
    ) {
        self.entries
            .insert(source.into(), SourceCapabilities { prompts, resources });
    }

    pub fn get(&self, source: &str) -> Option<&SourceCapabilities> {
        self.entries.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    /// Drop the entry of `source`
    pub fn forget(&mut self, source: &str) -> Option<SourceCapabilities> {
        self.entries.remove(source)
    }

    /// Every cached prompt, ordered by source then name
    pub fn prompts(&self) -> Vec<&PromptCapability> {
        let mut prompts: Vec<_> = self.entries.values().flat_map(|e| e.prompts.iter()).collect();
        prompts.sort_by(|a, b| (&a.source, &a.name).cmp(&(&b.source, &b.name)));
        prompts
    }

    /// Every cached resource, ordered by source then URI
    pub fn resources(&self) -> Vec<&ResourceCapability> {
        let mut resources: Vec<_> = self
            .entries
            .values()
            .flat_map(|e| e.resources.iter())
            .collect();
        resources.sort_by(|a, b| (&a.source, &a.uri).cmp(&(&b.source, &b.uri)));
        resources
    }

    pub fn find_prompt(&self, source: &str, name: &str) -> Option<&PromptCapability> {
        self.get(source)
            .and_then(|entry| entry.prompts.iter().find(|p| p.name == name))
    }

    pub fn find_resource(&self, source: &str, uri: &str) -> Option<&ResourceCapability> {
        self.get(source)
            .and_then(|entry| entry.resources.iter().find(|r| r.uri == uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_overwrites() {
        let mut cache = KnownCapabilities::new();
        cache.store("a", vec![PromptCapability::new("a", "p1", "")], vec![]);
        cache.store("a", vec![PromptCapability::new("a", "p2", "")], vec![]);

        assert!(cache.find_prompt("a", "p1").is_none());
        assert!(cache.find_prompt("a", "p2").is_some());
    }

    #[test]
    fn test_flat_listing_order() {
        let mut cache = KnownCapabilities::new();
        cache.store(
            "b",
            vec![PromptCapability::new("b", "zeta", "")],
            vec![ResourceCapability::new("b", "file:///b", "b", "")],
        );
        cache.store(
            "a",
            vec![
                PromptCapability::new("a", "review", ""),
                PromptCapability::new("a", "explain", ""),
            ],
            vec![],
        );

        let labels: Vec<String> = cache.prompts().iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["a: explain", "a: review", "b: zeta"]);
        assert_eq!(cache.resources().len(), 1);
        assert!(cache.find_resource("b", "file:///b").is_some());
        assert!(cache.find_resource("a", "file:///b").is_none());
    }

    #[test]
    fn test_forget() {
        let mut cache = KnownCapabilities::new();
        cache.store("a", vec![], vec![]);
        assert!(cache.contains("a"));
        assert!(cache.forget("a").is_some());
        assert!(!cache.contains("a"));
    }
}
