//! Capability records
//!
//! Tools, prompts and resources advertised by a source, plus the
//! `Category` key tools are grouped under in the host registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Display prefix for categories (`mcp-<source>`)
pub const CATEGORY_PREFIX: &str = "mcp-";

/// Registry key identifying the source a tool came from
///
/// The source is carried as a field; the prefixed string is only a
/// rendering and is never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category {
    source: String,
}

impl Category {
    /// Category for tools of `source`
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Name of the owning source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this category belongs to `source`
    pub fn is_from(&self, source: &str) -> bool {
        self.source == source
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CATEGORY_PREFIX, self.source)
    }
}

/// Tool advertised by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCapability {
    /// Owning source name
    pub source: String,
    /// Tool name, unique within the source
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: Option<String>,
    /// Input schema (JSON Schema)
    #[serde(default)]
    pub input_schema: Option<Value>,
}

impl ToolCapability {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Registry category this tool belongs to
    pub fn category(&self) -> Category {
        Category::for_source(self.source.clone())
    }

    /// Fully qualified name (`source:tool`)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.source, self.name)
    }
}

/// Argument accepted by a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Prompt advertised by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptCapability {
    /// Owning source name
    pub source: String,
    /// Prompt name, unique within the source
    pub name: String,
    /// Prompt description
    #[serde(default)]
    pub description: String,
    /// Declared arguments
    #[serde(default)]
    pub arguments: Vec<PromptArgument>,
}

impl PromptCapability {
    pub fn new(
        source: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            description: description.into(),
            arguments: Vec::new(),
        }
    }

    /// Source-qualified label used in selection lists
    pub fn label(&self) -> String {
        labelled(&self.source, &self.name, &self.description)
    }
}

/// Resource advertised by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCapability {
    /// Owning source name
    pub source: String,
    /// Resource URI, unique within the source
    pub uri: String,
    /// Resource name
    pub name: String,
    /// Resource description
    #[serde(default)]
    pub description: String,
    /// MIME type
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ResourceCapability {
    pub fn new(
        source: impl Into<String>,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            uri: uri.into(),
            name: name.into(),
            description: description.into(),
            mime_type: None,
        }
    }

    /// Source-qualified label used in selection lists
    pub fn label(&self) -> String {
        let name = if self.name.is_empty() {
            &self.uri
        } else {
            &self.name
        };
        labelled(&self.source, name, &self.description)
    }
}

fn labelled(source: &str, name: &str, description: &str) -> String {
    if description.is_empty() {
        format!("{source}: {name}")
    } else {
        format!("{source}: {name} - {description}")
    }
}
