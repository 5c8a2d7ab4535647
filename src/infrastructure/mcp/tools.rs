//! MCP Tool Helpers
//!
//! Conversions from rmcp wire types into the hub's capability types.

use crate::mcp::{
    ContentItem, PromptArgument, PromptCapability, ResourceCapability, ToolCallResponse,
    ToolCapability,
};
use rmcp::model::{CallToolResult, Prompt, RawContent, Resource, ResourceContents, Tool};
use serde_json::Value;

/// Tool capability from an rmcp `Tool`
pub fn tool_capability(source: &str, tool: &Tool) -> ToolCapability {
    ToolCapability {
        source: source.to_string(),
        name: tool.name.to_string(),
        description: tool
            .description
            .as_ref()
            .map(std::string::ToString::to_string),
        input_schema: serde_json::to_value(&tool.input_schema).ok(),
    }
}

/// Prompt capability from an rmcp `Prompt`
pub fn prompt_capability(source: &str, prompt: &Prompt) -> PromptCapability {
    let mut capability = PromptCapability::new(
        source,
        prompt.name.clone(),
        prompt.description.clone().unwrap_or_default(),
    );
    capability.arguments = prompt
        .arguments
        .iter()
        .flatten()
        .map(|arg| PromptArgument {
            name: arg.name.clone(),
            description: arg.description.clone(),
            required: arg.required.unwrap_or(false),
        })
        .collect();
    capability
}

/// Resource capability from an rmcp `Resource`
pub fn resource_capability(source: &str, resource: &Resource) -> ResourceCapability {
    let raw = &resource.raw;
    let mut capability = ResourceCapability::new(
        source,
        raw.uri.clone(),
        raw.name.clone(),
        raw.description.clone().unwrap_or_default(),
    );
    capability.mime_type = raw.mime_type.clone();
    capability
}

/// Tool call response from an rmcp `CallToolResult`
pub fn tool_response(result: &CallToolResult) -> ToolCallResponse {
    let content = result
        .content
        .iter()
        .map(|item| match &item.raw {
            RawContent::Text(t) => ContentItem::Text(t.text.clone()),
            RawContent::Image(img) => ContentItem::Image {
                mime_type: img.mime_type.clone(),
            },
            RawContent::Audio(audio) => ContentItem::Audio {
                mime_type: audio.mime_type.clone(),
            },
            RawContent::Resource(res) => match &res.resource {
                ResourceContents::TextResourceContents { uri, text, .. } => {
                    ContentItem::Resource {
                        uri: uri.clone(),
                        text: Some(text.clone()),
                    }
                }
                ResourceContents::BlobResourceContents { uri, .. } => ContentItem::Resource {
                    uri: uri.clone(),
                    text: None,
                },
            },
            RawContent::ResourceLink(link) => ContentItem::Resource {
                uri: link.uri.clone(),
                text: None,
            },
        })
        .collect();

    ToolCallResponse::from_content(content, result.is_error.unwrap_or(false))
}

/// Parse console tool arguments
///
/// A JSON object is used as is; any other JSON value or plain text is
/// passed as `{"input": ...}`. Blank input means no arguments.
pub fn parse_tool_arguments(input: &str) -> Option<serde_json::Map<String, Value>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let value = serde_json::from_str::<Value>(input)
        .unwrap_or_else(|_| Value::String(input.to_string()));

    match value {
        Value::Object(map) => Some(map),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("input".to_string(), other);
            Some(map)
        }
    }
}
