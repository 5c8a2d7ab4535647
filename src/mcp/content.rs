//! Payload content helpers
//!
//! Text extraction from prompt/resource payloads and a transport-neutral
//! tool call response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text pulled out of a remote payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    /// Nested `text` field of the first entry
    Structured(String),
    /// First entry had no usable structure; whole payload rendered
    Raw(String),
    /// Nothing to deliver
    Empty,
}

impl ExtractedText {
    /// The text, if any
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Structured(text) | Self::Raw(text) => Some(text),
            Self::Empty => None,
        }
    }
}

/// Extract the first message's text from a `prompts/get` payload
pub fn prompt_text(payload: &Value) -> ExtractedText {
    let first = payload
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first());

    match first {
        Some(message) => first_text(message.get("content"), payload),
        None => ExtractedText::Empty,
    }
}

/// Extract the first content entry's text from a `resources/read` payload
pub fn resource_text(payload: &Value) -> ExtractedText {
    let first = payload
        .get("contents")
        .and_then(Value::as_array)
        .and_then(|contents| contents.first());

    match first {
        Some(entry) => first_text(Some(entry), payload),
        None => ExtractedText::Empty,
    }
}

fn first_text(content: Option<&Value>, payload: &Value) -> ExtractedText {
    let text = match content {
        Some(Value::String(text)) => Some(text.as_str()),
        Some(value) => value.get("text").and_then(Value::as_str),
        None => None,
    };

    match text {
        Some(text) if text.trim().is_empty() => ExtractedText::Empty,
        Some(text) => ExtractedText::Structured(text.to_string()),
        None => match serde_json::to_string_pretty(payload) {
            Ok(raw) => ExtractedText::Raw(raw),
            Err(_) => ExtractedText::Raw(payload.to_string()),
        },
    }
}

/// Simplified content item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text(String),
    Image { mime_type: String },
    Audio { mime_type: String },
    Resource { uri: String, text: Option<String> },
}

/// Tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResponse {
    /// Whether the call succeeded
    pub success: bool,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Text content from result
    pub text: Vec<String>,
    /// Raw content items
    #[serde(skip)]
    pub content: Vec<ContentItem>,
}

impl ToolCallResponse {
    /// Successful response from content items
    pub fn from_content(content: Vec<ContentItem>, is_error: bool) -> Self {
        let text = content
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect();

        Self {
            success: !is_error,
            error: None,
            text,
            content,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            text: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Get combined text content
    #[must_use]
    pub fn text_content(&self) -> String {
        self.text.join("\n")
    }
}

/// Format tool result for display
#[must_use]
pub fn format_tool_result(response: &ToolCallResponse) -> String {
    let mut output = String::new();

    if !response.success {
        if let Some(ref err) = response.error {
            output.push_str(&format!("Error: {err}\n"));
        }
    }

    for (i, item) in response.content.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        match item {
            ContentItem::Text(text) => output.push_str(text),
            ContentItem::Image { mime_type } => output.push_str(&format!("[Image: {mime_type}]")),
            ContentItem::Audio { mime_type } => output.push_str(&format!("[Audio: {mime_type}]")),
            ContentItem::Resource { uri, text } => {
                output.push_str(&format!("[Resource: {uri}]"));
                if let Some(t) = text {
                    output.push_str(&format!("\n{t}"));
                }
            }
        }
    }

    output
}
