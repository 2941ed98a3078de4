//! Lenient data model for one transcript log line.
//!
//! Every field is optional: the scan cares only about the handful of fields
//! it reads, and anything else in a record is ignored rather than rejected.

use serde::Deserialize;
use serde_json::Value;

/// One line of a transcript log.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptEntry {
    /// Record discriminator ("assistant", "user", ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<TranscriptMessage>,
    /// Host-level result payload attached to completion acknowledgements.
    #[serde(rename = "toolUseResult", default)]
    pub tool_use_result: Option<Value>,
    /// Distinguishes external human entries from tool-result echoes.
    #[serde(rename = "userType", default)]
    pub user_type: Option<String>,
}

/// The `message` object of a transcript entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptMessage {
    #[serde(default)]
    pub role: Option<String>,
    /// Content is a string or a list of typed items, depending on the writer.
    #[serde(default)]
    pub content: Option<Value>,
}

/// A typed item inside `message.content`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    #[serde(rename = "tool_use")]
    ToolUse {
        /// Per-action correlation token.
        #[serde(default)]
        id: Option<String>,
        /// Declared action name.
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        input: Option<Value>,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        /// Correlation token this result responds to.
        #[serde(default)]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Option<Value>,
    },
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl TranscriptEntry {
    /// Parse one log line. Empty and malformed lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }

    /// Typed content items of this entry's message, skipping items that
    /// don't match any known shape.
    pub fn content_items(&self) -> Vec<ContentItem> {
        let Some(Value::Array(items)) = self.message.as_ref().and_then(|m| m.content.as_ref())
        else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }
}

/// Flatten a tool-result `content` payload into searchable text.
///
/// Results arrive as a plain string, a list of text items, or an arbitrary
/// nested object; in every case the worker identifier is matched as a
/// substring, so unknown shapes are serialized rather than dropped.
pub fn result_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Object(map) => map
                    .get("text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string()),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
