//! Human and assistant text recovery from transcript content payloads.
//!
//! Tool payloads are not prose: `tool_use` and `tool_result` items are
//! always skipped, and only `text`-shaped items (or plain strings) count.

use std::path::Path;

use serde_json::Value;

use crate::transcript::record::TranscriptEntry;

/// Extract prose from a `message.content` value, ignoring tool payloads.
pub fn human_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => non_empty(s),
        Value::Object(_) => object_text(content),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => non_empty(s),
                    Value::Object(_) => object_text(item),
                    _ => None,
                })
                .collect();
            non_empty(&parts.join("\n"))
        }
        _ => None,
    }
}

fn object_text(item: &Value) -> Option<String> {
    let kind = item.get("type").and_then(Value::as_str);
    if matches!(kind, Some("tool_use") | Some("tool_result")) {
        return None;
    }
    item.get("text").and_then(Value::as_str).and_then(non_empty)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Last *human* prompt in a transcript: user entries only, external
/// user-type only (tool results are often also logged as "user").
///
/// Any failure (missing file, unreadable path, no matching entry)
/// yields `None`.
pub async fn last_user_prompt(path: &Path) -> Option<String> {
    let log_text = tokio::fs::read_to_string(path).await.ok()?;
    let mut last = None;
    for line in log_text.lines() {
        let Some(entry) = TranscriptEntry::parse_line(line) else {
            continue;
        };
        if entry.kind.as_deref() != Some("user") {
            continue;
        }
        if !matches!(entry.user_type.as_deref(), None | Some("external")) {
            continue;
        }
        let Some(message) = &entry.message else {
            continue;
        };
        if message.role.as_deref() != Some("user") {
            continue;
        }
        if let Some(text) = message.content.as_ref().and_then(human_text) {
            last = Some(text);
        }
    }
    last
}

/// Last assistant-authored prose in a transcript — the worker's final
/// output when only its log path is known.
pub async fn last_assistant_text(path: &Path) -> Option<String> {
    let log_text = tokio::fs::read_to_string(path).await.ok()?;
    let mut last = None;
    for line in log_text.lines() {
        let Some(entry) = TranscriptEntry::parse_line(line) else {
            continue;
        };
        if entry.kind.as_deref() != Some("assistant") {
            continue;
        }
        let Some(message) = &entry.message else {
            continue;
        };
        if let Some(text) = message.content.as_ref().and_then(human_text) {
            last = Some(text);
        }
    }
    last
}
