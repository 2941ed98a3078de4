//! Hook protocol types — JSON in on stdin, JSON out on stdout.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One hook event from the host. Every field is optional; hooks gate on
/// what is present rather than rejecting what is not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookEvent {
    /// Declared role of the worker the event concerns.
    #[serde(default)]
    pub subagent_type: Option<String>,
    /// Input text the worker was spawned with.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Externally-visible identifier of the completed worker.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Path to the parent (spawning) transcript log.
    #[serde(default)]
    pub transcript_path: Option<String>,
    /// Path to the completed worker's own transcript log.
    #[serde(default)]
    pub agent_transcript_path: Option<String>,
    /// Worker output passed inline by some hosts.
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    /// Working directory of the host session.
    #[serde(default)]
    pub cwd: Option<String>,
    /// Tool name for pre-tool-use events.
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Tool input for pre-tool-use events.
    #[serde(default)]
    pub tool_input: Option<Value>,
}

/// Hook response. Serializes to `{}` when nothing was done.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

/// Host envelope for hooks that rewrite tool input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub permission_decision: String,
    pub permission_decision_reason: String,
    pub updated_input: Value,
}

impl HookResponse {
    /// The hook did not apply; the host proceeds unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.error.is_none() && self.hook_specific_output.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_response_serializes_to_empty_object() {
        let json = serde_json::to_string(&HookResponse::empty()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn message_response_carries_only_message() {
        let json = serde_json::to_value(HookResponse::with_message("done")).unwrap();
        assert_eq!(json, json!({"message": "done"}));
    }

    #[test]
    fn event_tolerates_unknown_and_missing_fields() {
        let event: HookEvent = serde_json::from_value(json!({
            "agent_id": "a1",
            "something_unknown": {"nested": true}
        }))
        .unwrap();
        assert_eq!(event.agent_id.as_deref(), Some("a1"));
        assert!(event.prompt.is_none());
    }

    #[test]
    fn hook_specific_output_uses_camel_case() {
        let response = HookResponse {
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: "PreToolUse".into(),
                permission_decision: "allow".into(),
                permission_decision_reason: "test".into(),
                updated_input: json!({"prompt": "p"}),
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["hookSpecificOutput"]["hookEventName"], "PreToolUse");
        assert_eq!(json["hookSpecificOutput"]["permissionDecision"], "allow");
        assert_eq!(json["hookSpecificOutput"]["updatedInput"]["prompt"], "p");
    }
}
