//! Prompt-extension hook — injects the workflow I/O contract into spawn input.
//!
//! Runs before the spawn tool executes. Workers only honor the report
//! convention if their prompt spells it out, so the contract block is
//! prepended to every family spawn that carries workflow context.

use serde_json::Value;
use tracing::debug;

use crate::config::HookConfig;
use crate::hooks::event::{HookEvent, HookResponse, HookSpecificOutput};
use crate::workflow::context::extract_context;
use crate::workflow::contract::{CONTRACT_MARKER, render_contract};

/// Prompt extender for spawn tool input.
pub struct PromptExtender {
    config: HookConfig,
}

impl PromptExtender {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }

    /// Extend the spawn prompt, or answer empty when the event does not
    /// apply. Idempotent: an already-extended prompt passes through.
    pub fn extend(&self, event: &HookEvent) -> HookResponse {
        if let Some(tool_name) = &event.tool_name {
            if tool_name != &self.config.spawn_tool {
                return HookResponse::empty();
            }
        }

        let Some(Value::Object(tool_input)) = &event.tool_input else {
            return HookResponse::empty();
        };

        let role = tool_input
            .get("subagent_type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !self.config.role_matches(role) {
            return HookResponse::empty();
        }

        let Some(prompt) = tool_input.get("prompt").and_then(Value::as_str) else {
            return HookResponse::empty();
        };
        if prompt.contains(CONTRACT_MARKER) {
            debug!("contract block already present, skipping injection");
            return HookResponse::empty();
        }

        let ctx = extract_context(prompt);
        let Some(block) = render_contract(&ctx) else {
            // No workflow context — let the worker run unmodified.
            return HookResponse::empty();
        };

        let mut updated = tool_input.clone();
        updated.insert(
            "prompt".to_string(),
            Value::String(format!("{block}\n\n---\n\n{prompt}")),
        );

        HookResponse {
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: "allow".to_string(),
                permission_decision_reason: "Inject workflow I/O contract into spawn prompt"
                    .to_string(),
                updated_input: Value::Object(updated),
            }),
            ..Default::default()
        }
    }
}
