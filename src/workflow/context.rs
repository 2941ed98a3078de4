//! Workflow context markers embedded in spawn prompts.
//!
//! The markers are a plain-text convention: `TASK_ID: <token>` anywhere,
//! `reportType: <token>` either scoped under a `## Output` heading or
//! inline, and an optional `## Input Reports` list. Each marker is
//! independently optional; extraction never fails.

use std::sync::LazyLock;

use regex::Regex;

/// Conventional report slots used by the workflow roles.
pub const KNOWN_SLOTS: &[&str] = &[
    "plan",
    "implementation",
    "code-review",
    "performance",
    "security",
];

/// Context parsed out of one invocation's input text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowContext {
    pub task_id: Option<String>,
    pub output_slot: Option<String>,
    /// Report slots the invocation declares it wants to read.
    pub input_reports: Vec<String>,
}

impl WorkflowContext {
    /// Both markers present — the invocation participates in the workflow.
    pub fn is_complete(&self) -> bool {
        self.task_id.is_some() && self.output_slot.is_some()
    }

    /// Whether the extracted slot is one of the conventional names.
    pub fn slot_is_known(&self) -> bool {
        self.output_slot
            .as_deref()
            .is_some_and(|slot| KNOWN_SLOTS.contains(&slot))
    }
}

/// One shape of the `reportType:` marker. Rules are tried in declaration
/// order and the first capture wins, so the heading-scoped shape cannot be
/// overridden by an unrelated inline mention.
struct SlotRule {
    name: &'static str,
    regex: Regex,
}

/// Compiled marker patterns.
pub struct ContextRules {
    task_id: Regex,
    slot_rules: Vec<SlotRule>,
}

static DEFAULT_RULES: LazyLock<ContextRules> = LazyLock::new(ContextRules::new);

impl ContextRules {
    pub fn new() -> Self {
        Self {
            task_id: Regex::new(r"TASK_ID:\s*(\S+)").unwrap(),
            slot_rules: vec![
                SlotRule {
                    name: "output-heading",
                    regex: Regex::new(r"##\s*Output\s*\n\s*reportType:\s*(\S+)").unwrap(),
                },
                SlotRule {
                    name: "inline",
                    regex: Regex::new(r"reportType:\s*(\S+)").unwrap(),
                },
            ],
        }
    }

    /// Extract whatever markers are present in `input_text`.
    pub fn extract(&self, input_text: &str) -> WorkflowContext {
        let task_id = self
            .task_id
            .captures(input_text)
            .and_then(|c| c.get(1))
            .map(|m| strip_quotes(m.as_str()));

        let mut output_slot = None;
        for rule in &self.slot_rules {
            if let Some(captures) = rule.regex.captures(input_text) {
                if let Some(slot) = captures.get(1) {
                    tracing::trace!(rule = rule.name, slot = slot.as_str(), "slot rule matched");
                    output_slot = Some(slot.as_str().to_string());
                    break;
                }
            }
        }

        WorkflowContext {
            task_id,
            output_slot,
            input_reports: extract_input_reports(input_text),
        }
    }
}

impl Default for ContextRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract with the default rule set.
pub fn extract_context(input_text: &str) -> WorkflowContext {
    DEFAULT_RULES.extract(input_text)
}

/// Strip one layer of surrounding quote characters from a token.
fn strip_quotes(token: &str) -> String {
    token
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .to_string()
}

/// List items under a `## Input Reports` heading, up to the next heading.
/// `Required:` / `Optional:` labels are structure, not slots.
fn extract_input_reports(input_text: &str) -> Vec<String> {
    let mut reports = Vec::new();
    let mut in_section = false;

    for line in input_text.lines() {
        let trimmed = line.trim();
        if in_section {
            if trimmed.starts_with('#') {
                break;
            }
            if let Some(item) = trimmed.strip_prefix('-') {
                if let Some(token) = item.split_whitespace().next() {
                    if !token.eq_ignore_ascii_case("required:")
                        && !token.to_ascii_lowercase().starts_with("optional")
                    {
                        reports.push(token.to_string());
                    }
                }
            }
        } else if trimmed
            .strip_prefix("##")
            .map(str::trim)
            .is_some_and(|rest| rest.eq_ignore_ascii_case("Input Reports"))
        {
            in_section = true;
        }
    }

    reports
}
