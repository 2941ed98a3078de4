//! Invocation correlation over the parent transcript log.
//!
//! Workers are spawned in batches and complete out of order. Keeping only
//! the last spawn seen misattributes every worker but the final one, so the
//! scan builds an explicit link from each spawn's correlation token to the
//! worker identifier echoed in its completion acknowledgement. The recency
//! fallback survives only for logs that never recorded the link.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::HookConfig;
use crate::trace::{NoopTrace, TraceEvent, TraceSink};
use crate::transcript::record::{ContentItem, TranscriptEntry, result_text};
use crate::workflow::context::extract_context;

/// The invocation that spawned a worker, recovered from the parent log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationRecord {
    /// Per-action correlation token from the log.
    pub correlation_id: String,
    /// Declared worker kind (namespaced family name).
    pub declared_role: String,
    /// Full text given to the worker at spawn time.
    pub input_text: String,
}

impl InvocationRecord {
    /// An empty role means "no match" to callers.
    pub fn is_empty(&self) -> bool {
        self.declared_role.is_empty() && self.input_text.is_empty()
    }
}

/// What to do when no completion link matches the queried identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Return the most recently scanned indexed invocation. Best-effort:
    /// assumes a single in-flight batch, so nested spawning can misattribute.
    #[default]
    MostRecentSpawn,
    /// Return the empty record instead of guessing.
    Disabled,
}

/// One completion acknowledgement, in scan order.
struct CompletionLink {
    token: String,
    payload: String,
}

/// Indexes built by a single pass over the parent log.
#[derive(Default)]
struct LogIndex {
    invocations: HashMap<String, InvocationRecord>,
    completions: Vec<CompletionLink>,
    /// Token of the most recently indexed invocation, for the fallback.
    last_spawn: Option<String>,
}

/// Resolves a completed worker's identifier to the invocation that spawned it.
pub struct Correlator {
    config: HookConfig,
    fallback: FallbackStrategy,
    trace: Arc<dyn TraceSink>,
}

impl Correlator {
    pub fn new(config: HookConfig) -> Self {
        Self {
            config,
            fallback: FallbackStrategy::default(),
            trace: Arc::new(NoopTrace),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = trace;
        self
    }

    /// Resolve `result_id` against the parent log at `parent_log`.
    ///
    /// Never fails: a missing or unreadable log, or no match, yields the
    /// empty record.
    pub async fn resolve(&self, parent_log: &Path, result_id: &str) -> InvocationRecord {
        match tokio::fs::read_to_string(parent_log).await {
            Ok(log_text) => self.resolve_in(&log_text, result_id),
            Err(_) => {
                self.trace.record(TraceEvent::NoMatch {
                    result_id: result_id.to_string(),
                });
                InvocationRecord::default()
            }
        }
    }

    /// Pure form of [`resolve`](Self::resolve) over already-read log text.
    pub fn resolve_in(&self, log_text: &str, result_id: &str) -> InvocationRecord {
        let index = self.scan(log_text);

        // First occurrence wins: an identifier maps to at most one token.
        if !result_id.is_empty() {
            if let Some(link) = index
                .completions
                .iter()
                .find(|link| link.payload.contains(result_id))
            {
                if let Some(invocation) = index.invocations.get(&link.token) {
                    self.trace.record(TraceEvent::LinkMatched {
                        token: link.token.clone(),
                        result_id: result_id.to_string(),
                    });
                    return invocation.clone();
                }
                self.trace.record(TraceEvent::LinkUnindexed {
                    token: link.token.clone(),
                    result_id: result_id.to_string(),
                });
            }
        }

        if self.fallback == FallbackStrategy::MostRecentSpawn {
            if let Some(token) = &index.last_spawn {
                if let Some(invocation) = index.invocations.get(token) {
                    self.trace.record(TraceEvent::FallbackUsed {
                        token: token.clone(),
                    });
                    return invocation.clone();
                }
            }
        }

        self.trace.record(TraceEvent::NoMatch {
            result_id: result_id.to_string(),
        });
        InvocationRecord::default()
    }

    /// One lenient pass over the log, building both indexes.
    fn scan(&self, log_text: &str) -> LogIndex {
        let mut index = LogIndex::default();

        for (line_number, line) in log_text.lines().enumerate() {
            let Some(entry) = TranscriptEntry::parse_line(line) else {
                if !line.trim().is_empty() {
                    self.trace.record(TraceEvent::MalformedLine {
                        line_number: line_number + 1,
                    });
                }
                continue;
            };

            for item in entry.content_items() {
                match item {
                    ContentItem::ToolUse { id, name, input } => {
                        self.index_spawn(&mut index, id, name, input);
                    }
                    ContentItem::ToolResult {
                        tool_use_id,
                        content,
                    } => {
                        self.index_completion(
                            &mut index,
                            tool_use_id,
                            content,
                            entry.tool_use_result.as_ref(),
                        );
                    }
                    _ => {}
                }
            }
        }

        index
    }

    fn index_spawn(
        &self,
        index: &mut LogIndex,
        id: Option<String>,
        name: Option<String>,
        input: Option<Value>,
    ) {
        let Some(token) = id else { return };
        if name.as_deref() != Some(self.config.spawn_tool.as_str()) {
            return;
        }

        let input = input.unwrap_or(Value::Null);
        let role = input
            .get("subagent_type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let prompt = input
            .get("prompt")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if !self.config.role_matches(role) {
            self.trace.record(TraceEvent::SpawnSkipped {
                token,
                reason: "role outside expected family".into(),
            });
            return;
        }

        // Invocations without both markers can never be attributed to a
        // workflow slot, so they are not indexed.
        if !extract_context(prompt).is_complete() {
            self.trace.record(TraceEvent::SpawnSkipped {
                token,
                reason: "workflow context missing".into(),
            });
            return;
        }

        self.trace.record(TraceEvent::SpawnIndexed {
            token: token.clone(),
            role: role.to_string(),
        });
        index.invocations.insert(
            token.clone(),
            InvocationRecord {
                correlation_id: token.clone(),
                declared_role: role.to_string(),
                input_text: prompt.to_string(),
            },
        );
        index.last_spawn = Some(token);
    }

    fn index_completion(
        &self,
        index: &mut LogIndex,
        tool_use_id: Option<String>,
        content: Option<Value>,
        entry_result: Option<&Value>,
    ) {
        let Some(token) = tool_use_id else { return };

        // The worker identifier may sit in the item's text content or in
        // the entry-level result payload; either occurrence suffices.
        let mut payload = content.as_ref().map(result_text).unwrap_or_default();
        if let Some(result) = entry_result {
            payload.push('\n');
            payload.push_str(&result.to_string());
        }

        self.trace.record(TraceEvent::CompletionSeen {
            token: token.clone(),
        });
        index.completions.push(CompletionLink { token, payload });
    }
}
