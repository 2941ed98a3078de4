//! Completion handler — attributes a finished worker and persists its outcome.
//!
//! Runs when a worker completes. Recovers the invocation that spawned it
//! (correlating over the parent log), extracts the workflow context from
//! the invocation's input text, classifies the worker's output, and files
//! the report and signal under the recovered (task, slot) pair.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::HookConfig;
use crate::hooks::event::{HookEvent, HookResponse};
use crate::outcome::extract_outcome;
use crate::store::{ReportStore, Signal};
use crate::transcript::correlator::{Correlator, InvocationRecord};
use crate::transcript::text::last_assistant_text;
use crate::workflow::context::extract_context;

/// Completion handler with its persistence and correlation dependencies.
pub struct CompletionHandler {
    config: HookConfig,
    store: Arc<dyn ReportStore>,
    correlator: Correlator,
}

impl CompletionHandler {
    pub fn new(config: HookConfig, store: Arc<dyn ReportStore>) -> Self {
        let correlator = Correlator::new(config.clone());
        Self {
            config,
            store,
            correlator,
        }
    }

    /// Replace the default correlator (custom fallback or trace sink).
    pub fn with_correlator(mut self, correlator: Correlator) -> Self {
        self.correlator = correlator;
        self
    }

    /// Handle one completion event. Always returns a response; events this
    /// handler does not apply to get the empty response.
    pub async fn handle(&self, event: &HookEvent) -> HookResponse {
        let invocation = self.recover_invocation(event).await;

        if !self.config.role_matches(&invocation.declared_role) {
            debug!(
                role = %invocation.declared_role,
                "worker outside expected role family, skipping"
            );
            return HookResponse::empty();
        }

        let ctx = extract_context(&invocation.input_text);
        let (Some(task_id), Some(slot)) = (ctx.task_id.clone(), ctx.output_slot.clone()) else {
            debug!("invocation carries no workflow context, skipping");
            return HookResponse::empty();
        };
        if !ctx.slot_is_known() {
            warn!(slot = %slot, "output slot outside the conventional set");
        }

        let output = self.worker_output(event).await.unwrap_or_default();
        let outcome = extract_outcome(&output);

        // Existence is consulted for wording only; the save always happens.
        let signal_existed = self.store.signal_exists(&task_id, &slot).await;

        if let Err(e) = self.store.save_report(&task_id, &slot, &outcome.report_body).await {
            warn!(error = %e, task_id = %task_id, slot = %slot, "report save failed");
            return HookResponse::with_error(format!("Failed to save report for {slot}: {e}"));
        }

        let signal = Signal::new(
            &task_id,
            &slot,
            outcome.status,
            &outcome.summary,
            &self.config.saved_by,
        );
        if let Err(e) = self.store.save_signal(&task_id, &slot, &signal).await {
            warn!(error = %e, task_id = %task_id, slot = %slot, "signal save failed");
            return HookResponse::with_error(format!("Failed to save signal for {slot}: {e}"));
        }

        let verb = if signal_existed { "Updated" } else { "Created" };
        info!(
            task_id = %task_id,
            slot = %slot,
            status = %outcome.status,
            verb,
            "saved worker outcome"
        );
        HookResponse::with_message(format!(
            "{verb} {slot} signal (status={})",
            outcome.status
        ))
    }

    /// Recover the spawning invocation: correlate over the parent log when
    /// the event names one, else fall back to fields carried on the event.
    async fn recover_invocation(&self, event: &HookEvent) -> InvocationRecord {
        if let (Some(path), Some(agent_id)) = (&event.transcript_path, &event.agent_id) {
            let record = self.correlator.resolve(Path::new(path), agent_id).await;
            if !record.is_empty() {
                return record;
            }
        }
        InvocationRecord {
            correlation_id: String::new(),
            declared_role: event.subagent_type.clone().unwrap_or_default(),
            input_text: event.prompt.clone().unwrap_or_default(),
        }
    }

    /// The worker's raw output: inline fields first, then its own transcript.
    async fn worker_output(&self, event: &HookEvent) -> Option<String> {
        if let Some(transcript) = event.transcript.as_ref().filter(|t| !t.is_empty()) {
            return Some(transcript.clone());
        }
        if let Some(response) = event.response.as_ref().filter(|r| !r.is_empty()) {
            return Some(response.clone());
        }
        let path = event.agent_transcript_path.as_ref()?;
        last_assistant_text(Path::new(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::outcome::Status;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store double.
    #[derive(Default)]
    struct MemoryStore {
        reports: Mutex<HashMap<(String, String), String>>,
        signals: Mutex<HashMap<(String, String), Signal>>,
    }

    impl MemoryStore {
        fn report(&self, task: &str, slot: &str) -> Option<String> {
            self.reports
                .lock()
                .unwrap()
                .get(&(task.to_string(), slot.to_string()))
                .cloned()
        }

        fn signal(&self, task: &str, slot: &str) -> Option<Signal> {
            self.signals
                .lock()
                .unwrap()
                .get(&(task.to_string(), slot.to_string()))
                .cloned()
        }
    }

    #[async_trait]
    impl ReportStore for MemoryStore {
        async fn save_report(
            &self,
            task_id: &str,
            slot: &str,
            markdown: &str,
        ) -> Result<(), StoreError> {
            self.reports
                .lock()
                .unwrap()
                .insert((task_id.to_string(), slot.to_string()), markdown.to_string());
            Ok(())
        }

        async fn save_signal(
            &self,
            task_id: &str,
            slot: &str,
            signal: &Signal,
        ) -> Result<(), StoreError> {
            self.signals
                .lock()
                .unwrap()
                .insert((task_id.to_string(), slot.to_string()), signal.clone());
            Ok(())
        }

        async fn report_exists(&self, task_id: &str, slot: &str) -> bool {
            self.report(task_id, slot).is_some()
        }

        async fn signal_exists(&self, task_id: &str, slot: &str) -> bool {
            self.signal(task_id, slot).is_some()
        }
    }

    fn handler() -> (CompletionHandler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let handler = CompletionHandler::new(HookConfig::default(), store.clone());
        (handler, store)
    }

    fn workflow_event(prompt: &str, output: &str) -> HookEvent {
        HookEvent {
            subagent_type: Some("backend-toolbox:performance-specialist".into()),
            prompt: Some(prompt.into()),
            transcript: Some(output.into()),
            ..Default::default()
        }
    }

    const PROMPT: &str = "TASK_ID: task-1\n\n## Output\nreportType: performance";

    #[tokio::test]
    async fn saves_report_and_signal_for_workflow_worker() {
        let (handler, store) = handler();
        let event = workflow_event(PROMPT, "## Summary\nlatency is fine\n\nSTATUS: PASSED");

        let response = handler.handle(&event).await;
        assert_eq!(
            response.message.as_deref(),
            Some("Created performance signal (status=passed)")
        );

        let report = store.report("task-1", "performance").unwrap();
        assert!(report.contains("latency is fine"));

        let signal = store.signal("task-1", "performance").unwrap();
        assert_eq!(signal.status, Status::Passed);
        assert!(signal.auto_saved);
        assert_eq!(signal.task_id, "task-1");
        assert_eq!(signal.signal_type, "performance");
    }

    #[tokio::test]
    async fn skips_workers_outside_role_family() {
        let (handler, store) = handler();
        let event = HookEvent {
            subagent_type: Some("Explore".into()),
            prompt: Some(PROMPT.into()),
            transcript: Some("output".into()),
            ..Default::default()
        };

        let response = handler.handle(&event).await;
        assert!(response.is_empty());
        assert!(store.signal("task-1", "performance").is_none());
    }

    #[tokio::test]
    async fn skips_invocations_without_workflow_context() {
        let (handler, store) = handler();
        let event = workflow_event("Just do the thing", "output");

        let response = handler.handle(&event).await;
        assert!(response.is_empty());
        assert!(store.signals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_signal_is_overwritten_and_worded_as_update() {
        let (handler, store) = handler();
        let first = workflow_event(PROMPT, "STATUS: FAILED");
        handler.handle(&first).await;
        assert_eq!(
            store.signal("task-1", "performance").unwrap().status,
            Status::Failed
        );

        let second = workflow_event(PROMPT, "Retried and recovered.\n\nSTATUS: PASSED");
        let response = handler.handle(&second).await;
        assert_eq!(
            response.message.as_deref(),
            Some("Updated performance signal (status=passed)")
        );
        assert_eq!(
            store.signal("task-1", "performance").unwrap().status,
            Status::Passed
        );
    }

    #[tokio::test]
    async fn failure_output_saves_failed_signal() {
        let (handler, store) = handler();
        let event = workflow_event(PROMPT, "Error: Module not found\nCould not complete task");

        handler.handle(&event).await;
        let signal = store.signal("task-1", "performance").unwrap();
        assert_eq!(signal.status, Status::Failed);
        assert!(signal.summary.starts_with("ERROR:"));
    }

    #[tokio::test]
    async fn missing_output_still_files_a_signal() {
        let (handler, store) = handler();
        let event = HookEvent {
            subagent_type: Some("backend-toolbox:performance-specialist".into()),
            prompt: Some(PROMPT.into()),
            ..Default::default()
        };

        let response = handler.handle(&event).await;
        assert!(response.message.is_some());
        let signal = store.signal("task-1", "performance").unwrap();
        assert_eq!(signal.status, Status::Passed);
        assert_eq!(store.report("task-1", "performance").unwrap(), "");
    }

    #[tokio::test]
    async fn correlates_through_parent_transcript() {
        use serde_json::json;
        use std::io::Write;

        let mut parent = tempfile::NamedTempFile::new().unwrap();
        let spawn = json!({
            "type": "assistant",
            "message": {"content": [{
                "type": "tool_use",
                "id": "toolu_01",
                "name": "Task",
                "input": {
                    "subagent_type": "backend-toolbox:application-security-specialist",
                    "prompt": "TASK_ID: task-9\n\n## Output\nreportType: security"
                }
            }]}
        });
        let ack = json!({
            "type": "user",
            "message": {"content": [{
                "type": "tool_result",
                "tool_use_id": "toolu_01",
                "content": [{"type": "text", "text": "Launched agentId: sec-agent"}]
            }]},
            "toolUseResult": {"agentId": "sec-agent"}
        });
        writeln!(parent, "{spawn}").unwrap();
        writeln!(parent, "{ack}").unwrap();

        let (handler, store) = handler();
        let event = HookEvent {
            agent_id: Some("sec-agent".into()),
            transcript_path: Some(parent.path().to_string_lossy().into_owned()),
            transcript: Some("## Audit\nno findings\n\nSTATUS: PASSED".into()),
            ..Default::default()
        };

        let response = handler.handle(&event).await;
        assert_eq!(
            response.message.as_deref(),
            Some("Created security signal (status=passed)")
        );
        assert!(store.report("task-9", "security").unwrap().contains("no findings"));
    }
}
