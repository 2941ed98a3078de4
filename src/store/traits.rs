//! `ReportStore` trait — single async interface for report/signal persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::outcome::Status;

/// Persisted pass/fail record for one (task, slot) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub task_id: String,
    /// The output slot this signal is filed under.
    pub signal_type: String,
    pub status: Status,
    pub summary: String,
    /// True when the hook synthesized this signal from worker output.
    pub auto_saved: bool,
    /// Producer tag (which hook wrote this).
    pub saved_by: String,
    pub saved_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        task_id: impl Into<String>,
        signal_type: impl Into<String>,
        status: Status,
        summary: impl Into<String>,
        saved_by: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            signal_type: signal_type.into(),
            status,
            summary: summary.into(),
            auto_saved: true,
            saved_by: saved_by.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Backend-agnostic store for workflow reports and signals.
///
/// Concurrent events may write different (task, slot) pairs in parallel;
/// at-most-one writer per pair is the caller's responsibility.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Write (overwrite) the markdown report for a (task, slot) pair.
    async fn save_report(
        &self,
        task_id: &str,
        slot: &str,
        markdown: &str,
    ) -> Result<(), StoreError>;

    /// Write (overwrite) the signal for a (task, slot) pair.
    async fn save_signal(&self, task_id: &str, slot: &str, signal: &Signal)
    -> Result<(), StoreError>;

    /// Whether a report already exists. Informational only — callers use
    /// this to word their result, never to skip a save.
    async fn report_exists(&self, task_id: &str, slot: &str) -> bool;

    /// Whether a signal already exists. Informational only.
    async fn signal_exists(&self, task_id: &str, slot: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_serializes_camel_case() {
        let signal = Signal::new("test-task", "security", Status::Passed, "All good", "hook");
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["taskId"], "test-task");
        assert_eq!(json["signalType"], "security");
        assert_eq!(json["status"], "passed");
        assert_eq!(json["summary"], "All good");
        assert_eq!(json["autoSaved"], true);
        assert_eq!(json["savedBy"], "hook");
        assert!(json["savedAt"].is_string());
    }
}
