//! Filesystem-backed report store.
//!
//! Layout under the base directory:
//! - Reports: `<base>/<taskId>/reports/<slot>.md`
//! - Signals: `<base>/<taskId>/signals/<slot>.json`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::store::traits::{ReportStore, Signal};

/// Store rooted at a task-reports base directory.
pub struct FsReportStore {
    base: PathBuf,
}

impl FsReportStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn report_path(&self, task_id: &str, slot: &str) -> PathBuf {
        self.base.join(task_id).join("reports").join(format!("{slot}.md"))
    }

    fn signal_path(&self, task_id: &str, slot: &str) -> PathBuf {
        self.base.join(task_id).join("signals").join(format!("{slot}.json"))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).await.map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl ReportStore for FsReportStore {
    async fn save_report(
        &self,
        task_id: &str,
        slot: &str,
        markdown: &str,
    ) -> Result<(), StoreError> {
        self.write(&self.report_path(task_id, slot), markdown).await
    }

    async fn save_signal(
        &self,
        task_id: &str,
        slot: &str,
        signal: &Signal,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(signal).map_err(|source| StoreError::Encode {
            task_id: task_id.to_string(),
            slot: slot.to_string(),
            source,
        })?;
        self.write(&self.signal_path(task_id, slot), &json).await
    }

    async fn report_exists(&self, task_id: &str, slot: &str) -> bool {
        fs::try_exists(self.report_path(task_id, slot))
            .await
            .unwrap_or(false)
    }

    async fn signal_exists(&self, task_id: &str, slot: &str) -> bool {
        fs::try_exists(self.signal_path(task_id, slot))
            .await
            .unwrap_or(false)
    }
}
