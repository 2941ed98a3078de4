//! Error types for workflow-hooks.
//!
//! The core (correlation, context extraction, outcome classification) is
//! total and never surfaces errors — failures there degrade to empty or
//! default values. Only the ambient I/O layers (store, notifier) carry
//! real error types.

use std::path::PathBuf;

/// Top-level error type for the hooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Report/signal persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode signal for {task_id}/{slot}: {source}")]
    Encode {
        task_id: String,
        slot: String,
        source: serde_json::Error,
    },
}

/// Outbound notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to send via {endpoint}: {reason}")]
    Send { endpoint: String, reason: String },

    #[error("Notification API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Result type alias for the hooks.
pub type Result<T> = std::result::Result<T, Error>;
