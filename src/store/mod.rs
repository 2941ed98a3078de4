//! Persistence layer — per-task report and signal files.

pub mod fs;
pub mod traits;

pub use fs::FsReportStore;
pub use traits::{ReportStore, Signal};
