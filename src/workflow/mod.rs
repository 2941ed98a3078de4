//! Workflow conventions embedded in spawn prompts: context markers in,
//! I/O contract block out.

pub mod context;
pub mod contract;

pub use context::{WorkflowContext, extract_context};
pub use contract::{CONTRACT_MARKER, render_contract};
