//! workflow-hooks — worker attribution and outcome capture.
//!
//! A supervising process spawns worker agents in batches under a shared
//! identity namespace. These hooks connect each completed worker back to
//! the invocation that spawned it, classify the worker's free-form output
//! into a pass/fail signal and a markdown report, and file both under the
//! workflow slot the invocation declared.

pub mod config;
pub mod error;
pub mod hooks;
pub mod notify;
pub mod outcome;
pub mod store;
pub mod trace;
pub mod transcript;
pub mod workflow;
