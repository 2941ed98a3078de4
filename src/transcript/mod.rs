//! Append-only transcript logs: lenient record model, text recovery, and
//! invocation correlation.
//!
//! Transcripts are newline-delimited JSON. Nothing in this module assumes
//! a well-formed log — unparsable lines are skipped, missing files resolve
//! to empty results, and no path through the scan can fail the caller.

pub mod correlator;
pub mod record;
pub mod text;

pub use correlator::{Correlator, FallbackStrategy, InvocationRecord};
pub use record::{ContentItem, TranscriptEntry};
