//! Outcome extraction from worker output text.
//!
//! Pure text classification: a status/summary pair from an ordered rule
//! chain, and a markdown report body from `##` section runs. Total and
//! deterministic — any input, including the empty string, yields a value.

pub mod classifier;
pub mod report;

pub use classifier::{OutcomeClassifier, Status, StatusSummary, extract_status};
pub use report::extract_report_body;

/// A classified outcome: status, bounded summary, and report body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub summary: String,
    pub report_body: String,
}

/// Classify raw worker output into a full outcome.
pub fn extract_outcome(raw: &str) -> Outcome {
    let StatusSummary { status, summary } = classifier::extract_status(raw);
    Outcome {
        status,
        summary,
        report_body: report::extract_report_body(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_combines_status_and_report() {
        let raw = "## Summary\nfoo\n\n## Analysis\nbar\n\nSTATUS: PASSED";
        let outcome = extract_outcome(raw);
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.report_body.contains("## Summary"));
        assert!(outcome.report_body.contains("bar"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let raw = "Error: broke\n\n## Details\nstack";
        let first = extract_outcome(raw);
        let second = extract_outcome(raw);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_empty_report_and_default_pass() {
        let outcome = extract_outcome("");
        assert_eq!(outcome.status, Status::Passed);
        assert!(outcome.report_body.is_empty());
        assert!(!outcome.summary.is_empty());
    }
}
