//! Pass/fail classification of worker output.
//!
//! An ordered chain of (predicate, extractor) rules, first match wins:
//! explicit `STATUS:` marker, then heuristic failure phrases, then an
//! optimistic default — a worker that produced output but forgot to
//! declare status is assumed to have succeeded rather than blocking the
//! workflow.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on summary length.
pub const SUMMARY_MAX_LEN: usize = 200;

/// Upper bound on the quoted line inside a heuristic failure summary.
const ERROR_LINE_MAX_LEN: usize = 100;

const DEFAULT_PASS_SUMMARY: &str = "Agent completed successfully";
const DEFAULT_FAIL_SUMMARY: &str = "Agent reported failure";
const GENERIC_FAILURE_SUMMARY: &str = "ERROR: Agent encountered issues (auto-detected)";

/// Same-line text after the marker must beat this length to be a summary.
const SAME_LINE_MIN_LEN: usize = 10;

/// Failure phrases checked when no explicit status marker is present.
const FAILURE_INDICATORS: &[&str] = &[
    "error:",
    "failed:",
    "exception:",
    "traceback:",
    "could not",
    "unable to",
    "cannot find",
    "not found",
    "assertion error",
    "test failed",
    "tests failed",
];

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)STATUS:\s*(PASSED|FAILED)").unwrap());

/// Normalized worker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A classified status with its human-readable summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub status: Status,
    pub summary: String,
}

/// One classification rule: a name for tracing and an extractor that
/// returns `Some` when the rule decides the outcome.
struct ClassifyRule {
    name: &'static str,
    apply: fn(&str) -> Option<StatusSummary>,
}

/// Ordered rule chain over worker output text.
pub struct OutcomeClassifier {
    rules: Vec<ClassifyRule>,
}

impl Default for OutcomeClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassifyRule {
                    name: "explicit-marker",
                    apply: explicit_marker,
                },
                ClassifyRule {
                    name: "failure-indicators",
                    apply: failure_indicators,
                },
                ClassifyRule {
                    name: "optimistic-default",
                    apply: optimistic_default,
                },
            ],
        }
    }
}

impl OutcomeClassifier {
    /// Classify `text`; the default chain always produces a value.
    pub fn classify(&self, text: &str) -> StatusSummary {
        for rule in &self.rules {
            if let Some(result) = (rule.apply)(text) {
                tracing::trace!(rule = rule.name, status = %result.status, "status rule matched");
                return result;
            }
        }
        // Reached only with a custom chain that has no terminal rule.
        StatusSummary {
            status: Status::Passed,
            summary: DEFAULT_PASS_SUMMARY.to_string(),
        }
    }
}

/// Classify with the default rule chain.
pub fn extract_status(text: &str) -> StatusSummary {
    static DEFAULT: LazyLock<OutcomeClassifier> = LazyLock::new(OutcomeClassifier::default);
    DEFAULT.classify(text)
}

/// Rule 1: a case-insensitive `STATUS: PASSED` / `STATUS: FAILED` marker.
///
/// Summary preference: same-line text after the marker when long enough,
/// else the nearest preceding non-blank line, else a fixed default.
fn explicit_marker(text: &str) -> Option<StatusSummary> {
    let captures = STATUS_RE.captures(text)?;
    let whole = captures.get(0)?;
    let status = if captures.get(1)?.as_str().eq_ignore_ascii_case("PASSED") {
        Status::Passed
    } else {
        Status::Failed
    };

    let line_end = text[whole.end()..]
        .find('\n')
        .map(|offset| whole.end() + offset)
        .unwrap_or(text.len());
    let same_line = text[whole.end()..line_end].trim();

    let summary = if same_line.chars().count() > SAME_LINE_MIN_LEN {
        same_line.to_string()
    } else if let Some(previous) = preceding_non_blank_line(text, whole.start()) {
        previous
    } else {
        match status {
            Status::Passed => DEFAULT_PASS_SUMMARY.to_string(),
            Status::Failed => DEFAULT_FAIL_SUMMARY.to_string(),
        }
    };

    Some(StatusSummary {
        status,
        summary: truncate(&summary, SUMMARY_MAX_LEN),
    })
}

/// Rule 2: heuristic failure phrases, first phrase found wins.
fn failure_indicators(text: &str) -> Option<StatusSummary> {
    let lower = text.to_lowercase();
    let indicator = FAILURE_INDICATORS
        .iter()
        .find(|phrase| lower.contains(*phrase))?;

    // The colon is dropped so "Error loading module" still isolates the
    // line for an "error:" hit elsewhere in the text.
    let needle = indicator.replace(':', "");
    let summary = text
        .lines()
        .find(|line| line.to_lowercase().contains(&needle))
        .map(|line| format!("ERROR: {}", truncate(line.trim(), ERROR_LINE_MAX_LEN)))
        .unwrap_or_else(|| GENERIC_FAILURE_SUMMARY.to_string());

    Some(StatusSummary {
        status: Status::Failed,
        summary: truncate(&summary, SUMMARY_MAX_LEN),
    })
}

/// Rule 3: absence of failure evidence is treated as success.
fn optimistic_default(_text: &str) -> Option<StatusSummary> {
    Some(StatusSummary {
        status: Status::Passed,
        summary: DEFAULT_PASS_SUMMARY.to_string(),
    })
}

/// Nearest non-blank line strictly before byte offset `before`.
fn preceding_non_blank_line(text: &str, before: usize) -> Option<String> {
    let line_start = text[..before].rfind('\n')?;
    text[..line_start]
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
}

/// Character-bounded truncation.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_explicit_passed_status() {
        let result = extract_status("Analysis complete.\n\nSTATUS: PASSED");
        assert_eq!(result.status, Status::Passed);
        // Marker line has no trailing text; the preceding line is the summary.
        assert_eq!(result.summary, "Analysis complete.");
    }

    #[test]
    fn detects_explicit_failed_status() {
        let result = extract_status("Found issues.\n\nSTATUS: FAILED");
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.summary, "Found issues.");
    }

    #[test]
    fn marker_is_case_insensitive() {
        assert_eq!(extract_status("status: passed").status, Status::Passed);
        assert_eq!(extract_status("Status: Failed").status, Status::Failed);
    }

    #[test]
    fn same_line_text_preferred_when_long_enough() {
        let result = extract_status("STATUS: PASSED all twelve checks verified");
        assert_eq!(result.summary, "all twelve checks verified");
    }

    #[test]
    fn short_same_line_text_falls_back_to_preceding_line() {
        let result = extract_status("Ran the full suite.\nSTATUS: PASSED ok");
        assert_eq!(result.summary, "Ran the full suite.");
    }

    #[test]
    fn marker_on_first_line_uses_fixed_default() {
        let result = extract_status("STATUS: FAILED");
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.summary, "Agent reported failure");
    }

    #[test]
    fn explicit_marker_outranks_failure_phrases() {
        let result = extract_status("The error: handler now retries.\n\nSTATUS: PASSED");
        assert_eq!(result.status, Status::Passed);
    }

    #[test]
    fn detects_failure_from_error_indicator() {
        let result = extract_status("Error: Module not found\nCould not complete task");
        assert_eq!(result.status, Status::Failed);
        assert!(result.summary.starts_with("ERROR:"));
        assert!(result.summary.contains("Module not found"));
    }

    #[test]
    fn failure_line_is_bounded() {
        let long_line = format!("error: {}", "x".repeat(300));
        let result = extract_status(&long_line);
        assert_eq!(result.status, Status::Failed);
        assert!(result.summary.chars().count() <= ERROR_LINE_MAX_LEN + "ERROR: ".len());
    }

    #[test]
    fn defaults_to_passed_when_no_indicators() {
        let result = extract_status("Everything completed successfully");
        assert_eq!(result.status, Status::Passed);
        assert_eq!(result.summary, DEFAULT_PASS_SUMMARY);
    }

    #[test]
    fn empty_input_is_total() {
        let result = extract_status("");
        assert_eq!(result.status, Status::Passed);
    }

    #[test]
    fn summary_never_exceeds_bound() {
        let text = format!("{}\nSTATUS: PASSED", "long prefix ".repeat(50));
        let result = extract_status(&text);
        assert!(result.summary.chars().count() <= SUMMARY_MAX_LEN);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Status::Passed).unwrap(), "passed");
        assert_eq!(serde_json::to_value(Status::Failed).unwrap(), "failed");
        assert_eq!(Status::Failed.to_string(), "failed");
    }
}
