//! Markdown report-body synthesis from raw worker output.
//!
//! Workers structure their reports as `##` sections. Everything outside
//! those sections (tool chatter, status lines, preamble) is dropped; when
//! no section exists at all the full text is wrapped instead, so the
//! stored report is empty only when the input is empty.

const FALLBACK_HEADING: &str = "## Agent Output";
const FALLBACK_NOTE: &str =
    "_No structured sections were found in the agent output; full text follows._";

/// Extract the report body from raw worker output.
pub fn extract_report_body(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut runs: Vec<Vec<&str>> = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in raw.lines() {
        if is_second_level_heading(line) {
            if let Some(run) = current.take() {
                runs.push(run);
            }
            current = Some(vec![line]);
        } else if is_top_level_heading(line) {
            if let Some(run) = current.take() {
                runs.push(run);
            }
        } else if let Some(run) = current.as_mut() {
            run.push(line);
        }
    }
    if let Some(run) = current.take() {
        runs.push(run);
    }

    if runs.is_empty() {
        return format!("{FALLBACK_HEADING}\n\n{FALLBACK_NOTE}\n\n{raw}");
    }

    let joined: Vec<&str> = runs.into_iter().flatten().collect();
    trim_blank_edges(&joined).join("\n")
}

/// Exactly two heading markers followed by non-heading content.
fn is_second_level_heading(line: &str) -> bool {
    line.strip_prefix("##")
        .is_some_and(|rest| !rest.starts_with('#') && !rest.trim().is_empty())
}

/// Exactly one heading marker; ends a section run without starting one.
fn is_top_level_heading(line: &str) -> bool {
    line.strip_prefix('#')
        .is_some_and(|rest| !rest.starts_with('#'))
}

fn trim_blank_edges<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(start);
    &lines[start..end]
}
