//! The workflow I/O contract block injected into spawn prompts.

use crate::workflow::context::WorkflowContext;

/// Heading that marks an already-injected contract block.
pub const CONTRACT_MARKER: &str = "## Workflow I/O Contract";

/// Render the contract block for a spawn prompt's extracted context.
///
/// Returns `None` unless the context carries both a task id and an output
/// slot — prompts without workflow context run unmodified.
pub fn render_contract(ctx: &WorkflowContext) -> Option<String> {
    let task_id = ctx.task_id.as_deref()?;
    let output_slot = ctx.output_slot.as_deref()?;

    let fetch_commands = if ctx.input_reports.is_empty() {
        "(none - skip this step)".to_string()
    } else {
        let lines: Vec<String> = ctx
            .input_reports
            .iter()
            .map(|report| format!("get-report.sh {task_id} {report}"))
            .collect();
        format!("```bash\n{}\n```", lines.join("\n"))
    };

    Some(format!(
        r#"{CONTRACT_MARKER}

You are part of a multi-agent workflow. TASK_ID: `{task_id}`

### Available Script

You have access to `get-report.sh` (via your Bash tool allowlist):
```
get-report.sh <taskId> <reportType>
```
Returns markdown content of a previous agent's report. If the report doesn't exist yet, it returns a "not available" message - skip and continue.

### Input: Fetch These Reports

{fetch_commands}

**Reports contain summaries from previous agents, NOT current file content.**
Always verify by reading actual files before making judgments.

### Output: `{output_slot}`

Your response is auto-captured as the workflow report. Required format:
1. Use `## Heading` sections for structure
2. End with `STATUS: PASSED` or `STATUS: FAILED`

Example:
```markdown
## Summary
[What you did]

## Findings
[Details]

STATUS: PASSED
```"#
    ))
}
