use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use workflow_hooks::config::{HookConfig, resolve_reports_base};
use workflow_hooks::hooks::{CompletionHandler, HookEvent, HookResponse, PromptExtender};
use workflow_hooks::notify::{NotifyConfig, TelegramNotifier};
use workflow_hooks::store::FsReportStore;
use workflow_hooks::trace::LogTrace;
use workflow_hooks::transcript::Correlator;
use workflow_hooks::transcript::text::last_user_prompt;

/// Optional directory for hook log files; without it, logs go to stderr.
const LOG_DIR_ENV: &str = "WORKFLOW_HOOKS_LOG_DIR";

#[tokio::main]
async fn main() {
    // Stdout is the response channel, so logging must stay off it.
    let _guard = init_tracing();

    // The host must never see a crashed hook: any failure becomes an
    // error response and the process still exits 0.
    let response = run().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "hook failed");
        HookResponse::with_error(e.to_string())
    });
    let body = serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string());
    println!("{body}");
}

async fn run() -> anyhow::Result<HookResponse> {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "subagent-stop".to_string());

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read hook event from stdin")?;
    let event: HookEvent = serde_json::from_str(&raw).unwrap_or_default();

    let config = HookConfig::from_env();
    let response = match mode.as_str() {
        "subagent-stop" => {
            let store = Arc::new(FsReportStore::new(resolve_reports_base()));
            let correlator =
                Correlator::new(config.clone()).with_trace(Arc::new(LogTrace));
            CompletionHandler::new(config, store)
                .with_correlator(correlator)
                .handle(&event)
                .await
        }
        "extend-prompt" => PromptExtender::new(config).extend(&event),
        "notify" => {
            let kind = std::env::args().nth(2).unwrap_or_else(|| "Update".to_string());
            run_notify(&kind, &event).await;
            HookResponse::empty()
        }
        other => HookResponse::with_error(format!("unknown hook mode: {other}")),
    };
    Ok(response)
}

/// Send a chat notification for the event. Missing credentials mean skip;
/// transport failures are logged and swallowed.
async fn run_notify(kind: &str, event: &HookEvent) {
    let Some(notify_config) = NotifyConfig::from_env() else {
        tracing::debug!("notification credentials not set, skipping");
        return;
    };

    let project = event
        .cwd
        .as_deref()
        .and_then(|cwd| Path::new(cwd).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();

    let prompt = match &event.transcript_path {
        Some(path) => last_user_prompt(Path::new(path))
            .await
            .unwrap_or_else(|| "unknown".to_string()),
        None => "unknown".to_string(),
    };

    let notifier = TelegramNotifier::new(notify_config);
    if let Err(e) = notifier.notify(kind, &project, &prompt).await {
        tracing::warn!(error = %e, "failed to send notification");
    }
}

/// Initialize tracing: env-filtered, to a non-blocking file appender when
/// a log directory is configured, otherwise to stderr.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
        let appender = tracing_appender::rolling::daily(dir, "workflow-hooks.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        None
    }
}
