//! Correlation trace sink.
//!
//! The correlator reports its match/no-match decisions as structured events
//! through an injected sink instead of writing to a fixed log path. The
//! default sink drops everything; `LogTrace` forwards to `tracing`, and
//! `RecordingTrace` captures events for test assertions.

use std::sync::Mutex;

use serde::Serialize;

/// A single correlation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A spawn entry was indexed under its correlation token.
    SpawnIndexed { token: String, role: String },
    /// A spawn entry was seen but not indexed.
    SpawnSkipped { token: String, reason: String },
    /// A completion acknowledgement was recorded for a token.
    CompletionSeen { token: String },
    /// The queried identifier matched a completion link.
    LinkMatched { token: String, result_id: String },
    /// A link matched but no invocation was indexed under its token.
    LinkUnindexed { token: String, result_id: String },
    /// No link matched; the fallback strategy supplied an invocation.
    FallbackUsed { token: String },
    /// Nothing matched and the fallback produced nothing.
    NoMatch { result_id: String },
    /// A non-empty log line failed to parse and was skipped.
    MalformedLine { line_number: usize },
}

/// Sink for correlation trace events.
///
/// Implementations must not influence the correlation result.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// Sink that drops all events.
#[derive(Debug, Default)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn record(&self, _event: TraceEvent) {}
}

/// Sink that forwards events to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn record(&self, event: TraceEvent) {
        tracing::debug!(event = ?event, "correlation trace");
    }
}

/// Sink that records events in memory.
#[derive(Debug, Default)]
pub struct RecordingTrace {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTrace {
    /// Snapshot of all recorded events, in order.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TraceSink for RecordingTrace {
    fn record(&self, event: TraceEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_trace_keeps_order() {
        let sink = RecordingTrace::default();
        sink.record(TraceEvent::CompletionSeen {
            token: "t1".into(),
        });
        sink.record(TraceEvent::NoMatch {
            result_id: "agent-1".into(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TraceEvent::CompletionSeen { .. }));
        assert!(matches!(events[1], TraceEvent::NoMatch { .. }));
    }

    #[test]
    fn trace_event_serializes_with_tag() {
        let event = TraceEvent::LinkMatched {
            token: "toolu_01".into(),
            result_id: "agent-abc".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "link_matched");
        assert_eq!(json["token"], "toolu_01");
    }
}
