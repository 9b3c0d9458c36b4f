//! Structured trace of the orchestration loop.
//!
//! The loop reports ordered events through an injectable sink instead of
//! printing, so callers decide where the trace goes and tests can assert on
//! emitted events without capturing console output.

use std::sync::Mutex;

/// One orchestration event, in the order the loop produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A model round is starting. `tools_enabled` is false once the
    /// termination policy has stopped soliciting tool calls.
    ModelCall {
        iteration: usize,
        tools_enabled: bool,
    },
    /// The model asked for a tool invocation.
    ToolCall {
        id: String,
        name: String,
        arguments: String,
    },
    /// A dispatch finished; `ok` is false for error results.
    ToolResult { id: String, name: String, ok: bool },
    /// The loop settled on a final answer. `degraded` marks answers
    /// produced without any tool having been called.
    FinalAnswer { text: String, degraded: bool },
}

/// Receives loop events in order.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&self, event: TraceEvent) {
        match event {
            TraceEvent::ModelCall {
                iteration,
                tools_enabled,
            } => tracing::debug!(iteration, tools_enabled, "model call"),
            TraceEvent::ToolCall { id, name, arguments } => {
                tracing::info!(%id, %name, %arguments, "tool call")
            }
            TraceEvent::ToolResult { id, name, ok } => {
                tracing::info!(%id, %name, ok, "tool result")
            }
            TraceEvent::FinalAnswer { degraded, .. } => {
                tracing::info!(degraded, "final answer")
            }
        }
    }
}

/// Sink that buffers events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().expect("trace sink lock").clone()
    }
}

impl TraceSink for MemorySink {
    fn record(&self, event: TraceEvent) {
        self.events.lock().expect("trace sink lock").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_preserves_order() {
        let sink = MemorySink::new();
        sink.record(TraceEvent::ModelCall {
            iteration: 1,
            tools_enabled: true,
        });
        sink.record(TraceEvent::FinalAnswer {
            text: "done".into(),
            degraded: false,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TraceEvent::ModelCall { iteration: 1, .. }));
        assert!(matches!(events[1], TraceEvent::FinalAnswer { degraded: false, .. }));
    }
}
