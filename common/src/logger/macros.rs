use tracing::{Span, field};

use super::TraceId;

/// Create a root span for a command / session run.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str(),
        user_id = field::Empty
    )
}

/// Create a child span (inherits trace_id automatically)
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}

/// Span wrapping one booking task's retry loop.
pub fn task_span(task_id: &str, space_no: &str, date: &str) -> Span {
    tracing::info_span!(
        "booking_task",
        task_id = %task_id,
        space_no = %space_no,
        date = %date,
        attempt = field::Empty
    )
}
