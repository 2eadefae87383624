//! Agent task-name propagation around sync and async calls.
//!
//! Wrapping a call publishes the task name into the ambient task context
//! for the call's duration and best-effort annotates the span that is
//! recording at invocation time. The wrapped call's own errors propagate
//! unchanged; only the instrumentation is best-effort.

use opentelemetry::trace::{FutureExt, TraceContextExt};
use opentelemetry::{Context, KeyValue};
use std::future::Future;

use crate::semconv;
use value_core::context;

/// Stamp the task name on the span recording in `cx`, if any.
fn annotate_current_span(cx: &Context, task_name: &str) {
    let span = cx.span();
    if span.is_recording() {
        span.set_attribute(KeyValue::new(
            semconv::AGENT_TASK_NAME,
            task_name.to_string(),
        ));
    }
}

/// Run `f` with `task_name` published into the ambient task context.
///
/// The prior task name is restored on every exit path, including panics.
pub fn with_task_name<T>(task_name: &str, f: impl FnOnce() -> T) -> T {
    let cx = context::task_name_context(&Context::current(), task_name);
    annotate_current_span(&cx, task_name);
    let _guard = cx.attach();
    f()
}

/// Run `fut` with `task_name` published into the ambient task context.
///
/// The context is attached per poll, so the prior task name is restored on
/// completion, on error, and when the future is dropped mid-execution.
pub async fn with_task_name_async<F>(task_name: &str, fut: F) -> F::Output
where
    F: Future,
{
    let cx = context::task_name_context(&Context::current(), task_name);
    annotate_current_span(&cx, task_name);
    fut.with_context(cx).await
}
