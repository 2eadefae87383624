//! Span processor that stamps ambient identity onto every span.

use opentelemetry::trace::{Span as _, TraceResult};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::trace::{Span, SpanProcessor};

use crate::semconv;
use value_core::context;

/// Stamps the ambient (user_id, anonymous_id) pair onto every span at start
/// time. This is the only writer of the identity attributes: action spans
/// carry the resolved identity in their start context, and spans opened by
/// instrumented third-party calls inherit whatever scope is current. Either
/// way each key is written at most once per span.
///
/// Must be registered on the tracer provider ahead of export-facing
/// processors so the stamped attributes are visible to exporters.
#[derive(Debug, Default)]
pub struct IdentitySpanProcessor;

impl SpanProcessor for IdentitySpanProcessor {
    fn on_start(&self, span: &mut Span, cx: &Context) {
        if !span.is_recording() {
            return;
        }
        let (user_id, anonymous_id) = context::identity_from(cx);
        if let Some(user_id) = user_id {
            span.set_attribute(KeyValue::new(semconv::ACTION_USER_ID, user_id.to_string()));
        }
        if let Some(anonymous_id) = anonymous_id {
            span.set_attribute(KeyValue::new(
                semconv::ACTION_ANONYMOUS_ID,
                anonymous_id.to_string(),
            ));
        }
    }

    fn on_end(&self, _span: SpanData) {}

    fn force_flush(&self) -> TraceResult<()> {
        Ok(())
    }

    fn shutdown(&self) -> TraceResult<()> {
        Ok(())
    }
}
