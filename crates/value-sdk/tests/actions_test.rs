use opentelemetry::Value;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::export::trace::SpanData;
use serde_json::json;
use value_sdk::processor::IdentitySpanProcessor;
use value_sdk::{Action, ActionEmitter, ActionScopeBuilder, ValueSdkError, semconv};

fn test_emitter() -> (ActionEmitter, InMemorySpanExporter, TracerProvider) {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_span_processor(IdentitySpanProcessor)
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("value.sdk.test");
    (ActionEmitter::new(tracer), exporter, provider)
}

fn attr<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

fn attr_str<'a>(span: &'a SpanData, key: &str) -> Option<&'a str> {
    match attr(span, key) {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn attr_all<'a>(span: &'a SpanData, key: &str) -> Vec<&'a str> {
    span.attributes
        .iter()
        .filter(|kv| kv.key.as_str() == key)
        .filter_map(|kv| match &kv.value {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

fn overflow(span: &SpanData) -> serde_json::Value {
    let raw = attr_str(span, semconv::ACTION_USER_ATTRIBUTES).expect("overflow attribute");
    serde_json::from_str(raw).expect("overflow payload is valid JSON")
}

#[test]
fn send_produces_one_action_span() {
    let (emitter, exporter, _provider) = test_emitter();

    emitter
        .send(Action::new("test_action").anonymous_id("anon456"))
        .expect("send");

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, semconv::ACTION_SPAN_NAME);
    assert_eq!(attr_str(span, semconv::ACTION_NAME), Some("test_action"));
    assert_eq!(attr_str(span, semconv::ACTION_ANONYMOUS_ID), Some("anon456"));
    assert_eq!(attr_str(span, semconv::ACTION_USER_ID), None);
}

#[test]
fn scope_identity_wins_over_explicit_arguments() {
    let (emitter, exporter, _provider) = test_emitter();

    let scope = ActionScopeBuilder::new(emitter.clone(), "scope-anon")
        .build()
        .expect("scope");
    {
        let _entered = scope.enter();
        emitter
            .send(
                Action::new("test_action")
                    .anonymous_id("explicit-anon")
                    .user_id("explicit-user"),
            )
            .expect("send");
    }

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(spans.len(), 1);
    // The scope's identity is used and the explicit arguments are ignored,
    // including the user id the scope does not carry.
    assert_eq!(
        attr_str(&spans[0], semconv::ACTION_ANONYMOUS_ID),
        Some("scope-anon")
    );
    assert_eq!(attr_str(&spans[0], semconv::ACTION_USER_ID), None);
}

#[test]
fn non_standard_attributes_go_to_the_overflow_bag() {
    let (emitter, exporter, _provider) = test_emitter();

    emitter
        .send(
            Action::new("test_action")
                .anonymous_id("anon456")
                .attribute("value.action.description", "a standard attribute")
                .attribute("custom_metric", 42)
                .attribute("flagged", true),
        )
        .expect("send");

    let spans = exporter.get_finished_spans().expect("finished spans");
    let span = &spans[0];
    assert_eq!(
        attr_str(span, "value.action.description"),
        Some("a standard attribute")
    );
    // Non-standard keys never appear as top-level span attributes.
    assert!(attr(span, "custom_metric").is_none());
    assert!(attr(span, "flagged").is_none());
    assert_eq!(
        overflow(span),
        json!({"custom_metric": 42, "flagged": true})
    );
}

#[test]
fn overflow_round_trips_strings_numbers_and_booleans() {
    let (emitter, exporter, _provider) = test_emitter();

    emitter
        .send(
            Action::new("test_action")
                .anonymous_id("anon456")
                .attribute("text", "hello")
                .attribute("count", 500)
                .attribute("ratio", 0.25)
                .attribute("ok", false),
        )
        .expect("send");

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(
        overflow(&spans[0]),
        json!({"text": "hello", "count": 500, "ratio": 0.25, "ok": false})
    );
}

#[test]
fn nested_scopes_resolve_to_the_innermost_remaining() {
    let (emitter, exporter, _provider) = test_emitter();

    let scope_a = ActionScopeBuilder::new(emitter.clone(), "anon-a")
        .user_id("user-a")
        .build()
        .expect("scope a");
    let scope_b = ActionScopeBuilder::new(emitter.clone(), "anon-b")
        .build()
        .expect("scope b");

    let _entered_a = scope_a.enter();
    {
        let _entered_b = scope_b.enter();
    }
    // B has exited: identity resolves back to A, not to B, not to none.
    emitter.send(Action::new("test_action")).expect("send");

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(attr_str(&spans[0], semconv::ACTION_ANONYMOUS_ID), Some("anon-a"));
    assert_eq!(attr_str(&spans[0], semconv::ACTION_USER_ID), Some("user-a"));
}

#[test]
fn missing_anonymous_id_fails_without_creating_a_span() {
    let (emitter, exporter, _provider) = test_emitter();

    let err = emitter
        .send(Action::new("test_action").user_id("user123"))
        .unwrap_err();
    assert!(matches!(err, ValueSdkError::InvalidArgument(_)));

    let err = emitter
        .send(Action::new("test_action").anonymous_id(""))
        .unwrap_err();
    assert!(matches!(err, ValueSdkError::InvalidArgument(_)));

    assert!(exporter.get_finished_spans().expect("finished spans").is_empty());
}

#[test]
fn empty_anonymous_id_is_rejected_at_scope_creation() {
    let (emitter, _exporter, _provider) = test_emitter();

    let err = ActionScopeBuilder::new(emitter, "").build().unwrap_err();
    assert!(matches!(err, ValueSdkError::InvalidArgument(_)));
}

#[test]
fn scope_send_uses_its_captured_identity_not_the_current_scope() {
    let (emitter, exporter, _provider) = test_emitter();

    let scope_a = ActionScopeBuilder::new(emitter.clone(), "anon-a")
        .build()
        .expect("scope a");
    let scope_b = ActionScopeBuilder::new(emitter, "anon-b")
        .build()
        .expect("scope b");

    let _entered_b = scope_b.enter();
    scope_a.send(Action::new("test_action")).expect("send");

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(attr_str(&spans[0], semconv::ACTION_ANONYMOUS_ID), Some("anon-a"));
}

#[test]
fn identity_keys_are_written_exactly_once() {
    let (emitter, exporter, _provider) = test_emitter();

    let scope = ActionScopeBuilder::new(emitter.clone(), "anon456")
        .user_id("user123")
        .build()
        .expect("scope");
    {
        let _entered = scope.enter();
        emitter.send(Action::new("test_action")).expect("send");
    }

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(spans.len(), 1);
    assert_eq!(
        attr_all(&spans[0], semconv::ACTION_ANONYMOUS_ID),
        vec!["anon456"]
    );
    assert_eq!(attr_all(&spans[0], semconv::ACTION_USER_ID), vec!["user123"]);
}

#[test]
fn sibling_scope_identity_never_reaches_a_pinned_send() {
    let (emitter, exporter, _provider) = test_emitter();

    let scope_a = ActionScopeBuilder::new(emitter.clone(), "anon-a")
        .build()
        .expect("scope a");
    let scope_b = ActionScopeBuilder::new(emitter, "anon-b")
        .user_id("user-b")
        .build()
        .expect("scope b");

    let _entered_b = scope_b.enter();
    scope_a.send(Action::new("test_action")).expect("send");

    // Only A's identity lands on the span: no second, conflicting value
    // from the entered sibling, and no inherited user id either.
    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(attr_all(&spans[0], semconv::ACTION_ANONYMOUS_ID), vec!["anon-a"]);
    assert!(attr_all(&spans[0], semconv::ACTION_USER_ID).is_empty());
}

#[test]
fn open_action_span_collects_incremental_updates() {
    let (emitter, exporter, _provider) = test_emitter();

    let mut span = emitter
        .start(
            Action::new("transform_data")
                .anonymous_id("anon456")
                .attribute("data_length", 11),
        )
        .expect("start");
    span.add_event("Starting transformation");
    span.set_attribute("value.action.status", "ok");
    span.end();

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, semconv::ACTION_SPAN_NAME);
    assert_eq!(attr_str(span, "value.action.status"), Some("ok"));
    assert_eq!(overflow(span), json!({"data_length": 11}));
    assert_eq!(span.events.events.len(), 1);
    assert_eq!(span.events.events[0].name, "Starting transformation");
}

#[test]
fn end_to_end_scope_send_schema() {
    let (emitter, exporter, _provider) = test_emitter();

    let scope = ActionScopeBuilder::new(emitter, "anon456")
        .user_id("user123")
        .build()
        .expect("scope");
    {
        let _entered = scope.enter();
        scope
            .send(
                Action::new("transform_data")
                    .attribute("input_text", "hello")
                    .attribute("processing_time_ms", 500),
            )
            .expect("send");
    }

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, "value.action");
    assert_eq!(attr_str(span, "value.action.name"), Some("transform_data"));
    assert_eq!(attr_str(span, "value.action.anonymous_id"), Some("anon456"));
    assert_eq!(attr_str(span, "value.action.user_id"), Some("user123"));
    assert_eq!(
        overflow(span),
        json!({"input_text": "hello", "processing_time_ms": 500})
    );
}
