//! Action emission: one span per named unit of agent work.
//!
//! An [`Action`] describes one unit of work; the [`ActionEmitter`] resolves
//! its identity against the ambient action scope, partitions its attributes
//! into the standard set and the JSON overflow bag, and writes one
//! `value.action` span. An [`ActionScope`] publishes identity for a block
//! of work so that nested emission and third-party spans inherit it.

use opentelemetry::trace::{Span as _, Tracer as _};
use opentelemetry::{Context, Key, KeyValue, Value};
use opentelemetry_sdk::trace::Tracer;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::semconv;
use value_core::context::{self, ScopeGuard, ScopeIdentity};
use value_core::{Result, ValueSdkError};

/// One action to be recorded.
///
/// Identity set here is a fallback: when an action scope is current at send
/// time, the scope's identity wins over anything set on the action itself.
#[derive(Clone, Debug)]
pub struct Action {
    name: String,
    anonymous_id: Option<String>,
    user_id: Option<String>,
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anonymous_id: None,
            user_id: None,
            attributes: serde_json::Map::new(),
        }
    }

    pub fn anonymous_id(mut self, id: impl Into<String>) -> Self {
        self.anonymous_id = Some(id.into());
        self
    }

    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Attach an attribute. Keys in the standard action set are written to
    /// the span verbatim; everything else is preserved in the JSON overflow
    /// bag under `value.action.user_attributes`, never dropped.
    pub fn attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Identity an action span is emitted under, after resolution.
#[derive(Clone, Debug)]
struct ResolvedIdentity {
    anonymous_id: Arc<str>,
    user_id: Option<Arc<str>>,
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.is_empty())
}

/// Resolve the identity an action is attributed to.
///
/// A current action scope wins over identity passed on the action itself;
/// without a scope the explicit identity is used. An absent anonymous id
/// after resolution is an argument error.
fn resolve_identity(
    explicit_anonymous_id: Option<&str>,
    explicit_user_id: Option<&str>,
) -> Result<ResolvedIdentity> {
    if let Some(scope) = context::current_scope() {
        return Ok(ResolvedIdentity {
            anonymous_id: scope.anonymous_id.clone(),
            user_id: scope.user_id.clone(),
        });
    }
    let anonymous_id = non_empty(explicit_anonymous_id).ok_or_else(|| {
        ValueSdkError::InvalidArgument(
            "anonymous_id is required: pass it explicitly or enter an action scope".to_string(),
        )
    })?;
    Ok(ResolvedIdentity {
        anonymous_id: Arc::from(anonymous_id),
        user_id: non_empty(explicit_user_id).map(Arc::from),
    })
}

/// Partition caller attributes and assemble the span attribute set.
///
/// The identity pair is deliberately not written here: the span-start hook
/// stamps it from the pinned context, which keeps it to a single writer and
/// a single occurrence per span.
fn build_attributes(
    action_name: &str,
    attributes: serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<KeyValue>> {
    let mut span_attributes = Vec::with_capacity(attributes.len() + 2);
    let mut overflow = serde_json::Map::new();
    for (key, value) in attributes {
        if semconv::is_standard_attribute(&key) {
            span_attributes.push(KeyValue::new(key, json_to_otel_value(value)));
        } else {
            overflow.insert(key, value);
        }
    }
    span_attributes.push(KeyValue::new(
        semconv::ACTION_NAME,
        action_name.to_string(),
    ));
    span_attributes.push(KeyValue::new(
        semconv::ACTION_USER_ATTRIBUTES,
        serde_json::to_string(&overflow)?,
    ));
    Ok(span_attributes)
}

/// Map a JSON value onto an OpenTelemetry attribute value. Nested arrays
/// and objects are carried as their JSON text form.
fn json_to_otel_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.into()),
        other => Value::String(other.to_string().into()),
    }
}

/// Emitter for action spans.
#[derive(Clone, Debug)]
pub struct ActionEmitter {
    tracer: Tracer,
}

impl ActionEmitter {
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }

    /// Record one action as a zero-duration `value.action` span.
    ///
    /// Synchronous and non-blocking: the span is handed to the tracer
    /// before returning, export happens out of band. Fails without creating
    /// a span when no anonymous id can be resolved.
    pub fn send(&self, action: Action) -> Result<()> {
        let identity = resolve_identity(action.anonymous_id.as_deref(), action.user_id.as_deref())?;
        self.emit(action.name, &identity, action.attributes)
            .map(|mut span| span.end())
    }

    /// Start a `value.action` span that stays open for incremental
    /// attribute and event updates; it is ended by [`ActionSpan::end`] or
    /// on drop. The ambient agent task name, when set, is stamped on.
    pub fn start(&self, action: Action) -> Result<ActionSpan> {
        let identity = resolve_identity(action.anonymous_id.as_deref(), action.user_id.as_deref())?;
        let mut span = self.emit(action.name, &identity, action.attributes)?;
        if let Some(task_name) = context::current_task_name() {
            span.set_attribute(KeyValue::new(
                semconv::AGENT_TASK_NAME,
                task_name.to_string(),
            ));
        }
        Ok(ActionSpan { span })
    }

    /// Emission path for a scope's own `send`: the scope's captured
    /// identity is used as-is, whatever scope happens to be current.
    pub(crate) fn send_for_scope(&self, action: Action, scope: &ScopeIdentity) -> Result<()> {
        let identity = ResolvedIdentity {
            anonymous_id: scope.anonymous_id.clone(),
            user_id: scope.user_id.clone(),
        };
        self.emit(action.name, &identity, action.attributes)
            .map(|mut span| span.end())
    }

    fn emit(
        &self,
        name: String,
        identity: &ResolvedIdentity,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<opentelemetry_sdk::trace::Span> {
        let span_attributes = build_attributes(&name, attributes)?;
        // Starting under the pinned context hands the resolved identity to
        // the span-start hook; whatever scope is current stays untouched.
        let cx = context::pinned_identity_context(
            &Context::current(),
            identity.user_id.clone(),
            identity.anonymous_id.clone(),
        );
        Ok(self
            .tracer
            .span_builder(semconv::ACTION_SPAN_NAME)
            .with_attributes(span_attributes)
            .start_with_context(&self.tracer, &cx))
    }
}

/// An open action span produced by [`ActionEmitter::start`].
///
/// Ends when [`end`](Self::end) is called or the value is dropped.
#[derive(Debug)]
pub struct ActionSpan {
    span: opentelemetry_sdk::trace::Span,
}

impl ActionSpan {
    pub fn set_attribute(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    pub fn add_event(&mut self, name: impl Into<Cow<'static, str>>) {
        self.span.add_event(name, Vec::new());
    }

    pub fn end(mut self) {
        self.span.end();
    }
}

/// An action scope: identity published for a block of agent work.
///
/// Entering makes this the current scope for the call chain — nested
/// emission and spans opened by instrumented libraries inherit its
/// identity until the guard drops. A scope that is entered but never sent
/// from is legal; it only contributes ambient identity.
#[derive(Clone, Debug)]
pub struct ActionScope {
    identity: Arc<ScopeIdentity>,
    emitter: ActionEmitter,
}

/// Builds an [`ActionScope`]; produced by `ValueClient::action_scope`.
#[derive(Debug)]
pub struct ActionScopeBuilder {
    emitter: ActionEmitter,
    anonymous_id: String,
    user_id: Option<String>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ActionScopeBuilder {
    pub fn new(emitter: ActionEmitter, anonymous_id: impl Into<String>) -> Self {
        Self {
            emitter,
            anonymous_id: anonymous_id.into(),
            user_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Extra attributes captured on the scope. Part of the scope's
    /// identity, not written to spans.
    pub fn attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Fails when the anonymous id is empty; it is the one mandatory
    /// identity field throughout the SDK.
    pub fn build(self) -> Result<ActionScope> {
        if self.anonymous_id.is_empty() {
            return Err(ValueSdkError::InvalidArgument(
                "anonymous_id must not be empty when creating an action scope".to_string(),
            ));
        }
        Ok(ActionScope {
            identity: Arc::new(ScopeIdentity {
                anonymous_id: Arc::from(self.anonymous_id.as_str()),
                user_id: self.user_id.map(|id| Arc::from(id.as_str())),
                extra: self.extra,
            }),
            emitter: self.emitter,
        })
    }
}

impl ActionScope {
    /// Enter the scope for the current call chain. The returned guard
    /// restores the previous scope (and identity) on drop, also when the
    /// body panics. Must not be held across `.await`; async bodies use
    /// [`in_scope`](Self::in_scope).
    pub fn enter(&self) -> ScopeGuard {
        context::enter_scope(self.identity.clone())
    }

    /// Run a future with this scope current for its entire execution.
    /// The scope context is attached per poll, so it is restored correctly
    /// on cancellation as well.
    pub async fn in_scope<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        use opentelemetry::trace::FutureExt;
        fut.with_context(context::scope_context(
            &Context::current(),
            self.identity.clone(),
        ))
        .await
    }

    /// Emit an action under this scope's captured identity, regardless of
    /// which scope is current and of identity set on the action itself.
    pub fn send(&self, action: Action) -> Result<()> {
        self.emitter.send_for_scope(action, &self.identity)
    }

    pub fn anonymous_id(&self) -> &str {
        &self.identity.anonymous_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.user_id.as_deref()
    }
}
