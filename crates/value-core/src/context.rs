//! Ambient identity and task-name propagation for agent call chains.
//!
//! Identity (user_id, anonymous_id), the agent task name, and the current
//! action scope are carried as independent values inside
//! [`opentelemetry::Context`], so they flow implicitly through nested sync
//! calls (via the thread-local current context) and through async call
//! chains (via `FutureExt::with_context`). Two interleaved call chains never
//! observe each other's values.
//!
//! Mutation follows a stack discipline: every `set_*` call returns a guard
//! that captures the prior context and restores it on drop, so restoration
//! is exact, LIFO, and panic-safe. A `set_identity` call that leaves a field
//! absent keeps that field's prior value in place; dropping the guard
//! restores only what the call changed.
//!
//! Guards are thread-bound and must not be held across `.await`; async
//! bodies wrap their future with the `*_context` builders instead.

use opentelemetry::{Context, ContextGuard};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct UserIdValue(Option<Arc<str>>);

#[derive(Clone, Debug)]
struct AnonymousIdValue(Arc<str>);

#[derive(Clone, Debug)]
struct TaskNameValue(Arc<str>);

#[derive(Clone, Debug)]
struct CurrentScopeValue(Arc<ScopeIdentity>);

/// Identity captured by an action scope at creation time.
///
/// While a scope is entered, its identity takes precedence over identity
/// passed explicitly to action emission.
#[derive(Clone, Debug)]
pub struct ScopeIdentity {
    pub anonymous_id: Arc<str>,
    pub user_id: Option<Arc<str>>,
    /// Extra attributes captured at scope creation. Not written to spans,
    /// but part of the scope's identity.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Restores the identity state that was current when the guard was created.
#[must_use = "identity is restored when the guard is dropped"]
pub struct IdentityGuard {
    _guard: ContextGuard,
}

/// Restores the task-name state that was current when the guard was created.
#[must_use = "the task name is restored when the guard is dropped"]
pub struct TaskNameGuard {
    _guard: ContextGuard,
}

/// Restores the previous current scope (and its identity) on drop.
#[must_use = "the previous scope is restored when the guard is dropped"]
pub struct ScopeGuard {
    _guard: ContextGuard,
}

/// Build a context carrying the given identity fields on top of `base`.
///
/// Absent fields are left untouched: whatever `base` carries for them stays
/// visible in the returned context.
pub fn identity_context(
    base: &Context,
    user_id: Option<&str>,
    anonymous_id: Option<&str>,
) -> Context {
    let mut cx = base.clone();
    if let Some(user_id) = user_id {
        cx = cx.with_value(UserIdValue(Some(Arc::from(user_id))));
    }
    if let Some(anonymous_id) = anonymous_id {
        cx = cx.with_value(AnonymousIdValue(Arc::from(anonymous_id)));
    }
    cx
}

/// Publish identity into the current call chain until the guard is dropped.
///
/// Only present fields are overwritten; the guard restores exactly the
/// prior state, including fields this call never touched.
pub fn set_identity(user_id: Option<&str>, anonymous_id: Option<&str>) -> IdentityGuard {
    let cx = identity_context(&Context::current(), user_id, anonymous_id);
    IdentityGuard {
        _guard: cx.attach(),
    }
}

/// Build a context carrying the given agent task name on top of `base`.
pub fn task_name_context(base: &Context, task_name: &str) -> Context {
    base.with_value(TaskNameValue(Arc::from(task_name)))
}

/// Publish an agent task name into the current call chain until the guard
/// is dropped.
pub fn set_task_name(task_name: &str) -> TaskNameGuard {
    let cx = task_name_context(&Context::current(), task_name);
    TaskNameGuard {
        _guard: cx.attach(),
    }
}

/// Build a context carrying exactly the given identity on top of `base`.
///
/// Both fields are overwritten: an absent `user_id` masks whatever user id
/// `base` carries. Action emission pins its resolved identity this way so
/// the span-start hook sees that identity and nothing inherited.
pub fn pinned_identity_context(
    base: &Context,
    user_id: Option<Arc<str>>,
    anonymous_id: Arc<str>,
) -> Context {
    base.with_value(UserIdValue(user_id))
        .with_value(AnonymousIdValue(anonymous_id))
}

/// Build a context with `scope` as the current action scope on top of
/// `base`. The scope's identity is published alongside the scope pointer so
/// span-start hooks see it.
pub fn scope_context(base: &Context, scope: Arc<ScopeIdentity>) -> Context {
    let cx = identity_context(
        base,
        scope.user_id.as_deref(),
        Some(scope.anonymous_id.as_ref()),
    );
    cx.with_value(CurrentScopeValue(scope))
}

/// Make `scope` the current action scope for this call chain until the
/// guard is dropped. Nested calls stack: dropping the guard restores the
/// previously current scope, or none if there was none.
pub fn enter_scope(scope: Arc<ScopeIdentity>) -> ScopeGuard {
    let cx = scope_context(&Context::current(), scope);
    ScopeGuard {
        _guard: cx.attach(),
    }
}

/// The innermost entered, not-yet-exited action scope of this call chain.
pub fn current_scope() -> Option<Arc<ScopeIdentity>> {
    Context::map_current(|cx| cx.get::<CurrentScopeValue>().map(|v| v.0.clone()))
}

/// The user id currently visible in this call chain.
pub fn current_user_id() -> Option<Arc<str>> {
    Context::map_current(|cx| cx.get::<UserIdValue>().and_then(|v| v.0.clone()))
}

/// The anonymous id currently visible in this call chain.
pub fn current_anonymous_id() -> Option<Arc<str>> {
    Context::map_current(|cx| cx.get::<AnonymousIdValue>().map(|v| v.0.clone()))
}

/// The agent task name currently visible in this call chain.
pub fn current_task_name() -> Option<Arc<str>> {
    Context::map_current(|cx| cx.get::<TaskNameValue>().map(|v| v.0.clone()))
}

/// Read the identity pair out of an explicit context. Used by span-start
/// hooks, which receive the parent context of the span being started.
pub fn identity_from(cx: &Context) -> (Option<Arc<str>>, Option<Arc<str>>) {
    (
        cx.get::<UserIdValue>().and_then(|v| v.0.clone()),
        cx.get::<AnonymousIdValue>().map(|v| v.0.clone()),
    )
}
