//! Wire-visible span and attribute names for the Value backend.
//!
//! These keys are part of the export schema the backend reconstructs action
//! timelines from; changing any of them is a breaking protocol change.

/// Span name for every emitted action record.
pub const ACTION_SPAN_NAME: &str = "value.action";

/// Name of the action kind. Required on every action span.
pub const ACTION_NAME: &str = "value.action.name";

/// End-user identifier, when known.
pub const ACTION_USER_ID: &str = "value.action.user_id";

/// Device/session identifier. Required for action attribution.
pub const ACTION_ANONYMOUS_ID: &str = "value.action.anonymous_id";

/// JSON-encoded object holding caller attributes outside the standard set.
pub const ACTION_USER_ATTRIBUTES: &str = "value.action.user_attributes";

/// Agent task name propagated from the ambient task context.
pub const AGENT_TASK_NAME: &str = "value.agent.task.name";

/// Resource attribute: owning organization of the agent instance.
pub const AGENT_ORGANIZATION_ID: &str = "value.agent.organization_id";

/// Resource attribute: workspace the agent instance runs in.
pub const AGENT_WORKSPACE_ID: &str = "value.agent.workspace_id";

/// Resource attribute: configured agent name.
pub const AGENT_NAME: &str = "value.agent.name";

/// Resource attribute identifying this client implementation.
pub const CLIENT_SDK: &str = "value.client.sdk";

/// Fixed client identifier attached to every span this process emits.
pub const CLIENT_SDK_NAME: &str = "value-rust";

/// Recognized action attribute keys, passed through to the span verbatim.
/// Anything else a caller supplies is preserved in the JSON overflow bag
/// under [`ACTION_USER_ATTRIBUTES`].
pub const STANDARD_ACTION_ATTRIBUTES: [&str; 14] = [
    "value.action.name",
    "value.action.description",
    "value.action.type",
    "value.action.status",
    "value.action.error",
    "value.action.duration",
    "value.action.start_time",
    "value.action.end_time",
    "value.action.llm.model",
    "value.action.llm.input_tokens",
    "value.action.llm.output_tokens",
    "value.action.llm.total_tokens",
    "value.action.llm.prompt",
    "value.action.llm.response",
];

/// Whether `key` belongs to the standard action attribute set.
pub fn is_standard_attribute(key: &str) -> bool {
    STANDARD_ACTION_ATTRIBUTES.contains(&key)
}
