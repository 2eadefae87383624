//! Value Control SDK for OpenTelemetry-based agent observability.
//!
//! A thin client over the OpenTelemetry SDK that records agent "actions"
//! as spans, tagged with tenant/user identity that propagates implicitly
//! through sync and async call chains:
//!
//! ```no_run
//! use value_sdk::{Action, SdkConfig, ValueClient};
//!
//! # async fn run() -> value_sdk::Result<()> {
//! let client = ValueClient::initialize(SdkConfig::from_env()).await?;
//!
//! let scope = client.action_scope("anon456").user_id("user123").build()?;
//! let _entered = scope.enter();
//! scope.send(
//!     Action::new("transform_data")
//!         .attribute("input_text", "hello")
//!         .attribute("processing_time_ms", 500),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod instrumentation;
pub mod processor;
pub mod semconv;
pub mod task;
pub mod telemetry;

pub use actions::{Action, ActionEmitter, ActionScope, ActionScopeBuilder, ActionSpan};
pub use api::{AgentInfo, ControlPlaneApi};
pub use client::{ValueClient, initialize_async, initialize_sync};
pub use config::SdkConfig;
pub use instrumentation::{InstrumentationRegistry, Instrumentor, auto_instrument};
pub use processor::IdentitySpanProcessor;
pub use task::{with_task_name, with_task_name_async};
pub use telemetry::ExportMode;
pub use value_core::{Result, ValueSdkError};
