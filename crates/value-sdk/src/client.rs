//! SDK client: configuration, control-plane handshake, tracer lifecycle.

use opentelemetry_sdk::trace::{Tracer, TracerProvider};

use crate::actions::{ActionEmitter, ActionScopeBuilder};
use crate::api::{AgentInfo, ControlPlaneApi};
use crate::config::SdkConfig;
use crate::telemetry::{self, ExportMode};
use value_core::{Result, ValueSdkError};

/// Client for the Value Control SDK.
///
/// Construction fetches agent metadata from the control plane and installs
/// the process-wide tracer provider; the resulting client hands out the
/// action emitter and action scopes. One client per process is the
/// intended shape.
#[derive(Clone, Debug)]
pub struct ValueClient {
    config: SdkConfig,
    api: ControlPlaneApi,
    agent_info: AgentInfo,
    provider: TracerProvider,
    tracer: Tracer,
    emitter: ActionEmitter,
}

impl ValueClient {
    /// Initialize an async client: fetch agent metadata and set up batch
    /// export on the tokio runtime. Fails fast without a secret
    /// ([`ValueSdkError::Configuration`]) and on a failed metadata fetch
    /// ([`ValueSdkError::Transport`]).
    pub async fn initialize(config: SdkConfig) -> Result<Self> {
        let api = api_from(&config)?;
        let agent_info = api.get_agent_info().await?;
        Self::build(config, api, agent_info, ExportMode::Batch)
    }

    /// Initialize a blocking client: synchronous metadata fetch and
    /// synchronous span export (no async runtime required).
    pub fn initialize_blocking(config: SdkConfig) -> Result<Self> {
        let api = api_from(&config)?;
        let agent_info = api.get_agent_info_blocking()?;
        Self::build(config, api, agent_info, ExportMode::Simple)
    }

    /// Build a client from already-known agent metadata, skipping the
    /// control-plane fetch. Offline and test path.
    pub fn build_with_agent_info(
        config: SdkConfig,
        agent_info: AgentInfo,
        mode: ExportMode,
    ) -> Result<Self> {
        let api = api_from(&config)?;
        Self::build(config, api, agent_info, mode)
    }

    fn build(
        config: SdkConfig,
        api: ControlPlaneApi,
        agent_info: AgentInfo,
        mode: ExportMode,
    ) -> Result<Self> {
        let (provider, tracer) = telemetry::init_tracing(&config, &agent_info, mode)?;
        tracing::debug!(
            organization_id = %agent_info.organization_id,
            workspace_id = %agent_info.workspace_id,
            agent_name = %agent_info.name,
            "value client initialized"
        );
        let emitter = ActionEmitter::new(tracer.clone());
        Ok(Self {
            config,
            api,
            agent_info,
            provider,
            tracer,
            emitter,
        })
    }

    /// The action emitter for fire-and-forget sends.
    pub fn action(&self) -> &ActionEmitter {
        &self.emitter
    }

    /// Start building an action scope for sending multiple actions under
    /// one identity.
    pub fn action_scope(&self, anonymous_id: impl Into<String>) -> ActionScopeBuilder {
        ActionScopeBuilder::new(self.emitter.clone(), anonymous_id)
    }

    pub fn agent_info(&self) -> &AgentInfo {
        &self.agent_info
    }

    pub fn api(&self) -> &ControlPlaneApi {
        &self.api
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Flush pending spans and shut the export pipeline down.
    pub fn shutdown(&self) -> Result<()> {
        for result in self.provider.force_flush() {
            result.map_err(|e| ValueSdkError::Trace(format!("flushing spans: {e}")))?;
        }
        self.provider
            .shutdown()
            .map_err(|e| ValueSdkError::Trace(format!("shutting down tracer provider: {e}")))
    }
}

fn api_from(config: &SdkConfig) -> Result<ControlPlaneApi> {
    let secret = config
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ValueSdkError::Configuration(
                "agent secret must be provided (VALUE_AGENT_SECRET)".to_string(),
            )
        })?;
    Ok(ControlPlaneApi::new(secret, config.backend_url.clone()))
}

/// Initialize an async client from `VALUE_*` environment variables.
pub async fn initialize_async(service_name: impl Into<String>) -> Result<ValueClient> {
    let config = SdkConfig::from_env().with_service_name(service_name);
    ValueClient::initialize(config).await
}

/// Initialize a blocking client from `VALUE_*` environment variables.
pub fn initialize_sync(service_name: impl Into<String>) -> Result<ValueClient> {
    let config = SdkConfig::from_env().with_service_name(service_name);
    ValueClient::initialize_blocking(config)
}
