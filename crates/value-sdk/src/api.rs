//! HTTP client for the Value control-plane backend.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use value_core::{Result, ValueSdkError};

const AGENT_INFO_PATH: &str = "/api/v1/agent_instance/info";
const SECRET_HEADER: &str = "X-Agent-Secret";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn unknown() -> String {
    "unknown".to_string()
}

/// Agent instance metadata served by the control plane.
///
/// Every field falls back to `"unknown"` when the backend omits it.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentInfo {
    #[serde(default = "unknown")]
    pub organization_id: String,
    #[serde(default = "unknown")]
    pub workspace_id: String,
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub id: String,
}

impl Default for AgentInfo {
    fn default() -> Self {
        Self {
            organization_id: unknown(),
            workspace_id: unknown(),
            name: unknown(),
            id: unknown(),
        }
    }
}

/// Client for the Value control-plane API.
///
/// Authenticates with a static agent secret sent as a request header.
/// Requests are not retried here; a failed fetch surfaces as
/// [`ValueSdkError::Transport`] to the caller.
#[derive(Clone)]
pub struct ControlPlaneApi {
    base_url: String,
    secret: String,
    timeout: Duration,
}

// The secret must never reach logs; Debug is hand-written to redact it.
impl fmt::Debug for ControlPlaneApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlaneApi")
            .field("base_url", &self.base_url)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ControlPlaneApi {
    pub fn new(secret: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret: secret.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn agent_info_url(&self) -> String {
        format!("{}{}", self.base_url, AGENT_INFO_PATH)
    }

    /// Fetch agent instance metadata (organization, workspace, name, id).
    pub async fn get_agent_info(&self) -> Result<AgentInfo> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ValueSdkError::transport("building HTTP client", e))?;
        let response = client
            .get(self.agent_info_url())
            .header(SECRET_HEADER, &self.secret)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ValueSdkError::transport("requesting agent info", e))?
            .error_for_status()
            .map_err(|e| ValueSdkError::transport("agent info request rejected", e))?;
        response
            .json::<AgentInfo>()
            .await
            .map_err(|e| ValueSdkError::transport("decoding agent info", e))
    }

    /// Blocking variant of [`get_agent_info`](Self::get_agent_info) for
    /// synchronous hosts. Must not be called from inside an async runtime.
    pub fn get_agent_info_blocking(&self) -> Result<AgentInfo> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ValueSdkError::transport("building HTTP client", e))?;
        let response = client
            .get(self.agent_info_url())
            .header(SECRET_HEADER, &self.secret)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .map_err(|e| ValueSdkError::transport("requesting agent info", e))?
            .error_for_status()
            .map_err(|e| ValueSdkError::transport("agent info request rejected", e))?;
        response
            .json::<AgentInfo>()
            .map_err(|e| ValueSdkError::transport("decoding agent info", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_info_defaults_to_unknown() {
        let info: AgentInfo = serde_json::from_str("{}").expect("empty object");
        assert_eq!(info.organization_id, "unknown");
        assert_eq!(info.workspace_id, "unknown");
        assert_eq!(info.name, "unknown");
        assert_eq!(info.id, "unknown");

        let info: AgentInfo =
            serde_json::from_str(r#"{"organization_id": "org_1", "name": "agent_1"}"#)
                .expect("partial object");
        assert_eq!(info.organization_id, "org_1");
        assert_eq!(info.name, "agent_1");
        assert_eq!(info.workspace_id, "unknown");
    }

    #[test]
    fn agent_info_url_joins_path() {
        let api = ControlPlaneApi::new("s3cret", "https://custom-backend.com");
        assert_eq!(
            api.agent_info_url(),
            "https://custom-backend.com/api/v1/agent_instance/info"
        );
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let api = ControlPlaneApi::new("s3cret", "https://custom-backend.com");
        let rendered = format!("{api:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
