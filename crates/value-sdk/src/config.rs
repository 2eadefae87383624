//! Environment-driven SDK configuration.

use std::env;
use std::fmt;

pub const DEFAULT_OTEL_ENDPOINT: &str = "http://localhost:4317";
pub const DEFAULT_BACKEND_URL: &str = "https://api.your-backend.com";
pub const DEFAULT_SERVICE_NAME: &str = "value-control-agent";

/// Configuration for the Value SDK.
///
/// Loaded from the environment via [`SdkConfig::from_env`]; individual
/// fields can then be overridden with the `with_*` setters. The agent
/// secret is the only field without a default — a client cannot be built
/// without one.
#[derive(Clone)]
pub struct SdkConfig {
    /// OTLP endpoint the trace export pipeline ships spans to. Batch
    /// export speaks OTLP/gRPC, simple export OTLP/HTTP; point this at the
    /// matching collector port.
    pub otel_endpoint: String,
    /// Base URL of the Value control-plane API.
    pub backend_url: String,
    /// `service.name` resource attribute for all emitted spans.
    pub service_name: String,
    /// Agent authentication secret for the control-plane API.
    pub secret: Option<String>,
    /// Additionally export spans to stdout for debugging.
    pub console_export: bool,
}

// The secret must never reach logs; Debug is hand-written to redact it
// while still showing whether one is set.
impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("otel_endpoint", &self.otel_endpoint)
            .field("backend_url", &self.backend_url)
            .field("service_name", &self.service_name)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("console_export", &self.console_export)
            .finish()
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            otel_endpoint: DEFAULT_OTEL_ENDPOINT.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            secret: None,
            console_export: false,
        }
    }
}

impl SdkConfig {
    /// Load configuration from `VALUE_*` environment variables, falling back
    /// to defaults for everything but the secret.
    pub fn from_env() -> Self {
        Self {
            otel_endpoint: env::var("VALUE_OTEL_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_OTEL_ENDPOINT.to_string()),
            backend_url: env::var("VALUE_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            service_name: env::var("VALUE_SERVICE_NAME")
                .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string()),
            secret: env::var("VALUE_AGENT_SECRET").ok().filter(|s| !s.is_empty()),
            console_export: env::var("VALUE_CONSOLE_EXPORT")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_otel_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otel_endpoint = endpoint.into();
        self
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_console_export(mut self, enabled: bool) -> Self {
        self.console_export = enabled;
        self
    }
}
