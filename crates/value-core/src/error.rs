//! Error types for the Value Control SDK
//!
//! Provides the SDK-wide error hierarchy using `thiserror` for proper error
//! handling and error chaining throughout the codebase.

use thiserror::Error;

/// Main error type for the Value Control SDK
#[derive(Error, Debug)]
pub enum ValueSdkError {
    /// SDK configuration error (missing secret, bad endpoint, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid argument provided to an SDK operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Control-plane HTTP request failed
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Trace pipeline construction or shutdown error
    #[error("Trace pipeline error: {0}")]
    Trace(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValueSdkError {
    /// Wrap a transport-level failure with a short description of the request.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValueSdkError>;
