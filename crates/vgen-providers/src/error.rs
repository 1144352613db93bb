//! Adapter error taxonomy.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Everything that can go wrong talking to a provider.
///
/// Only `TransientNetwork` is retried by the polling loop; all other
/// variants are surfaced to the caller, either synchronously from
/// submit or as a terminal failure from the loop.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Bad aspect ratio, duration, or prompt; rejected before the wire
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Provider does not offer the requested operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Credential rejected by the provider
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// Provider signalled 429
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Timeout, connection loss, or no connectivity; eligible for silent retry
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// Decoded provider error payload
    #[error("Provider error ({code}): {message}")]
    Api { code: String, message: String },

    /// Content rejected by the provider's moderation policy
    #[error("Content was rejected by moderation: {0}")]
    ModerationRejected(String),

    /// Provider does not know the job
    #[error("Job not found or was deleted")]
    NotFound,

    /// Undecodable or structurally impossible payload
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing credential or unusable client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn api(code: impl ToString, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Check if the polling loop should silently retry this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::TransientNetwork(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            Self::Config(e.to_string())
        } else {
            // Timeouts, connect failures, and mid-transfer drops are all
            // network-level; keep the retry bias for anything that never
            // produced a decodable response.
            Self::TransientNetwork(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_transient() {
        assert!(ProviderError::TransientNetwork("timeout".into()).is_transient());
        assert!(!ProviderError::RateLimited.is_transient());
        assert!(!ProviderError::NotFound.is_transient());
        assert!(!ProviderError::api(500, "boom").is_transient());
        assert!(!ProviderError::invalid_response("garbage").is_transient());
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = ProviderError::api("400017", "prompt too long");
        assert_eq!(err.to_string(), "Provider error (400017): prompt too long");
    }
}
