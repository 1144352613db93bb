//! The per-provider adapter contract.

use std::time::Duration;

use async_trait::async_trait;

use vgen_models::{Capabilities, JobId, NormalizedResult, Provider};

use crate::error::{ProviderError, ProviderResult};

/// Inputs for a text-to-video submission.
#[derive(Debug, Clone)]
pub struct TextJobSpec {
    pub prompt: String,
    pub aspect_ratio: String,
    pub duration_secs: u32,
    pub with_audio: bool,
}

/// Inputs for an image-to-video submission.
#[derive(Debug, Clone)]
pub struct ImageJobSpec {
    /// JPEG-encoded source image
    pub image: Vec<u8>,
    pub prompt: Option<String>,
    pub aspect_ratio: String,
    pub duration_secs: u32,
    pub with_audio: bool,
}

/// One concrete provider integration.
///
/// Adapters validate parameters against their capability table before
/// anything touches the network, attach their provider-specific auth
/// header to every request, and normalize job ids and statuses at the
/// wire boundary. They never mutate registry state; that is the
/// caller's job.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    fn capabilities(&self) -> &Capabilities;

    /// Submit a text-to-video job. Fails with `UnsupportedOperation`
    /// when the provider is not routed for text input.
    async fn submit_text(&self, spec: &TextJobSpec) -> ProviderResult<JobId>;

    /// Submit an image-to-video job. Fails with `UnsupportedOperation`
    /// when the provider is not routed for image input.
    async fn submit_image(&self, spec: &ImageJobSpec) -> ProviderResult<JobId>;

    /// Fetch and normalize the provider's current view of a job.
    async fn status(&self, id: &JobId) -> ProviderResult<NormalizedResult>;

    /// Best-effort remote cancellation. `Ok(false)` when the provider
    /// has no cancel endpoint.
    async fn cancel(&self, _id: &JobId) -> ProviderResult<bool> {
        Ok(false)
    }
}

/// Per-request timeout for all provider HTTP calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_client() -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::config(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn require_api_key(api_key: &str, provider: Provider) -> ProviderResult<()> {
    if api_key.trim().is_empty() {
        return Err(ProviderError::config(format!(
            "{provider} API key is empty"
        )));
    }
    Ok(())
}

/// Reject parameters outside the provider's declared sets before any
/// network submission.
pub(crate) fn validate_params(
    caps: &Capabilities,
    aspect_ratio: &str,
    duration_secs: u32,
) -> ProviderResult<()> {
    if !caps.supports_aspect_ratio(aspect_ratio) {
        return Err(ProviderError::invalid_parameter(format!(
            "aspect ratio {aspect_ratio:?} is not supported by {}",
            caps.provider
        )));
    }
    if !caps.supports_duration(duration_secs) {
        return Err(ProviderError::invalid_parameter(format!(
            "duration {duration_secs}s is not supported by {}",
            caps.provider
        )));
    }
    Ok(())
}

/// Strip a trailing slash so endpoint joins stay predictable.
pub(crate) fn normalize_base_url(url: impl Into<String>) -> String {
    let url = url.into();
    url.trim_end_matches('/').to_string()
}
