//! Runway adapter.
//!
//! Runway is routed image-to-video only. The source frame travels
//! inline as a base64 data URL, and task progress may arrive as either
//! a JSON number or a numeric string depending on the task phase.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vgen_models::{Capabilities, JobId, NormalizedResult, Progress, Provider};

use crate::adapter::{
    build_client, normalize_base_url, require_api_key, validate_params, ImageJobSpec,
    ProviderAdapter, TextJobSpec,
};
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.dev.runwayml.com";
const API_VERSION: &str = "2024-11-06";
const DEFAULT_MODEL: &str = "gen3a_turbo";

/// Runway API client.
pub struct RunwayAdapter {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    caps: Capabilities,
}

impl RunwayAdapter {
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        require_api_key(&api_key, Provider::Runway)?;
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client()?,
            caps: Capabilities::for_provider(Provider::Runway),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

#[async_trait]
impl ProviderAdapter for RunwayAdapter {
    fn provider(&self) -> Provider {
        Provider::Runway
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn submit_text(&self, _spec: &TextJobSpec) -> ProviderResult<JobId> {
        Err(ProviderError::unsupported(
            "runway does not accept text-to-video requests",
        ))
    }

    async fn submit_image(&self, spec: &ImageJobSpec) -> ProviderResult<JobId> {
        validate_params(&self.caps, &spec.aspect_ratio, spec.duration_secs)?;
        if spec.image.is_empty() {
            return Err(ProviderError::invalid_parameter(
                "image data must not be empty",
            ));
        }

        let body = ImageToVideoBody {
            prompt_image: format!("data:image/jpeg;base64,{}", BASE64.encode(&spec.image)),
            prompt_text: spec.prompt.clone().filter(|p| !p.trim().is_empty()),
            model: DEFAULT_MODEL,
            ratio: spec.aspect_ratio.clone(),
            duration: spec.duration_secs,
            content_moderation: ContentModeration {
                public_figure_threshold: "auto",
            },
        };
        let url = format!("{}/v1/image_to_video", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let submit: SubmitResponse = decode_response(response).await?;
        debug!(job_id = %submit.id, "runway image job submitted");
        Ok(JobId::new(submit.id))
    }

    async fn status(&self, id: &JobId) -> ProviderResult<NormalizedResult> {
        let url = format!("{}/v1/tasks/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", API_VERSION)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        let raw: RawTaskStatus = decode_response(response).await?;
        normalize(&raw)
    }
}

async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> ProviderResult<T> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::AuthFailure(body));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ProviderError::api(status.as_u16(), message));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::invalid_response(e.to_string()))
}

fn normalize(raw: &RawTaskStatus) -> ProviderResult<NormalizedResult> {
    let progress = raw
        .progress
        .as_ref()
        .and_then(RawProgress::value)
        .map(Progress::at)
        .unwrap_or(Progress::UNKNOWN);
    match raw.status.as_str() {
        // THROTTLED tasks are queued server-side and will run eventually.
        "PENDING" | "THROTTLED" => Ok(NormalizedResult::pending(progress)),
        "RUNNING" => Ok(NormalizedResult::running(progress)),
        "SUCCEEDED" => match raw.output.as_ref().and_then(|o| o.first()) {
            Some(url) => Ok(NormalizedResult::succeeded(url)),
            None => Err(ProviderError::invalid_response(
                "succeeded task without output",
            )),
        },
        "FAILED" => {
            let message = raw
                .failure
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Task failed without specific reason".to_string());
            Ok(NormalizedResult::failed(message))
        }
        "CANCELLED" => Ok(NormalizedResult::cancelled()),
        other => {
            warn!(status = other, "unknown runway task status, treating as running");
            Ok(NormalizedResult::running(progress))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageToVideoBody {
    prompt_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_text: Option<String>,
    model: &'static str,
    ratio: String,
    duration: u32,
    content_moderation: ContentModeration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentModeration {
    public_figure_threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct RawTaskStatus {
    status: String,
    #[serde(default)]
    failure: Option<String>,
    #[serde(default)]
    output: Option<Vec<String>>,
    #[serde(default)]
    progress: Option<RawProgress>,
}

/// Progress shows up as a float on running tasks but some responses
/// serialize it as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawProgress {
    Number(f64),
    Text(String),
}

impl RawProgress {
    fn value(&self) -> Option<f64> {
        match self {
            RawProgress::Number(v) => Some(*v),
            RawProgress::Text(s) => s.parse().ok(),
        }
    }
}
