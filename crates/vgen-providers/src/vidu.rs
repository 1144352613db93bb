//! Vidu adapter.
//!
//! The only provider with a remote cancel endpoint. Model and
//! resolution are derived from the requested clip duration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vgen_models::{Capabilities, JobId, NormalizedResult, Progress, Provider};

use crate::adapter::{
    build_client, normalize_base_url, require_api_key, validate_params, ImageJobSpec,
    ProviderAdapter, TextJobSpec,
};
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.vidu.com";
const PROMPT_LIMIT: usize = 1500;

/// Vidu API client.
pub struct ViduAdapter {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    caps: Capabilities,
}

impl ViduAdapter {
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        require_api_key(&api_key, Provider::Vidu)?;
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client()?,
            caps: Capabilities::for_provider(Provider::Vidu),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_key)
    }
}

/// Longer clips only render on the older model tier.
fn model_for_duration(duration_secs: u32) -> (&'static str, &'static str) {
    match duration_secs {
        5 => ("viduq1", "1080p"),
        4 => ("vidu1.5", "360p"),
        _ => ("vidu1.5", "720p"),
    }
}

#[async_trait]
impl ProviderAdapter for ViduAdapter {
    fn provider(&self) -> Provider {
        Provider::Vidu
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn submit_text(&self, spec: &TextJobSpec) -> ProviderResult<JobId> {
        validate_params(&self.caps, &spec.aspect_ratio, spec.duration_secs)?;
        if spec.prompt.trim().is_empty() {
            return Err(ProviderError::invalid_parameter("prompt must not be empty"));
        }

        let (model, resolution) = model_for_duration(spec.duration_secs);
        let body = Text2VideoBody {
            model,
            style: "general",
            prompt: spec.prompt.chars().take(PROMPT_LIMIT).collect(),
            duration: spec.duration_secs,
            aspect_ratio: spec.aspect_ratio.clone(),
            resolution,
            movement_amplitude: "auto",
            bgm: spec.with_audio,
            off_peak: false,
        };
        let url = format!("{}/ent/v2/text2video", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;
        let submit: SubmitResponse = decode_response(response).await?;
        debug!(job_id = %submit.task_id, "vidu text job submitted");
        Ok(JobId::new(submit.task_id))
    }

    async fn submit_image(&self, _spec: &ImageJobSpec) -> ProviderResult<JobId> {
        Err(ProviderError::unsupported(
            "vidu does not accept image-to-video requests",
        ))
    }

    async fn status(&self, id: &JobId) -> ProviderResult<NormalizedResult> {
        let url = format!("{}/ent/v2/tasks/{}/creations", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        let raw: RawTaskStatus = decode_response(response).await?;
        normalize(&raw)
    }

    async fn cancel(&self, id: &JobId) -> ProviderResult<bool> {
        let url = format!("{}/ent/v2/task/{}/cancel", self.base_url, id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        Ok(response.status().is_success())
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
    match raw.state.as_str() {
        "created" | "queueing" => Ok(NormalizedResult::pending(Progress::at(0.1))),
        "processing" => Ok(NormalizedResult::running(Progress::at(0.5))),
        "success" => {
            let creation = raw.creations.first().ok_or_else(|| {
                ProviderError::invalid_response("successful task with no creations")
            })?;
            let url = creation.url.as_deref().ok_or_else(|| {
                ProviderError::invalid_response("successful creation without a URL")
            })?;
            let mut result = NormalizedResult::succeeded(url);
            let resolution = creation
                .video
                .as_ref()
                .and_then(|v| v.resolution.as_ref());
            if let Some(res) = resolution {
                if let (Some(w), Some(h)) = (res.width, res.height) {
                    result = result.with_dimensions(w, h);
                }
            }
            Ok(result)
        }
        "failed" => {
            let message = raw
                .err_code
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "Task failed without specific reason".to_string());
            Ok(NormalizedResult::failed(message))
        }
        other => {
            warn!(state = other, "unknown vidu task state, treating as running");
            Ok(NormalizedResult::running(Progress::UNKNOWN))
        }
    }
}

#[derive(Debug, Serialize)]
struct Text2VideoBody {
    model: &'static str,
    style: &'static str,
    prompt: String,
    duration: u32,
    aspect_ratio: String,
    resolution: &'static str,
    movement_amplitude: &'static str,
    bgm: bool,
    off_peak: bool,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct RawTaskStatus {
    state: String,
    #[serde(default)]
    err_code: Option<String>,
    #[serde(default)]
    creations: Vec<RawCreation>,
}

#[derive(Debug, Deserialize)]
struct RawCreation {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    video: Option<RawVideoInfo>,
}

#[derive(Debug, Deserialize)]
struct RawVideoInfo {
    #[serde(default)]
    resolution: Option<RawResolution>,
}

#[derive(Debug, Deserialize)]
struct RawResolution {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgen_models::JobState;

    fn task(json: serde_json::Value) -> RawTaskStatus {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_model_selection_by_duration() {
        assert_eq!(model_for_duration(5), ("viduq1", "1080p"));
        assert_eq!(model_for_duration(4), ("vidu1.5", "360p"));
        assert_eq!(model_for_duration(8), ("vidu1.5", "720p"));
    }

    #[test]
    fn test_queueing_is_pending() {
        let raw = task(serde_json::json!({ "state": "queueing" }));
        assert_eq!(normalize(&raw).unwrap().state, JobState::Pending);
    }

    #[test]
    fn test_success_with_empty_creations_is_invalid() {
        let raw = task(serde_json::json!({ "state": "success", "creations": [] }));
        assert!(matches!(
            normalize(&raw),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_success_extracts_url_and_resolution() {
        let raw = task(serde_json::json!({
            "state": "success",
            "creations": [{
                "url": "https://cdn/clip.mp4",
                "video": { "resolution": { "width": 1920, "height": 1080 } }
            }]
        }));
        let result = normalize(&raw).unwrap();
        assert_eq!(result.state, JobState::Succeeded);
        assert_eq!(result.media_url.as_deref(), Some("https://cdn/clip.mp4"));
        let dims = result.dimensions.unwrap();
        assert_eq!((dims.width, dims.height), (1920, 1080));
    }

    #[test]
    fn test_failed_uses_err_code() {
        let raw = task(serde_json::json!({ "state": "failed", "err_code": "E_QUOTA" }));
        let result = normalize(&raw).unwrap();
        assert_eq!(result.state, JobState::Failed);
        assert_eq!(result.error_message.as_deref(), Some("E_QUOTA"));
    }

    #[test]
    fn test_unknown_state_keeps_running() {
        let raw = task(serde_json::json!({ "state": "scheduling" }));
        assert_eq!(normalize(&raw).unwrap().state, JobState::Running);
    }
}
