//! PixVerse adapter.
//!
//! Every response is wrapped in an `ErrCode`/`ErrMsg`/`Resp` envelope,
//! statuses are integers, and `video_id` may come back as either an
//! integer or a string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use vgen_models::{Capabilities, JobId, NormalizedResult, Progress, Provider};

use crate::adapter::{
    build_client, normalize_base_url, require_api_key, validate_params, ImageJobSpec,
    ProviderAdapter, TextJobSpec,
};
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://app-api.pixverse.ai";
const DEFAULT_MODEL: &str = "v4.5";
const DEFAULT_QUALITY: &str = "540p";
const DEFAULT_MOTION_MODE: &str = "normal";

const STATUS_SUCCESS: i64 = 1;
const STATUS_GENERATING: i64 = 5;
const STATUS_MODERATION: i64 = 7;
const STATUS_FAILED: i64 = 8;

/// PixVerse API client.
pub struct PixverseAdapter {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    caps: Capabilities,
}

impl PixverseAdapter {
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        require_api_key(&api_key, Provider::Pixverse)?;
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_client()?,
            caps: Capabilities::for_provider(Provider::Pixverse),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

#[async_trait]
impl ProviderAdapter for PixverseAdapter {
    fn provider(&self) -> Provider {
        Provider::Pixverse
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn submit_text(&self, spec: &TextJobSpec) -> ProviderResult<JobId> {
        validate_params(&self.caps, &spec.aspect_ratio, spec.duration_secs)?;
        if spec.prompt.trim().is_empty() {
            return Err(ProviderError::invalid_parameter("prompt must not be empty"));
        }

        let body = TextGenerateBody {
            prompt: spec.prompt.clone(),
            model: DEFAULT_MODEL,
            aspect_ratio: spec.aspect_ratio.clone(),
            duration: spec.duration_secs,
            quality: DEFAULT_QUALITY,
            motion_mode: DEFAULT_MOTION_MODE,
            water_mark: false,
            sound_effect_switch: spec.with_audio.then_some(true),
        };
        let url = format!("{}/openapi/v2/video/text/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("API-KEY", &self.api_key)
            .header("Ai-trace-id", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;
        let submit: SubmitData = decode_envelope(response).await?;
        let video_id = submit
            .video_id
            .ok_or_else(|| ProviderError::invalid_response("submit response without video_id"))?;
        let id = JobId::new(video_id.into_string());
        debug!(job_id = %id, "pixverse text job submitted");
        Ok(id)
    }

    async fn submit_image(&self, _spec: &ImageJobSpec) -> ProviderResult<JobId> {
        Err(ProviderError::unsupported(
            "pixverse does not accept image-to-video requests",
        ))
    }

    async fn status(&self, id: &JobId) -> ProviderResult<NormalizedResult> {
        let url = format!("{}/openapi/v2/video/result/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("API-KEY", &self.api_key)
            .header("Ai-trace-id", Uuid::new_v4().to_string())
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        let data: StatusData = decode_envelope(response).await?;
        normalize(&data)
    }
}

async fn decode_envelope<T: serde::de::DeserializeOwned>(
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
        return Err(ProviderError::api(status.as_u16(), body));
    }
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| ProviderError::invalid_response(e.to_string()))?;
    if envelope.err_code != 0 {
        return Err(ProviderError::api(envelope.err_code, envelope.err_msg));
    }
    envelope
        .resp
        .ok_or_else(|| ProviderError::invalid_response("envelope without Resp payload"))
}

fn normalize(data: &StatusData) -> ProviderResult<NormalizedResult> {
    match data.status {
        STATUS_SUCCESS => {
            let url = data.url.as_deref().ok_or_else(|| {
                ProviderError::invalid_response("successful video without a URL")
            })?;
            let mut result = NormalizedResult::succeeded(url);
            if let (Some(w), Some(h)) = (data.output_width, data.output_height) {
                result = result.with_dimensions(w, h);
            }
            Ok(result)
        }
        STATUS_GENERATING => Ok(NormalizedResult::running(Progress::at(0.5))),
        STATUS_MODERATION => Err(ProviderError::ModerationRejected(
            "adjust the prompt and try again".to_string(),
        )),
        STATUS_FAILED => Ok(NormalizedResult::failed("Video generation failed")),
        other => {
            warn!(status = other, "unknown pixverse status code, treating as running");
            Ok(NormalizedResult::running(Progress::UNKNOWN))
        }
    }
}

#[derive(Debug, Serialize)]
struct TextGenerateBody {
    prompt: String,
    model: &'static str,
    aspect_ratio: String,
    duration: u32,
    quality: &'static str,
    motion_mode: &'static str,
    water_mark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound_effect_switch: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "ErrCode")]
    err_code: i64,
    #[serde(rename = "ErrMsg", default)]
    err_msg: String,
    #[serde(rename = "Resp")]
    resp: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    video_id: Option<RawVideoId>,
}

/// `video_id` is documented as an integer but observed as a string on
/// some responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVideoId {
    Int(i64),
    Text(String),
}

impl RawVideoId {
    fn into_string(self) -> String {
        match self {
            RawVideoId::Int(v) => v.to_string(),
            RawVideoId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: i64,
    #[serde(default)]
    url: Option<String>,
    #[serde(rename = "outputWidth", default)]
    output_width: Option<u32>,
    #[serde(rename = "outputHeight", default)]
    output_height: Option<u32>,
}
