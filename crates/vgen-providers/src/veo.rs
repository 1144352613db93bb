//! Veo adapter, reached through the Pollo platform proxy.
//!
//! Text submissions go straight to the generation endpoint. Image
//! submissions first push the JPEG through the platform's multipart
//! file upload and reference the resulting download URL.

use async_trait::async_trait;
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vgen_models::{Capabilities, JobId, NormalizedResult, Progress, Provider};

use crate::adapter::{
    build_client, normalize_base_url, require_api_key, validate_params, ImageJobSpec,
    ProviderAdapter, TextJobSpec,
};
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://pollo.ai/api/platform";
const DEFAULT_UPLOAD_BASE_URL: &str =
    "https://ai-assistant-backend-164860087792.europe-west1.run.app";
const DEFAULT_RESOLUTION: &str = "1080p";
const DEFAULT_IMAGE_PROMPT: &str = "Create a dynamic video from this image";

/// Veo API client.
pub struct VeoAdapter {
    api_key: String,
    base_url: String,
    upload_base_url: String,
    client: reqwest::Client,
    caps: Capabilities,
}

impl VeoAdapter {
    /// Create a new Veo adapter with the given platform API key.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        require_api_key(&api_key, Provider::Veo)?;
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            client: build_client()?,
            caps: Capabilities::for_provider(Provider::Veo),
        })
    }

    /// Override the platform base URL (tests point this at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    /// Override the file-upload base URL.
    pub fn with_upload_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.upload_base_url = normalize_base_url(base_url);
        self
    }

    async fn submit_generation<T: Serialize + Sync>(
        &self,
        body: &GenerationBody<T>,
    ) -> ProviderResult<JobId> {
        let url = format!("{}/generation/google/veo3-fast", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let submit: SubmitResponse = decode_response(response).await?;
        Ok(JobId::new(submit.data.task_id))
    }

    /// Upload a JPEG and return the download URL the generation
    /// endpoint accepts as its `image` input.
    async fn upload_image(&self, image: &[u8]) -> ProviderResult<String> {
        let url = format!("{}/api/file/upload-file", self.upload_base_url);
        let part = multipart::Part::bytes(image.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = decode_response(response).await?;
        Ok(format!(
            "{}/api/file/get-file?fileName={}",
            self.upload_base_url, upload.file_name
        ))
    }
}

#[async_trait]
impl ProviderAdapter for VeoAdapter {
    fn provider(&self) -> Provider {
        Provider::Veo
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn submit_text(&self, spec: &TextJobSpec) -> ProviderResult<JobId> {
        validate_params(&self.caps, &spec.aspect_ratio, spec.duration_secs)?;
        if spec.prompt.trim().is_empty() {
            return Err(ProviderError::invalid_parameter("prompt must not be empty"));
        }

        let body = GenerationBody {
            input: TextInput {
                prompt: spec.prompt.clone(),
                length: spec.duration_secs,
                aspect_ratio: spec.aspect_ratio.clone(),
                resolution: DEFAULT_RESOLUTION,
                generate_audio: spec.with_audio,
            },
            webhook_url: None,
        };
        let id = self.submit_generation(&body).await?;
        debug!(job_id = %id, "veo text job submitted");
        Ok(id)
    }

    async fn submit_image(&self, spec: &ImageJobSpec) -> ProviderResult<JobId> {
        validate_params(&self.caps, &spec.aspect_ratio, spec.duration_secs)?;
        if spec.image.is_empty() {
            return Err(ProviderError::invalid_parameter(
                "image data must not be empty",
            ));
        }

        let image_url = self.upload_image(&spec.image).await?;
        let prompt = spec
            .prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string());

        let body = GenerationBody {
            input: ImageInput {
                image: image_url,
                prompt,
                length: spec.duration_secs,
                aspect_ratio: spec.aspect_ratio.clone(),
                resolution: DEFAULT_RESOLUTION,
                generate_audio: spec.with_audio,
            },
            webhook_url: None,
        };
        let id = self.submit_generation(&body).await?;
        debug!(job_id = %id, "veo image job submitted");
        Ok(id)
    }

    async fn status(&self, id: &JobId) -> ProviderResult<NormalizedResult> {
        let url = format!("{}/generation/{}/status", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        let status: StatusResponse = decode_response(response).await?;
        normalize(&status.data)
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
        return Err(ProviderError::api(status.as_u16(), body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::invalid_response(e.to_string()))
}

/// Map a raw platform task status onto the canonical state machine.
///
/// Only the first generation is authoritative. An empty `generations`
/// array means the provider has not allocated a generation record yet;
/// that reports as pending with unknown progress, not as an error.
fn normalize(data: &StatusData) -> ProviderResult<NormalizedResult> {
    let Some(generation) = data.generations.first() else {
        return Ok(NormalizedResult::pending(Progress::UNKNOWN));
    };
    match generation.status.as_str() {
        "waiting" => Ok(NormalizedResult::pending(Progress::at(0.1))),
        "processing" => Ok(NormalizedResult::running(Progress::at(0.5))),
        "succeed" => match generation.url.as_deref() {
            Some(url) => Ok(NormalizedResult::succeeded(url)),
            None => Err(ProviderError::invalid_response(
                "succeeded generation without a media URL",
            )),
        },
        "failed" => {
            let message = generation
                .fail_msg
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Video generation failed".to_string());
            Ok(NormalizedResult::failed(message))
        }
        other => {
            warn!(status = other, "unknown veo generation status, treating as running");
            Ok(NormalizedResult::running(Progress::UNKNOWN))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationBody<T> {
    input: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput {
    prompt: String,
    length: u32,
    aspect_ratio: String,
    resolution: &'static str,
    generate_audio: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageInput {
    image: String,
    prompt: String,
    length: u32,
    aspect_ratio: String,
    resolution: &'static str,
    generate_audio: bool,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    data: SubmitData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitData {
    task_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    data: StatusData,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Generation {
    status: String,
    #[serde(default)]
    fail_msg: Option<String>,
    #[serde(default)]
    url: Option<String>,
}
