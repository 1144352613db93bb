//! Normalized submission requests handed to the dispatch façade.

use serde::{Deserialize, Serialize};

/// What drives the generation: a text prompt or a source image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Text {
        prompt: String,
    },
    Image {
        /// JPEG-encoded source image
        data: Vec<u8>,
        /// Optional guiding prompt
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
}

/// A provider-agnostic generation request.
///
/// Aspect ratio and duration use each provider's own vocabulary; the
/// capability tables say what a given provider accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub source: GenerationSource,
    pub aspect_ratio: String,
    pub duration_secs: u32,
    /// Generate an audio track where the provider supports it
    #[serde(default)]
    pub with_audio: bool,
}

impl GenerationRequest {
    /// Build a text-to-video request.
    pub fn from_text(
        prompt: impl Into<String>,
        aspect_ratio: impl Into<String>,
        duration_secs: u32,
    ) -> Self {
        Self {
            source: GenerationSource::Text {
                prompt: prompt.into(),
            },
            aspect_ratio: aspect_ratio.into(),
            duration_secs,
            with_audio: false,
        }
    }

    /// Build an image-to-video request.
    pub fn from_image(
        data: Vec<u8>,
        prompt: Option<String>,
        aspect_ratio: impl Into<String>,
        duration_secs: u32,
    ) -> Self {
        Self {
            source: GenerationSource::Image { data, prompt },
            aspect_ratio: aspect_ratio.into(),
            duration_secs,
            with_audio: false,
        }
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.with_audio = enabled;
        self
    }

    /// The prompt text, whichever source carries it.
    pub fn prompt(&self) -> Option<&str> {
        match &self.source {
            GenerationSource::Text { prompt } => Some(prompt),
            GenerationSource::Image { prompt, .. } => prompt.as_deref(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.source, GenerationSource::Image { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request() {
        let req = GenerationRequest::from_text("a red fox", "16:9", 8).with_audio(true);
        assert_eq!(req.prompt(), Some("a red fox"));
        assert!(!req.is_image());
        assert!(req.with_audio);
    }

    #[test]
    fn test_image_request_prompt_is_optional() {
        let req = GenerationRequest::from_image(vec![0xff, 0xd8], None, "1280:720", 10);
        assert!(req.is_image());
        assert_eq!(req.prompt(), None);
    }
}
