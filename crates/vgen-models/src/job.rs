//! Job identity, provider selection, and the canonical state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-assigned job identifier, normalized to a string.
///
/// Providers variously hand back integers, numeric strings, or opaque
/// strings; adapters fold all of them into this one type at the wire
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video-generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Google Veo, reached through the Pollo platform proxy
    Veo,
    /// Runway (image-to-video only)
    Runway,
    /// PixVerse
    Pixverse,
    /// Vidu
    Vidu,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Veo,
        Provider::Runway,
        Provider::Pixverse,
        Provider::Vidu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Veo => "veo",
            Provider::Runway => "runway",
            Provider::Pixverse => "pixverse",
            Provider::Vidu => "vidu",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical job state every provider vocabulary is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Submitted but not yet picked up by the provider
    #[default]
    Pending,
    /// Provider is actively generating
    Running,
    /// Generation finished and a media URL is available
    Succeeded,
    /// Generation failed on the provider side
    Failed,
    /// Cancelled by the caller
    Cancelled,
    /// Wall-clock polling budget exhausted
    TimedOut,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
            JobState::TimedOut => "timed_out",
        }
    }

    /// Check if this is a terminal state (no further transitions, polling stops).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled | JobState::TimedOut
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tracked provider-side generation request.
///
/// Immutable after creation; owned by the job registry for its lifetime
/// and referenced by id everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Provider-assigned job id
    pub id: JobId,

    /// Which provider is generating this job
    pub provider: Provider,

    /// Prompt text submitted with the job, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Reference to the submitted source image (upload URL or file name), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    /// Submission timestamp; anchors the polling timeout budget
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job record at submission time.
    pub fn new(
        id: JobId,
        provider: Provider,
        prompt: Option<String>,
        image_ref: Option<String>,
    ) -> Self {
        Self {
            id,
            provider,
            prompt,
            image_ref,
            created_at: Utc::now(),
        }
    }
}
