//! The normalized per-tick result shape.

use serde::{Deserialize, Serialize};

use crate::{JobState, Progress};

/// Output frame size reported by a provider, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Snapshot of a job produced once per poll tick. Immutable.
///
/// Invariant: `progress` is `1.0` if and only if `state` is
/// `Succeeded`; the constructors below are the only way these are
/// built, and they enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Canonical state
    pub state: JobState,

    /// Best-effort completion reading
    pub progress: Progress,

    /// URL of the generated media, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Human-readable failure message, present on terminal failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Output dimensions, when the provider reports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

impl NormalizedResult {
    /// Job submitted but not yet picked up by the provider.
    pub fn pending(progress: Progress) -> Self {
        Self {
            state: JobState::Pending,
            progress: progress.capped(),
            media_url: None,
            error_message: None,
            dimensions: None,
        }
    }

    /// Job actively generating.
    pub fn running(progress: Progress) -> Self {
        Self {
            state: JobState::Running,
            progress: progress.capped(),
            media_url: None,
            error_message: None,
            dimensions: None,
        }
    }

    /// Generation finished with a media URL.
    pub fn succeeded(media_url: impl Into<String>) -> Self {
        Self {
            state: JobState::Succeeded,
            progress: Progress::COMPLETE,
            media_url: Some(media_url.into()),
            error_message: None,
            dimensions: None,
        }
    }

    /// Generation failed on the provider side.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: JobState::Failed,
            progress: Progress::UNKNOWN,
            media_url: None,
            error_message: Some(message.into()),
            dimensions: None,
        }
    }

    /// Cancelled by the caller.
    pub fn cancelled() -> Self {
        Self {
            state: JobState::Cancelled,
            progress: Progress::UNKNOWN,
            media_url: None,
            error_message: None,
            dimensions: None,
        }
    }

    /// Wall-clock polling budget exhausted.
    pub fn timed_out(budget_secs: u64) -> Self {
        Self {
            state: JobState::TimedOut,
            progress: Progress::UNKNOWN,
            media_url: None,
            error_message: Some(format!(
                "Generation did not finish within {budget_secs}s"
            )),
            dimensions: None,
        }
    }

    /// Attach output dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(Dimensions { width, height });
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_progress_only_on_success() {
        assert!(NormalizedResult::succeeded("https://cdn/video.mp4")
            .progress
            .is_complete());
        assert!(!NormalizedResult::running(Progress::at(1.0))
            .progress
            .is_complete());
        assert!(!NormalizedResult::failed("boom").progress.is_complete());
        assert!(!NormalizedResult::timed_out(300).progress.is_complete());
    }

    #[test]
    fn test_terminal_results() {
        assert!(NormalizedResult::succeeded("u").is_terminal());
        assert!(NormalizedResult::cancelled().is_terminal());
        assert!(!NormalizedResult::pending(Progress::UNKNOWN).is_terminal());
    }

    #[test]
    fn test_dimensions_attach() {
        let result = NormalizedResult::succeeded("u").with_dimensions(1280, 720);
        assert_eq!(
            result.dimensions,
            Some(Dimensions {
                width: 1280,
                height: 720
            })
        );
    }
}
