//! Events published by the polling loops.

use serde::Serialize;

use vgen_models::{JobId, JobState, NormalizedResult, Progress};

/// A job observation, pushed to the dispatcher's event channel.
///
/// Each polling loop publishes zero or more `Progress` events followed
/// by exactly one `Terminal` event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    Progress {
        job_id: JobId,
        state: JobState,
        progress: Progress,
    },
    Terminal {
        job_id: JobId,
        result: NormalizedResult,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::Progress { job_id, .. } | JobEvent::Terminal { job_id, .. } => job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Terminal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let progress = JobEvent::Progress {
            job_id: JobId::new("j-1"),
            state: JobState::Running,
            progress: Progress::at(0.3),
        };
        assert_eq!(progress.job_id().as_str(), "j-1");
        assert!(!progress.is_terminal());

        let terminal = JobEvent::Terminal {
            job_id: JobId::new("j-1"),
            result: NormalizedResult::cancelled(),
        };
        assert!(terminal.is_terminal());
    }
}
