//! In-memory job registry.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::time::Instant;

use vgen_models::{Job, JobId, NormalizedResult, Progress};

/// A job together with the most recent normalized observation.
#[derive(Debug, Clone)]
pub struct TrackedJob {
    pub job: Job,
    pub latest: NormalizedResult,
    /// Monotonic submission instant; anchors the polling budget
    pub submitted_at: Instant,
}

/// Shared map of every job the engine currently tracks.
///
/// All access goes through one mutex; the critical sections are tiny
/// and no lock is ever held across an await point. Entries stay until
/// the caller removes them, so terminal results remain queryable.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, TrackedJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, TrackedJob>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start tracking a freshly submitted job.
    pub fn insert(&self, job: Job) {
        let tracked = TrackedJob {
            latest: NormalizedResult::pending(Progress::UNKNOWN),
            submitted_at: Instant::now(),
            job,
        };
        self.lock().insert(tracked.job.id.clone(), tracked);
    }

    /// Merge a new observation into the tracked job and return the
    /// merged snapshot.
    ///
    /// Progress never moves backwards: a lower or unknown reading
    /// keeps the previous value. Once a terminal result is recorded
    /// it is sticky and later observations are ignored.
    pub fn update(&self, id: &JobId, observed: &NormalizedResult) -> Option<NormalizedResult> {
        let mut jobs = self.lock();
        let tracked = jobs.get_mut(id)?;
        if tracked.latest.is_terminal() {
            return Some(tracked.latest.clone());
        }
        let mut merged = observed.clone();
        if !merged.is_terminal() {
            merged.progress = merged.progress.advanced_from(tracked.latest.progress);
        }
        tracked.latest = merged.clone();
        Some(merged)
    }

    pub fn get(&self, id: &JobId) -> Option<TrackedJob> {
        self.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &JobId) -> Option<TrackedJob> {
        self.lock().remove(id)
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
