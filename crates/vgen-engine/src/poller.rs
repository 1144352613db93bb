//! Per-job polling loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vgen_models::{Job, JobId, NormalizedResult, Provider};
use vgen_providers::ProviderAdapter;

use crate::events::JobEvent;
use crate::registry::JobRegistry;

/// Default wall-clock budget for one job.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Polling cadence and budget for one job.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    /// Cadence tuned per provider; slower providers are polled less
    /// often.
    pub fn for_provider(provider: Provider) -> Self {
        let interval = match provider {
            Provider::Veo => Duration::from_secs(2),
            Provider::Runway => Duration::from_secs(5),
            Provider::Pixverse | Provider::Vidu => Duration::from_secs(3),
        };
        Self {
            interval,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Control handle for one polling task.
///
/// Dropping the handle cancels the task.
pub struct PollHandle {
    job_id: JobId,
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Request cancellation. The loop observes the flag within one
    /// tick; an in-between sleep is woken immediately.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Wait for the polling task to finish.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(JoinHandle::is_finished).unwrap_or(true)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

/// Spawns one polling task per tracked job.
pub struct PollingEngine {
    registry: Arc<JobRegistry>,
    events: mpsc::UnboundedSender<JobEvent>,
}

impl PollingEngine {
    pub fn new(registry: Arc<JobRegistry>, events: mpsc::UnboundedSender<JobEvent>) -> Self {
        Self { registry, events }
    }

    /// Spawn the polling loop for a tracked job. `submitted_at`
    /// anchors the wall-clock budget; starting the loop late does not
    /// stretch it.
    pub fn spawn(
        &self,
        adapter: Arc<dyn ProviderAdapter>,
        job: Job,
        submitted_at: Instant,
        settings: PollSettings,
    ) -> PollHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let job_id = job.id.clone();
        let task = tokio::spawn(poll_loop(
            adapter,
            self.registry.clone(),
            self.events.clone(),
            job,
            submitted_at,
            settings,
            cancelled.clone(),
            wake.clone(),
        ));
        PollHandle {
            job_id,
            cancelled,
            wake,
            task: Some(task),
        }
    }
}

/// Drive one job to a terminal state.
///
/// The first status check happens immediately. Transient network
/// errors are retried on the normal cadence without touching the
/// timeout budget; any other error terminates the job as failed. The
/// budget is anchored at submission and checked at the top of every
/// tick, so a string of transient errors still times out on schedule.
async fn poll_loop(
    adapter: Arc<dyn ProviderAdapter>,
    registry: Arc<JobRegistry>,
    events: mpsc::UnboundedSender<JobEvent>,
    job: Job,
    submitted_at: Instant,
    settings: PollSettings,
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
) {
    let deadline = submitted_at + settings.timeout;

    loop {
        if cancelled.load(Ordering::SeqCst) {
            // Best-effort remote cancel; most providers have no endpoint.
            if let Err(e) = adapter.cancel(&job.id).await {
                warn!(job_id = %job.id, error = %e, "remote cancel failed");
            }
            finish(&registry, &events, &job.id, NormalizedResult::cancelled());
            return;
        }

        if Instant::now() >= deadline {
            info!(job_id = %job.id, "polling budget exhausted");
            finish(
                &registry,
                &events,
                &job.id,
                NormalizedResult::timed_out(settings.timeout.as_secs()),
            );
            return;
        }

        match adapter.status(&job.id).await {
            Ok(observed) => {
                let merged = registry.update(&job.id, &observed).unwrap_or(observed);
                if merged.is_terminal() {
                    let _ = events.send(JobEvent::Terminal {
                        job_id: job.id.clone(),
                        result: merged,
                    });
                    return;
                }
                debug!(job_id = %job.id, state = %merged.state, "job still in flight");
                let _ = events.send(JobEvent::Progress {
                    job_id: job.id.clone(),
                    state: merged.state,
                    progress: merged.progress,
                });
            }
            Err(e) if e.is_transient() => {
                warn!(job_id = %job.id, error = %e, "transient poll error, retrying");
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "poll failed terminally");
                finish(
                    &registry,
                    &events,
                    &job.id,
                    NormalizedResult::failed(e.to_string()),
                );
                return;
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        let wait = settings.interval.min(remaining);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = wake.notified() => {}
        }
    }
}

/// Record a terminal result and publish the single terminal event.
fn finish(
    registry: &JobRegistry,
    events: &mpsc::UnboundedSender<JobEvent>,
    id: &JobId,
    result: NormalizedResult,
) {
    let recorded = registry.update(id, &result).unwrap_or(result);
    let _ = events.send(JobEvent::Terminal {
        job_id: id.clone(),
        result: recorded,
    });
}
