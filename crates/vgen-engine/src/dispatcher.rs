//! Provider-agnostic dispatch façade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use vgen_models::{Capabilities, GenerationRequest, GenerationSource, Job, JobId, NormalizedResult, Provider};
use vgen_providers::{
    ImageJobSpec, PixverseAdapter, ProviderAdapter, RunwayAdapter, TextJobSpec, VeoAdapter,
    ViduAdapter,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::JobEvent;
use crate::poller::{PollSettings, PollingEngine, PollHandle, DEFAULT_TIMEOUT};
use crate::registry::{JobRegistry, TrackedJob};

/// Routes requests to provider adapters and owns the polling tasks.
///
/// One poll handle is kept per active job; the handle is dropped when
/// the job is cancelled or removed, which stops its loop.
pub struct Dispatcher {
    adapters: HashMap<Provider, Arc<dyn ProviderAdapter>>,
    registry: Arc<JobRegistry>,
    engine: PollingEngine,
    handles: Mutex<HashMap<JobId, PollHandle>>,
    timeout: Duration,
    interval_override: Option<Duration>,
}

impl Dispatcher {
    /// Create an empty dispatcher and the receiving end of its event
    /// channel. Adapters are registered separately.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Arc::new(JobRegistry::new());
        let dispatcher = Self {
            adapters: HashMap::new(),
            engine: PollingEngine::new(registry.clone(), tx),
            registry,
            handles: Mutex::new(HashMap::new()),
            timeout: DEFAULT_TIMEOUT,
            interval_override: None,
        };
        (dispatcher, rx)
    }

    /// Build a dispatcher with one adapter per configured provider.
    pub fn from_config(config: &EngineConfig) -> EngineResult<(Self, mpsc::UnboundedReceiver<JobEvent>)> {
        let (mut dispatcher, rx) = Self::new();
        dispatcher.timeout = config.poll_timeout;
        dispatcher.interval_override = config.poll_interval;

        if let Some(key) = &config.veo.api_key {
            let mut adapter = VeoAdapter::new(key)?;
            if let Some(url) = &config.veo.base_url {
                adapter = adapter.with_base_url(url);
            }
            if let Some(url) = &config.veo_upload_base_url {
                adapter = adapter.with_upload_base_url(url);
            }
            dispatcher.register_adapter(Arc::new(adapter));
        }
        if let Some(key) = &config.runway.api_key {
            let mut adapter = RunwayAdapter::new(key)?;
            if let Some(url) = &config.runway.base_url {
                adapter = adapter.with_base_url(url);
            }
            dispatcher.register_adapter(Arc::new(adapter));
        }
        if let Some(key) = &config.pixverse.api_key {
            let mut adapter = PixverseAdapter::new(key)?;
            if let Some(url) = &config.pixverse.base_url {
                adapter = adapter.with_base_url(url);
            }
            dispatcher.register_adapter(Arc::new(adapter));
        }
        if let Some(key) = &config.vidu.api_key {
            let mut adapter = ViduAdapter::new(key)?;
            if let Some(url) = &config.vidu.base_url {
                adapter = adapter.with_base_url(url);
            }
            dispatcher.register_adapter(Arc::new(adapter));
        }

        if dispatcher.adapters.is_empty() {
            return Err(EngineError::Config(
                "no provider API keys configured".to_string(),
            ));
        }
        Ok((dispatcher, rx))
    }

    pub fn register_adapter(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    /// Replace every provider's default polling cadence.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.interval_override = Some(interval);
    }

    pub fn registry(&self) -> Arc<JobRegistry> {
        self.registry.clone()
    }

    /// Providers with a registered adapter.
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self.adapters.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    pub fn capabilities(&self, provider: Provider) -> EngineResult<&Capabilities> {
        Ok(self.adapter(provider)?.capabilities())
    }

    fn adapter(&self, provider: Provider) -> EngineResult<&Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(&provider)
            .ok_or(EngineError::UnknownProvider(provider))
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, PollHandle>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Submit a generation request and start tracking the accepted
    /// job. Polling starts separately via [`Dispatcher::poll`];
    /// callers that prefer manual cadence use
    /// [`Dispatcher::check_once`] instead.
    ///
    /// Validation failures and unsupported routings come back as
    /// errors before anything is tracked.
    pub async fn submit(
        &self,
        provider: Provider,
        request: &GenerationRequest,
    ) -> EngineResult<JobId> {
        let adapter = self.adapter(provider)?;

        let (id, prompt, image_ref) = match &request.source {
            GenerationSource::Text { prompt } => {
                let spec = TextJobSpec {
                    prompt: prompt.clone(),
                    aspect_ratio: request.aspect_ratio.clone(),
                    duration_secs: request.duration_secs,
                    with_audio: request.with_audio,
                };
                let id = adapter.submit_text(&spec).await?;
                (id, Some(prompt.clone()), None)
            }
            GenerationSource::Image { data, prompt } => {
                let spec = ImageJobSpec {
                    image: data.clone(),
                    prompt: prompt.clone(),
                    aspect_ratio: request.aspect_ratio.clone(),
                    duration_secs: request.duration_secs,
                    with_audio: request.with_audio,
                };
                let id = adapter.submit_image(&spec).await?;
                let image_ref = format!("inline jpeg ({} bytes)", data.len());
                (id, prompt.clone(), Some(image_ref))
            }
        };

        let job = Job::new(id.clone(), provider, prompt, image_ref);
        self.registry.insert(job);
        info!(job_id = %id, %provider, "job submitted");
        Ok(id)
    }

    /// Hand a tracked job to the polling engine, which drives it to a
    /// terminal state and publishes events on the dispatcher channel.
    ///
    /// Idempotent: a job whose loop is still running is left alone.
    pub fn poll(&self, id: &JobId) -> EngineResult<()> {
        let tracked = self
            .registry
            .get(id)
            .ok_or_else(|| EngineError::UnknownJob(id.clone()))?;
        let adapter = self.adapter(tracked.job.provider)?.clone();
        if tracked.latest.is_terminal() {
            return Ok(());
        }

        let mut handles = self.lock_handles();
        if handles.get(id).map(|h| !h.is_finished()).unwrap_or(false) {
            return Ok(());
        }
        let mut settings =
            PollSettings::for_provider(tracked.job.provider).with_timeout(self.timeout);
        if let Some(interval) = self.interval_override {
            settings = settings.with_interval(interval);
        }
        let handle = self
            .engine
            .spawn(adapter, tracked.job, tracked.submitted_at, settings);
        handles.insert(id.clone(), handle);
        info!(job_id = %id, "polling started");
        Ok(())
    }

    /// One on-demand status check, bypassing the polling cadence. The
    /// observation goes through the registry merge like any other.
    pub async fn check_once(&self, id: &JobId) -> EngineResult<NormalizedResult> {
        let tracked = self
            .registry
            .get(id)
            .ok_or_else(|| EngineError::UnknownJob(id.clone()))?;
        let adapter = self.adapter(tracked.job.provider)?;
        let observed = adapter.status(id).await?;
        Ok(self.registry.update(id, &observed).unwrap_or(observed))
    }

    /// Cancel a tracked job and wait for its loop to wind down.
    pub async fn cancel(&self, id: &JobId) -> EngineResult<()> {
        if self.registry.get(id).is_none() {
            return Err(EngineError::UnknownJob(id.clone()));
        }
        let handle = self.lock_handles().remove(id);
        match handle {
            Some(handle) => {
                handle.cancel();
                handle.join().await;
            }
            None => {
                // Loop already gone; mark cancelled unless the job is
                // terminal, in which case the recorded result sticks.
                self.registry.update(id, &NormalizedResult::cancelled());
            }
        }
        info!(job_id = %id, "job cancelled");
        Ok(())
    }

    /// Latest tracked snapshot for a job, if known.
    pub fn status_of(&self, id: &JobId) -> Option<TrackedJob> {
        self.registry.get(id)
    }

    /// Stop tracking a job. Any still-running loop is cancelled by
    /// dropping its handle.
    pub fn remove(&self, id: &JobId) -> EngineResult<TrackedJob> {
        self.lock_handles().remove(id);
        self.registry
            .remove(id)
            .ok_or_else(|| EngineError::UnknownJob(id.clone()))
    }
}
