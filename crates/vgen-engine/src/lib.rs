//! Job tracking and polling orchestration on top of the provider
//! adapters.
//!
//! The [`Dispatcher`] is the single entry point: it routes submissions
//! to the right adapter, records every accepted job in the
//! [`JobRegistry`], and spawns one cancellable polling task per job
//! that drives the job to a terminal state.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod poller;
pub mod registry;

pub use config::{EngineConfig, ProviderSettings};
pub use dispatcher::Dispatcher;
pub use error::{EngineError, EngineResult};
pub use events::JobEvent;
pub use poller::{PollHandle, PollSettings, PollingEngine};
pub use registry::{JobRegistry, TrackedJob};
