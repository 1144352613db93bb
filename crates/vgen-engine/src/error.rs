//! Engine error type.

use thiserror::Error;

use vgen_models::{JobId, Provider};
use vgen_providers::ProviderError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No adapter was registered for the requested provider
    #[error("no adapter registered for provider {0}")]
    UnknownProvider(Provider),

    /// The registry does not track this job
    #[error("job {0} is not tracked")]
    UnknownJob(JobId),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),
}
