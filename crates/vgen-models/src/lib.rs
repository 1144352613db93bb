//! Shared data models for the VGen orchestration layer.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, providers, and the canonical job state machine
//! - Best-effort progress readings
//! - Normalized per-tick results
//! - Submission requests and per-provider capability tables

pub mod capabilities;
pub mod job;
pub mod progress;
pub mod request;
pub mod result;

// Re-export common types
pub use capabilities::Capabilities;
pub use job::{Job, JobId, JobState, Provider};
pub use progress::Progress;
pub use request::{GenerationRequest, GenerationSource};
pub use result::{Dimensions, NormalizedResult};
