//! Provider adapters for video-generation APIs.
//!
//! Each supported provider gets one adapter module holding its raw wire
//! types, request construction, and a pure status normalizer. Raw
//! provider vocabularies never leave their module; everything crossing
//! the crate boundary speaks `vgen_models` types.

pub mod adapter;
pub mod error;
pub mod pixverse;
pub mod runway;
pub mod veo;
pub mod vidu;

pub use adapter::{ImageJobSpec, ProviderAdapter, TextJobSpec};
pub use error::{ProviderError, ProviderResult};
pub use pixverse::PixverseAdapter;
pub use runway::RunwayAdapter;
pub use veo::VeoAdapter;
pub use vidu::ViduAdapter;
