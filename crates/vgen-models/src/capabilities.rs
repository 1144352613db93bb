//! Per-provider capability tables.
//!
//! These tables let calling code build valid requests without embedding
//! per-provider knowledge, and let adapters reject bad parameters
//! before anything touches the network.

use serde::Serialize;

use crate::Provider;

/// What a provider supports through this layer.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub provider: Provider,
    pub supports_text: bool,
    pub supports_image: bool,
    /// Aspect ratios in the provider's own vocabulary
    pub aspect_ratios: &'static [&'static str],
    /// Supported clip durations in seconds
    pub durations: &'static [u32],
}

impl Capabilities {
    /// The capability table for a provider.
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Veo => Self {
                provider,
                supports_text: true,
                supports_image: true,
                aspect_ratios: &["16:9", "1:1", "9:16", "4:3", "3:4"],
                durations: &[8],
            },
            // Runway is routed image-to-video only; its ratios are
            // pixel pairs rather than w:h ratios.
            Provider::Runway => Self {
                provider,
                supports_text: false,
                supports_image: true,
                aspect_ratios: &[
                    "1280:720", "720:1280", "1104:832", "832:1104", "960:960", "1584:672",
                    "1280:768", "768:1280",
                ],
                durations: &[5, 10],
            },
            Provider::Pixverse => Self {
                provider,
                supports_text: true,
                supports_image: false,
                aspect_ratios: &["16:9", "4:3", "1:1", "3:4", "9:16"],
                durations: &[5, 8],
            },
            Provider::Vidu => Self {
                provider,
                supports_text: true,
                supports_image: false,
                aspect_ratios: &["16:9", "9:16", "1:1"],
                durations: &[4, 5, 8],
            },
        }
    }

    pub fn supports_aspect_ratio(&self, ratio: &str) -> bool {
        self.aspect_ratios.contains(&ratio)
    }

    pub fn supports_duration(&self, duration_secs: u32) -> bool {
        self.durations.contains(&duration_secs)
    }
}
