//! Engine configuration.

use std::time::Duration;

/// Credentials and endpoint override for one provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// API key; the provider stays unregistered when absent
    pub api_key: Option<String>,
    /// Endpoint override, mainly for tests against a local server
    pub base_url: Option<String>,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub veo: ProviderSettings,
    /// Separate upload endpoint used by Veo image submissions
    pub veo_upload_base_url: Option<String>,
    pub runway: ProviderSettings,
    pub pixverse: ProviderSettings,
    pub vidu: ProviderSettings,
    /// Polling cadence override; per-provider defaults apply when unset
    pub poll_interval: Option<Duration>,
    /// Wall-clock budget for one job, anchored at submission
    pub poll_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            veo: ProviderSettings::default(),
            veo_upload_base_url: None,
            runway: ProviderSettings::default(),
            pixverse: ProviderSettings::default(),
            vidu: ProviderSettings::default(),
            poll_interval: None,
            poll_timeout: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            veo: ProviderSettings {
                api_key: optional_var("VEO_API_KEY"),
                base_url: optional_var("VEO_BASE_URL"),
            },
            veo_upload_base_url: optional_var("VEO_UPLOAD_BASE_URL"),
            runway: ProviderSettings {
                api_key: optional_var("RUNWAY_API_KEY"),
                base_url: optional_var("RUNWAY_BASE_URL"),
            },
            pixverse: ProviderSettings {
                api_key: optional_var("PIXVERSE_API_KEY"),
                base_url: optional_var("PIXVERSE_BASE_URL"),
            },
            vidu: ProviderSettings {
                api_key: optional_var("VIDU_API_KEY"),
                base_url: optional_var("VIDU_BASE_URL"),
            },
            poll_interval: std::env::var("POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            poll_timeout: Duration::from_secs(
                std::env::var("POLL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
