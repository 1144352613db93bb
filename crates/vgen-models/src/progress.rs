//! Best-effort progress readings.
//!
//! Providers report discrete phases rather than true percentages, so a
//! progress value is only ever an estimate. Within one job the reading
//! is monotonic non-decreasing; `1.0` is reserved for succeeded jobs.

use serde::{Deserialize, Serialize};

/// A completion reading in `[0.0, 1.0]`, or unknown when no reading
/// has been taken yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(Option<f64>);

impl Progress {
    /// No reading yet.
    pub const UNKNOWN: Progress = Progress(None);

    /// The reading reserved for succeeded jobs.
    pub const COMPLETE: Progress = Progress(Some(1.0));

    /// A known reading, clamped into `[0.0, 1.0]`.
    pub fn at(value: f64) -> Self {
        Self(Some(value.clamp(0.0, 1.0)))
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.0 == Some(1.0)
    }

    /// Cap a reading strictly below complete.
    ///
    /// Used for non-terminal ticks: a job that is still running must
    /// never report `1.0`, whatever the provider claims.
    pub fn capped(self) -> Self {
        match self.0 {
            Some(v) if v >= 1.0 => Self(Some(0.99)),
            _ => self,
        }
    }

    /// Monotonic merge: a newer reading never moves backwards, and an
    /// unknown reading never erases a known one.
    pub fn advanced_from(self, prev: Progress) -> Progress {
        match (prev.0, self.0) {
            (Some(p), Some(n)) if n < p => prev,
            (Some(_), None) => prev,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        assert_eq!(Progress::at(1.7), Progress::COMPLETE);
        assert_eq!(Progress::at(-0.3).value(), Some(0.0));
        assert_eq!(Progress::at(0.5).value(), Some(0.5));
    }

    #[test]
    fn test_monotonic_merge() {
        let earlier = Progress::at(0.5);
        assert_eq!(Progress::at(0.3).advanced_from(earlier), earlier);
        assert_eq!(Progress::at(0.8).advanced_from(earlier), Progress::at(0.8));
        assert_eq!(Progress::UNKNOWN.advanced_from(earlier), earlier);
        assert_eq!(
            Progress::at(0.2).advanced_from(Progress::UNKNOWN),
            Progress::at(0.2)
        );
    }

    #[test]
    fn test_capped_never_reports_complete() {
        assert!(!Progress::at(1.0).capped().is_complete());
        assert_eq!(Progress::at(0.4).capped(), Progress::at(0.4));
        assert_eq!(Progress::UNKNOWN.capped(), Progress::UNKNOWN);
    }

    #[test]
    fn test_serde_transparent() {
        assert_eq!(serde_json::to_string(&Progress::at(0.25)).unwrap(), "0.25");
        assert_eq!(serde_json::to_string(&Progress::UNKNOWN).unwrap(), "null");
    }
}
