//! Observer tuning knobs.

use attrwatch_core::weak_map::DEFAULT_SWEEP_THRESHOLD;

use crate::error::ConfigError;

/// Configuration for a [`ValueListObserver`](crate::ValueListObserver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Insertions between sweeps of entries whose token or element has been
    /// dropped.
    pub sweep_threshold: usize,
    /// Emit a `value.parse_failed` event when a token fails to parse. Only
    /// has an effect with the `tracing` feature.
    pub log_parse_failures: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            log_parse_failures: true,
        }
    }
}

impl ObserverConfig {
    #[must_use]
    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_log_parse_failures(mut self, enabled: bool) -> Self {
        self.log_parse_failures = enabled;
        self
    }

    /// # Errors
    ///
    /// [`ConfigError::ZeroSweepThreshold`] when `sweep_threshold` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_threshold == 0 {
            return Err(ConfigError::ZeroSweepThreshold);
        }
        Ok(())
    }
}
