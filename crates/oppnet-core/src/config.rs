//! Run-wide simulator configuration.
//!
//! The two trust thresholds are read once before any node exists and are
//! identical for every node in the run. Rather than living in ambient
//! global state, the validated configuration is injected into each node at
//! construction; it is never mutated afterwards.
//!
//! # Example
//!
//! ```
//! use oppnet_core::SimConfig;
//!
//! let config = SimConfig::builder()
//!     .with_ratio_threshold(2.0)
//!     .with_sum_threshold(5.0)
//!     .with_range(20.0)
//!     .build();
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default suspicion ratio threshold.
pub const DEFAULT_RATIO_THRESHOLD: f64 = 1.0;

/// Default minimum observation count before suspicion can trigger.
pub const DEFAULT_SUM_THRESHOLD: f64 = 5.0;

/// Default radio range in meters.
const DEFAULT_TRANSMIT_RANGE: f64 = 10.0;

/// Default radio transmit speed in bytes per second.
const DEFAULT_TRANSMIT_SPEED: u32 = 250_000;

/// Default tick length in seconds.
const DEFAULT_TICK_SECS: f64 = 1.0;

/// Errors produced when validating a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration field holds an invalid value.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// The two suspicion thresholds shared by every node in a run.
///
/// A neighbor is suspected once its forward/receive ratio exceeds
/// `ratio_threshold` while the total number of observations exceeds
/// `sum_threshold`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustThresholds {
    /// Forward/receive ratio above which a neighbor looks anomalous.
    pub ratio_threshold: f64,
    /// Minimum forward + receive total before the ratio is trusted.
    pub sum_threshold: f64,
}

impl Default for TrustThresholds {
    fn default() -> Self {
        Self {
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
            sum_threshold: DEFAULT_SUM_THRESHOLD,
        }
    }
}

/// Radio parameters applied to every network interface.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Transmit range in meters.
    pub range: f64,
    /// Transmit speed in bytes per second.
    pub transmit_speed: u32,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_TRANSMIT_RANGE,
            transmit_speed: DEFAULT_TRANSMIT_SPEED,
        }
    }
}

/// Complete simulator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Suspicion thresholds.
    #[serde(default)]
    pub trust: TrustThresholds,
    /// Radio parameters.
    #[serde(default)]
    pub radio: RadioConfig,
    /// Tick length in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trust: TrustThresholds::default(),
            radio: RadioConfig::default(),
            tick_secs: DEFAULT_TICK_SECS,
        }
    }
}

fn default_tick_secs() -> f64 {
    DEFAULT_TICK_SECS
}

impl SimConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// Returns an error if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.trust.ratio_threshold.is_finite() || self.trust.ratio_threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "trust.ratio_threshold".into(),
                reason: "must be a finite non-negative number".into(),
            });
        }
        if !self.trust.sum_threshold.is_finite() || self.trust.sum_threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "trust.sum_threshold".into(),
                reason: "must be a finite non-negative number".into(),
            });
        }
        if !self.radio.range.is_finite() || self.radio.range <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "radio.range".into(),
                reason: "must be a finite positive number".into(),
            });
        }
        if self.radio.transmit_speed == 0 {
            return Err(ConfigError::InvalidValue {
                field: "radio.transmit_speed".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if !self.tick_secs.is_finite() || self.tick_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_secs".into(),
                reason: "must be a finite positive number".into(),
            });
        }
        Ok(())
    }
}

/// Builder for [`SimConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Create a builder starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the suspicion ratio threshold.
    #[must_use]
    pub fn with_ratio_threshold(mut self, ratio: f64) -> Self {
        self.config.trust.ratio_threshold = ratio;
        self
    }

    /// Set the minimum observation total before suspicion can trigger.
    #[must_use]
    pub fn with_sum_threshold(mut self, sum: f64) -> Self {
        self.config.trust.sum_threshold = sum;
        self
    }

    /// Set the radio range in meters.
    #[must_use]
    pub fn with_range(mut self, range: f64) -> Self {
        self.config.radio.range = range;
        self
    }

    /// Set the radio transmit speed in bytes per second.
    #[must_use]
    pub fn with_transmit_speed(mut self, speed: u32) -> Self {
        self.config.radio.transmit_speed = speed;
        self
    }

    /// Set the tick length in seconds.
    #[must_use]
    pub fn with_tick_secs(mut self, tick_secs: f64) -> Self {
        self.config.tick_secs = tick_secs;
        self
    }

    /// Finish building. Call [`SimConfig::validate`] before use.
    #[must_use]
    pub fn build(self) -> SimConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_sets_thresholds() {
        let config = SimConfig::builder()
            .with_ratio_threshold(2.0)
            .with_sum_threshold(5.0)
            .build();
        assert_eq!(config.trust.ratio_threshold, 2.0);
        assert_eq!(config.trust.sum_threshold, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_negative_ratio_threshold() {
        let config = SimConfig::builder().with_ratio_threshold(-1.0).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "trust.ratio_threshold"
        ));
    }

    #[test]
    fn rejects_nan_sum_threshold() {
        let config = SimConfig::builder().with_sum_threshold(f64::NAN).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_range_and_speed() {
        assert!(SimConfig::builder().with_range(0.0).build().validate().is_err());
        assert!(SimConfig::builder()
            .with_transmit_speed(0)
            .build()
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_non_positive_tick() {
        assert!(SimConfig::builder().with_tick_secs(0.0).build().validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let config = SimConfig::builder().with_ratio_threshold(3.5).build();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.trust.ratio_threshold, 3.5);
        assert_eq!(back.tick_secs, config.tick_secs);
    }
}
