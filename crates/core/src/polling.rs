//! Polling policy for waiting on remote generation jobs.
//!
//! The interval starts at [`PollConfig::interval`] and grows by
//! [`PollConfig::multiplier`] after every pending observation, clamped to
//! [`PollConfig::max_interval`]. A multiplier of `1.0` gives a fixed
//! interval; a `max_wait` of `None` waits forever.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Base interval for video jobs.
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// Base interval for image jobs.
pub const IMAGE_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default ceiling on the backoff interval.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);
/// Default backoff growth factor.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
/// Default maximum wait for a video job.
pub const VIDEO_MAX_WAIT: Duration = Duration::from_secs(30 * 60);
/// Default maximum wait for an image job.
pub const IMAGE_MAX_WAIT: Duration = Duration::from_secs(10 * 60);
/// Consecutive transient status-query failures tolerated before giving up.
pub const DEFAULT_MAX_TRANSIENT_ERRORS: u32 = 3;

/// Tunable parameters for the status polling loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay after the first pending observation; the floor for every delay.
    pub interval: Duration,
    /// Upper bound on the delay between status queries.
    pub max_interval: Duration,
    /// Factor by which the delay grows after each pending observation.
    pub multiplier: f64,
    /// Give up once this much time has been spent waiting. `None` never
    /// gives up.
    pub max_wait: Option<Duration>,
    /// Consecutive transient query failures tolerated before the error is
    /// surfaced.
    pub max_transient_errors: u32,
}

impl PollConfig {
    /// Preset for video jobs.
    pub fn video() -> Self {
        Self {
            interval: VIDEO_POLL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            multiplier: DEFAULT_MULTIPLIER,
            max_wait: Some(VIDEO_MAX_WAIT),
            max_transient_errors: DEFAULT_MAX_TRANSIENT_ERRORS,
        }
    }

    /// Preset for image jobs.
    pub fn image() -> Self {
        Self {
            interval: IMAGE_POLL_INTERVAL,
            max_wait: Some(IMAGE_MAX_WAIT),
            ..Self::video()
        }
    }

    /// Fixed interval, no bound, no retries.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max_interval: interval,
            multiplier: 1.0,
            max_wait: None,
            max_transient_errors: 0,
        }
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interval.is_zero() {
            return Err(CoreError::Validation(
                "Poll interval must be greater than zero".to_string(),
            ));
        }
        if self.max_interval < self.interval {
            return Err(CoreError::Validation(format!(
                "Max poll interval ({:?}) must not be below the poll interval ({:?})",
                self.max_interval, self.interval
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(CoreError::Validation(format!(
                "Poll multiplier must be at least 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::video()
    }
}

/// Calculate the next delay from the current one.
///
/// The result never drops below [`PollConfig::interval`] and is clamped to
/// [`PollConfig::max_interval`].
pub fn next_delay(current: Duration, config: &PollConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms)
        .min(config.max_interval)
        .max(config.interval)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
