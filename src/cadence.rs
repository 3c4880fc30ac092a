//! Mapping from a light reading to the indicator blink cadence.

use crate::Reading;
use embassy_time::Duration;

/// Which cadence band a reading falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    Fast,
    Medium,
    Slow,
}

/// Threshold policy for the indicator.
///
/// Bands are strict at both ends: a reading equal to either threshold is in the medium band.
/// The cadence is the interval between two toggles, so the visible blink period is twice the
/// cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPolicy {
    /// Readings above this blink fast
    pub high_threshold: Reading,
    /// Readings below this blink slowly
    pub low_threshold: Reading,
    pub fast: Duration,
    pub medium: Duration,
    pub slow: Duration,
}

impl BlinkPolicy {
    pub const DEFAULT: BlinkPolicy = BlinkPolicy {
        high_threshold: Reading(5000),
        low_threshold: Reading(1000),
        fast: Duration::from_millis(200),
        medium: Duration::from_millis(500),
        slow: Duration::from_millis(800),
    };

    pub fn band(&self, reading: Reading) -> Band {
        if reading > self.high_threshold {
            Band::Fast
        } else if reading < self.low_threshold {
            Band::Slow
        } else {
            Band::Medium
        }
    }

    /// Toggle interval for a band
    pub fn interval(&self, band: Band) -> Duration {
        match band {
            Band::Fast => self.fast,
            Band::Medium => self.medium,
            Band::Slow => self.slow,
        }
    }

    /// Toggle interval for a reading
    pub fn cadence(&self, reading: Reading) -> Duration {
        self.interval(self.band(reading))
    }
}

impl Default for BlinkPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
