//! Linear step schedules shared by the audio volume ramp and the sunrise
//! light ramp.
//!
//! A ramp over `steps` intervals applies `steps + 1` values, the first equal to
//! the start level and the last exactly equal to the target, with one pause of
//! `interval` between consecutive values. A zero-length ramp is a single step
//! that applies the target immediately.

use std::time::Duration;

/// Cadence of the audio volume ramp.
pub const VOLUME_STEP_INTERVAL: Duration = Duration::from_secs(3);

/// Cadence of the sunrise light ramp.
pub const SUNRISE_STEP_INTERVAL: Duration = Duration::from_secs(30);

/// Volume (percent) every audio ramp starts from.
pub const RAMP_START_VOLUME: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearRamp {
    steps: u32,
    interval: Duration,
}

impl LinearRamp {
    /// One step per `interval` of `duration_secs`, at least one step. A zero
    /// duration yields the degenerate single-value ramp.
    pub fn over_seconds(duration_secs: u32, interval: Duration) -> Self {
        if duration_secs == 0 {
            return Self {
                steps: 0,
                interval,
            };
        }
        let per_step = interval.as_secs().max(1);
        let steps = (u64::from(duration_secs) / per_step).max(1);
        Self {
            steps: u32::try_from(steps).unwrap_or(u32::MAX),
            interval,
        }
    }

    pub fn volume(duration_secs: u32) -> Self {
        Self::over_seconds(duration_secs, VOLUME_STEP_INTERVAL)
    }

    /// The light ramp always has at least one step, even for a zero duration.
    pub fn sunrise(duration_minutes: u32) -> Self {
        let secs = duration_minutes.saturating_mul(60);
        let per_step = SUNRISE_STEP_INTERVAL.as_secs() as u32;
        Self {
            steps: (secs / per_step).max(1),
            interval: SUNRISE_STEP_INTERVAL,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of values applied over the whole ramp.
    #[cfg(test)]
    pub(crate) fn point_count(&self) -> u32 {
        self.steps + 1
    }

    /// Total time spent pausing between values.
    #[cfg(test)]
    pub(crate) fn total_duration(&self) -> Duration {
        self.interval * self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = RampStep> {
        let steps = self.steps;
        (0..=steps).map(move |index| RampStep { index, steps })
    }
}

/// One point of a [`LinearRamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampStep {
    pub index: u32,
    pub steps: u32,
}

impl RampStep {
    pub fn is_last(&self) -> bool {
        self.index >= self.steps
    }

    /// Interpolation fraction in `[0, 1]`.
    #[cfg(test)]
    pub(crate) fn fraction(&self) -> f64 {
        if self.steps == 0 {
            1.0
        } else {
            f64::from(self.index) / f64::from(self.steps)
        }
    }

    /// `start + t·(target − start)`, rounded down. Computed in integers so the
    /// endpoints are exact and the sequence does not depend on float error.
    pub fn interpolate(&self, start: i64, target: i64) -> i64 {
        if self.steps == 0 {
            return target;
        }
        let steps = i64::from(self.steps);
        (start * steps + (target - start) * i64::from(self.index)).div_euclid(steps)
    }
}
