//! Sensor range constants, the position classifier, and PWM rescaling.

use throttle_traits::{Direction, DriveCommand};

use crate::error::{BuildError, Result};

/// Classification of a raw sample relative to the dead zone.
///
/// `Unknown` exists only as a defensive catch-all for samples above the
/// declared maximum; the three real zones partition `[0, max_value]`
/// exactly, so it is never produced for in-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    DeadZone,
    Negative,
    Positive,
    Unknown,
}

/// Fixed range constants of one sensor instance.
///
/// The boundary arithmetic is load-bearing: with
/// `lower = mid - dead_zone_size/2 + 1` and `upper = mid + dead_zone_size/2`
/// the three ranges below/within/above the dead zone partition
/// `[0, max_value]` with no gap or overlap, and both rescale spans
/// (`[0, lower)` and `(upper, max_value]`) stay non-empty for any
/// `dead_zone_size` in `[2, max_value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRange {
    max_value: u16,
    mid_value: u16,
    dead_zone_lower: u16,
    dead_zone_upper: u16,
    pwm_max: u16,
}

impl SensorRange {
    /// Build a validated range. Fails fast on configurations that would
    /// later divide by a zero-width rescale span.
    pub fn new(max_value: u16, dead_zone_size: u16, pwm_max: u16) -> Result<Self> {
        if max_value < 3 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sensor max_value must be >= 3",
            )));
        }
        if dead_zone_size < 2 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "dead_zone_size must be >= 2",
            )));
        }
        if dead_zone_size >= max_value {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "dead_zone_size must be < max_value",
            )));
        }
        if pwm_max == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "pwm_max must be > 0",
            )));
        }

        let mid_value = max_value / 2;
        let half = dead_zone_size / 2;
        let dead_zone_lower = mid_value - half + 1;
        let dead_zone_upper = mid_value + half;
        debug_assert!(dead_zone_lower >= 1);
        debug_assert!(dead_zone_lower <= mid_value);
        debug_assert!(mid_value <= dead_zone_upper);
        debug_assert!(dead_zone_upper < max_value);

        Ok(Self {
            max_value,
            mid_value,
            dead_zone_lower,
            dead_zone_upper,
            pwm_max,
        })
    }

    #[inline]
    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    #[inline]
    pub fn mid_value(&self) -> u16 {
        self.mid_value
    }

    #[inline]
    pub fn dead_zone_lower(&self) -> u16 {
        self.dead_zone_lower
    }

    #[inline]
    pub fn dead_zone_upper(&self) -> u16 {
        self.dead_zone_upper
    }

    #[inline]
    pub fn pwm_max(&self) -> u16 {
        self.pwm_max
    }

    /// Classify one raw sample. Pure; no side effects.
    pub fn classify(&self, raw: u16) -> Zone {
        if raw > self.max_value {
            return Zone::Unknown;
        }
        if raw < self.dead_zone_lower {
            Zone::Negative
        } else if raw > self.dead_zone_upper {
            Zone::Positive
        } else {
            // Inclusive of both bounds.
            Zone::DeadZone
        }
    }

    /// Compute the output command for a classified sample.
    ///
    /// `reversed` flips the zone-implied base direction for this cycle only.
    pub fn command_for(&self, zone: Zone, raw: u16, reversed: bool) -> DriveCommand {
        let (base, magnitude) = match zone {
            Zone::DeadZone | Zone::Unknown => return DriveCommand::AllOff,
            Zone::Negative => {
                // Closer to 0 means further from center, so the rescale is
                // inverted: raw 0 drives at full magnitude.
                let scaled = self.rescale(0, self.dead_zone_lower, raw);
                (Direction::Backward, self.pwm_max - scaled)
            }
            Zone::Positive => {
                let scaled = self.rescale(self.dead_zone_upper, self.max_value, raw);
                (Direction::Forward, scaled)
            }
        };
        let direction = if reversed { base.inverted() } else { base };
        DriveCommand::Drive {
            direction,
            magnitude,
        }
    }

    /// Linear rescale of `raw` from `[low, high]` onto `[0, pwm_max]`,
    /// rounding down. `raw` is clamped into the span defensively since the
    /// sensor boundary is external.
    fn rescale(&self, low: u16, high: u16, raw: u16) -> u16 {
        debug_assert!(high > low, "rescale span must be non-empty");
        let absolute = u32::from(raw.clamp(low, high) - low);
        let span = u32::from(high - low);
        let scaled = absolute * u32::from(self.pwm_max) / span;
        scaled as u16
    }
}

impl Default for SensorRange {
    /// 10-bit sensor, 200-count dead zone, 8-bit PWM.
    fn default() -> Self {
        Self {
            max_value: 1023,
            mid_value: 511,
            dead_zone_lower: 412,
            dead_zone_upper: 611,
            pwm_max: 255,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_constructor() {
        let built = SensorRange::new(1023, 200, 255).unwrap();
        assert_eq!(built, SensorRange::default());
    }

    #[test]
    fn bounds_for_reference_tuning() {
        let r = SensorRange::default();
        assert_eq!(r.dead_zone_lower(), 412);
        assert_eq!(r.dead_zone_upper(), 611);
        assert_eq!(r.mid_value(), 511);
    }
}
