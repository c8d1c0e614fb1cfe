//! Mappings from the `throttle_config` schema into core types.

use crate::Timeouts;
use crate::range::SensorRange;

impl TryFrom<&throttle_config::SensorCfg> for SensorRange {
    type Error = eyre::Report;

    fn try_from(cfg: &throttle_config::SensorCfg) -> Result<Self, Self::Error> {
        SensorRange::new(cfg.max_value, cfg.dead_zone_size, cfg.pwm_max)
    }
}

impl From<&throttle_config::Timeouts> for Timeouts {
    fn from(t: &throttle_config::Timeouts) -> Self {
        Self {
            sensor_ms: t.sample_ms,
        }
    }
}
