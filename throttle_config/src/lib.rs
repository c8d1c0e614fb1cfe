#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the throttle controller.
//!
//! `Config` and its sub-structs are deserialized from TOML and validated.
//! Validation is fail-fast: anything that would later produce a zero-width
//! rescale span or a degenerate dead zone is rejected here, before any
//! hardware is touched.

use serde::Deserialize;

/// GPIO / ADC wiring. The end-switch group is optional; when it is absent
/// direction arbitration runs in pass-through mode.
#[derive(Debug, Deserialize)]
pub struct Pins {
    /// ADC channel the potentiometer wiper is connected to.
    pub pot_channel: u8,
    /// PWM magnitude output.
    pub pwm_out: u8,
    /// Forward direction-enable line.
    pub forward_en: u8,
    /// Backward direction-enable line.
    pub backward_en: u8,
    /// End-of-travel switch reached while driving in the normal sense.
    pub end_switch_1: Option<u8>,
    /// End-of-travel switch reached while driving in the reversed sense.
    pub end_switch_2: Option<u8>,
    /// Master enable for direction switching (pulled up; open = disabled).
    pub switching_en: Option<u8>,
}

impl Pins {
    /// True when the full end-switch group is configured.
    pub fn has_switching(&self) -> bool {
        self.end_switch_1.is_some() && self.end_switch_2.is_some() && self.switching_en.is_some()
    }
}

/// Sensor range and output scaling.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SensorCfg {
    /// Maximum representable sample of the ADC (e.g. 1023 for 10 bit).
    pub max_value: u16,
    /// Width of the dead zone centered on the midpoint, in raw counts.
    pub dead_zone_size: u16,
    /// Maximum PWM magnitude accepted by the output stage.
    pub pwm_max: u16,
    /// Control cycle rate in Hz.
    pub sample_rate_hz: u32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            max_value: 1023,
            dead_zone_size: 200,
            pwm_max: 255,
            sample_rate_hz: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Max wait per analog sample (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub sample_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sample_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub sensor: SensorCfg,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor / scaling
        if self.sensor.max_value < 3 {
            eyre::bail!("sensor.max_value must be >= 3");
        }
        if self.sensor.dead_zone_size < 2 {
            eyre::bail!("sensor.dead_zone_size must be >= 2");
        }
        // A dead zone narrower than the range keeps both rescale spans
        // non-empty; the boundary arithmetic in the core guarantees it.
        if self.sensor.dead_zone_size >= self.sensor.max_value {
            eyre::bail!("sensor.dead_zone_size must be < sensor.max_value");
        }
        if self.sensor.pwm_max == 0 {
            eyre::bail!("sensor.pwm_max must be > 0");
        }
        if self.sensor.sample_rate_hz == 0 {
            eyre::bail!("sensor.sample_rate_hz must be > 0");
        }

        // Pins: the switching group is all-or-nothing.
        let group = [
            self.pins.end_switch_1,
            self.pins.end_switch_2,
            self.pins.switching_en,
        ];
        let present = group.iter().filter(|p| p.is_some()).count();
        if present != 0 && present != group.len() {
            eyre::bail!(
                "pins: end_switch_1, end_switch_2 and switching_en must be configured together"
            );
        }

        // Timeouts
        if self.timeouts.sample_ms == 0 {
            eyre::bail!("timeouts.sample_ms must be >= 1");
        }

        Ok(())
    }
}
