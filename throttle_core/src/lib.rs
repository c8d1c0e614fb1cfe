#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core throttle logic (hardware-agnostic).
//!
//! This crate maps a potentiometer position onto a bidirectional motor-drive
//! command. All hardware interactions go through the `throttle_traits`
//! capability traits.
//!
//! ## Architecture
//!
//! - **Classification**: raw sample → zone around a symmetric dead zone
//!   (`range` module)
//! - **Arbitration**: end-of-travel shuttle latch (`arbiter` module)
//! - **Output**: linear rescale onto `[0, pwm_max]` plus direction selection
//!   (`SensorRange::command_for`)
//! - **Composition**: `ThrottleCore::update()` runs one control cycle
//!
//! The core is time-free: the caller schedules `update()` at a bounded,
//! roughly periodic interval (see `util::period_us` for pacing helpers).

// Module declarations
pub mod arbiter;
pub mod error;
pub mod mocks;
pub mod range;
pub mod util;

mod conversions;

use std::marker::PhantomData;
use std::time::Duration;

use eyre::WrapErr;

pub use crate::arbiter::DirectionArbiter;
pub use crate::error::{BuildError, Result, ThrottleError};
pub use crate::range::{SensorRange, Zone};
pub use throttle_traits::{DigitalInput, Direction, DriveCommand, PositionSensor, PowerStage};

use crate::error::map_hw_error_dyn;

/// Timeouts applied at the hardware boundary.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Max sensor wait per read (ms)
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 100 }
    }
}

/// Unified core for both dynamic (boxed) and generic (static dispatch)
/// variants.
pub struct ThrottleCore<S: PositionSensor, P: PowerStage> {
    sensor: S,
    power: P,
    range: SensorRange,
    arbiter: DirectionArbiter,
    timeouts: Timeouts,
    // Telemetry from the most recent cycle
    last_raw: Option<u16>,
    last_command: DriveCommand,
}

impl<S: PositionSensor, P: PowerStage> core::fmt::Debug for ThrottleCore<S, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThrottleCore")
            .field("range", &self.range)
            .field("arbiter", &self.arbiter)
            .field("last_raw", &self.last_raw)
            .field("last_command", &self.last_command)
            .finish_non_exhaustive()
    }
}

impl<S: PositionSensor, P: PowerStage> ThrottleCore<S, P> {
    /// Run one control cycle: sample, classify, arbitrate, emit.
    ///
    /// Returns the command that was emitted to the output stage.
    pub fn update(&mut self) -> Result<DriveCommand> {
        let timeout = Duration::from_millis(self.timeouts.sensor_ms);
        let raw = self
            .sensor
            .read(timeout)
            .map_err(|e| eyre::Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("reading position sensor")?;

        let zone = self.range.classify(raw);
        let cmd = match zone {
            Zone::DeadZone => DriveCommand::AllOff,
            Zone::Unknown => {
                tracing::warn!(
                    raw,
                    max_value = self.range.max_value(),
                    "sample above declared range, forcing outputs off"
                );
                DriveCommand::AllOff
            }
            // Arbitration only runs outside the dead zone; the latch is never
            // touched while the output is at rest.
            zone => {
                let reversed = self.arbiter.should_reverse()?;
                self.range.command_for(zone, raw, reversed)
            }
        };

        self.power
            .apply(cmd)
            .map_err(|e| eyre::Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("applying drive command")?;

        tracing::trace!(raw, ?zone, ?cmd, "cycle");
        self.last_raw = Some(raw);
        self.last_command = cmd;
        Ok(cmd)
    }

    /// Force the output stage off. Shutdown path; does not read the sensor.
    pub fn all_off(&mut self) -> Result<()> {
        self.power
            .apply(DriveCommand::AllOff)
            .map_err(|e| eyre::Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("forcing outputs off")?;
        self.last_command = DriveCommand::AllOff;
        Ok(())
    }

    /// Command emitted by the most recent cycle.
    pub fn last_command(&self) -> DriveCommand {
        self.last_command
    }

    /// Raw sample of the most recent cycle, if any cycle ran yet.
    pub fn last_raw(&self) -> Option<u16> {
        self.last_raw
    }

    /// Current value of the direction latch, for diagnostics.
    pub fn is_reversed(&self) -> bool {
        self.arbiter.is_reversed()
    }

    /// The validated range constants this instance classifies against.
    pub fn range(&self) -> &SensorRange {
        &self.range
    }
}

/// Public dynamic (boxed) throttle that hides the hardware types.
pub struct Throttle {
    inner: ThrottleCore<Box<dyn PositionSensor>, Box<dyn PowerStage>>,
}

impl core::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.inner.fmt(f)
    }
}

impl Throttle {
    /// Start building a Throttle.
    pub fn builder() -> ThrottleBuilder<Missing, Missing> {
        ThrottleBuilder::default()
    }

    /// Run one control cycle. See [`ThrottleCore::update`].
    pub fn update(&mut self) -> Result<DriveCommand> {
        self.inner.update()
    }

    /// Force the output stage off.
    pub fn all_off(&mut self) -> Result<()> {
        self.inner.all_off()
    }

    /// Command emitted by the most recent cycle.
    pub fn last_command(&self) -> DriveCommand {
        self.inner.last_command()
    }

    /// Raw sample of the most recent cycle, if any cycle ran yet.
    pub fn last_raw(&self) -> Option<u16> {
        self.inner.last_raw()
    }

    /// Current value of the direction latch, for diagnostics.
    pub fn is_reversed(&self) -> bool {
        self.inner.is_reversed()
    }

    /// The validated range constants this instance classifies against.
    pub fn range(&self) -> &SensorRange {
        self.inner.range()
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for `Throttle`. Remaining fields are validated on `build()`.
pub struct ThrottleBuilder<S, P> {
    sensor: Option<Box<dyn PositionSensor>>,
    power: Option<Box<dyn PowerStage>>,
    range: Option<SensorRange>,
    arbiter: Option<DirectionArbiter>,
    timeouts: Option<Timeouts>,
    // Type-state markers
    _s: PhantomData<S>,
    _p: PhantomData<P>,
}

impl Default for ThrottleBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            power: None,
            range: None,
            arbiter: None,
            timeouts: None,
            _s: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state
impl<S, P> ThrottleBuilder<S, P> {
    pub fn with_range(mut self, range: SensorRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Enable switch-based direction arbitration with the given inputs.
    pub fn with_switching(
        mut self,
        end_switch_1: impl DigitalInput + 'static,
        end_switch_2: impl DigitalInput + 'static,
        enable: impl DigitalInput + 'static,
    ) -> Self {
        self.arbiter = Some(DirectionArbiter::switch_based(
            end_switch_1,
            end_switch_2,
            enable,
        ));
        self
    }

    /// Provide a pre-built arbiter (e.g. pass-through explicitly).
    pub fn with_arbiter(mut self, arbiter: DirectionArbiter) -> Self {
        self.arbiter = Some(arbiter);
        self
    }

    /// Fallible build available in any type-state; returns a detailed
    /// BuildError for missing pieces.
    pub fn try_build(self) -> Result<Throttle> {
        let ThrottleBuilder {
            sensor,
            power,
            range,
            arbiter,
            timeouts,
            _s: _,
            _p: _,
        } = self;

        let sensor = sensor.ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let power = power.ok_or_else(|| eyre::Report::new(BuildError::MissingPowerStage))?;

        let range = range.unwrap_or_default();
        let arbiter = arbiter.unwrap_or_else(DirectionArbiter::pass_through);
        let timeouts = timeouts.unwrap_or_default();

        if timeouts.sensor_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sensor_ms must be >= 1",
            )));
        }

        Ok(Throttle {
            inner: ThrottleCore {
                sensor,
                power,
                range,
                arbiter,
                timeouts,
                last_raw: None,
                last_command: DriveCommand::AllOff,
            },
        })
    }
}

// Setters that advance type-state when providing mandatory components
impl<P> ThrottleBuilder<Missing, P> {
    pub fn with_sensor(self, sensor: impl PositionSensor + 'static) -> ThrottleBuilder<Set, P> {
        let ThrottleBuilder {
            sensor: _,
            power,
            range,
            arbiter,
            timeouts,
            _s: _,
            _p: _,
        } = self;
        ThrottleBuilder {
            sensor: Some(Box::new(sensor)),
            power,
            range,
            arbiter,
            timeouts,
            _s: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<S> ThrottleBuilder<S, Missing> {
    pub fn with_power_stage(self, power: impl PowerStage + 'static) -> ThrottleBuilder<S, Set> {
        let ThrottleBuilder {
            sensor,
            power: _,
            range,
            arbiter,
            timeouts,
            _s: _,
            _p: _,
        } = self;
        ThrottleBuilder {
            sensor,
            power: Some(Box::new(power)),
            range,
            arbiter,
            timeouts,
            _s: PhantomData,
            _p: PhantomData,
        }
    }
}

impl ThrottleBuilder<Set, Set> {
    /// Validate and build. Only available once sensor and power stage are
    /// both set.
    pub fn build(self) -> Result<Throttle> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias using the unified core.
pub type ThrottleG<S, P> = ThrottleCore<S, P>;

/// Build a generic, statically-dispatched throttle from concrete hardware.
pub fn build_throttle<S, P>(
    sensor: S,
    power: P,
    range: SensorRange,
    arbiter: DirectionArbiter,
    timeouts: Timeouts,
) -> Result<ThrottleG<S, P>>
where
    S: PositionSensor + 'static,
    P: PowerStage + 'static,
{
    if timeouts.sensor_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sensor_ms must be >= 1",
        )));
    }
    Ok(ThrottleG {
        sensor,
        power,
        range,
        arbiter,
        timeouts,
        last_raw: None,
        last_command: DriveCommand::AllOff,
    })
}
