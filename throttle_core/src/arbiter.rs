//! Direction arbitration: a two-state latch driven by end-of-travel switches.
//!
//! While the latch is in the normal state only end switch 1 can flip it;
//! while reversed only end switch 2 can clear it. The result is a shuttle:
//! the device travels until it trips switch 1, drives in the opposite sense
//! until it trips switch 2, then reverses again, with no direction history
//! kept by the caller.

use eyre::WrapErr;
use throttle_traits::DigitalInput;

use crate::error::{Result, map_hw_error_dyn};

/// Optional direction-arbitration capability of a throttle instance.
pub enum DirectionArbiter {
    /// No switching context configured; the zone-implied direction is
    /// always used as-is.
    PassThrough,
    SwitchBased(SwitchContext),
}

impl DirectionArbiter {
    pub fn pass_through() -> Self {
        Self::PassThrough
    }

    pub fn switch_based(
        end_switch_1: impl DigitalInput + 'static,
        end_switch_2: impl DigitalInput + 'static,
        enable: impl DigitalInput + 'static,
    ) -> Self {
        Self::SwitchBased(SwitchContext {
            end_switch_1: Box::new(end_switch_1),
            end_switch_2: Box::new(end_switch_2),
            enable: Box::new(enable),
            reversed: false,
        })
    }

    /// Whether the zone-implied direction must be inverted this cycle.
    ///
    /// Called once per cycle, and only for samples outside the dead zone.
    /// The latch transition is the only persistent effect.
    pub fn should_reverse(&mut self) -> Result<bool> {
        match self {
            Self::PassThrough => Ok(false),
            Self::SwitchBased(ctx) => ctx.should_reverse(),
        }
    }

    /// Current latch value, for diagnostics only.
    pub fn is_reversed(&self) -> bool {
        match self {
            Self::PassThrough => false,
            Self::SwitchBased(ctx) => ctx.reversed,
        }
    }
}

impl core::fmt::Debug for DirectionArbiter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PassThrough => f.write_str("PassThrough"),
            Self::SwitchBased(ctx) => f
                .debug_struct("SwitchBased")
                .field("reversed", &ctx.reversed)
                .finish_non_exhaustive(),
        }
    }
}

/// End-switch inputs plus the latch they drive.
///
/// Owned exclusively by the arbiter; nothing else mutates `reversed`.
pub struct SwitchContext {
    end_switch_1: Box<dyn DigitalInput>,
    end_switch_2: Box<dyn DigitalInput>,
    enable: Box<dyn DigitalInput>,
    reversed: bool,
}

impl SwitchContext {
    fn should_reverse(&mut self) -> Result<bool> {
        // The enable input is pulled up: an open switch reads high, which
        // means switching is disabled. The latch is left untouched so the
        // prior state applies again once re-enabled.
        let disabled = read_level(&mut self.enable).wrap_err("reading switching enable input")?;
        if disabled {
            return Ok(false);
        }

        if self.reversed {
            // Only end switch 2 can clear the latch while reversed.
            let active = !read_level(&mut self.end_switch_2).wrap_err("reading end switch 2")?;
            if active {
                self.reversed = false;
                tracing::debug!("end switch 2 tripped, direction latch cleared");
            }
        } else {
            // Only end switch 1 can set the latch while normal.
            let active = !read_level(&mut self.end_switch_1).wrap_err("reading end switch 1")?;
            if active {
                self.reversed = true;
                tracing::debug!("end switch 1 tripped, direction latch set");
            }
        }
        Ok(self.reversed)
    }
}

/// Raw logic level of one input. Switches are active-low, so callers negate.
fn read_level(input: &mut Box<dyn DigitalInput>) -> Result<bool> {
    input
        .read()
        .map_err(|e| eyre::Report::new(map_hw_error_dyn(&*e)))
}
