//! Hardware implementations of the throttle capability traits.
//!
//! Simulated implementations are always available and back the default CLI
//! mode and the integration tests. Real GPIO/SPI implementations live in the
//! `gpio` module behind the `hardware` feature (rppal, Linux only).

pub mod error;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use throttle_traits::{DigitalInput, Direction, DriveCommand, PositionSensor, PowerStage};

/// Simulated potentiometer that sweeps a triangle wave across the range,
/// so a free-running loop exercises both directions and the dead zone.
pub struct SimulatedPot {
    value: u16,
    max_value: u16,
    step: u16,
    rising: bool,
}

impl SimulatedPot {
    pub fn sweep(max_value: u16, step: u16) -> Self {
        Self {
            value: 0,
            max_value,
            step: step.max(1),
            rising: true,
        }
    }
}

impl PositionSensor for SimulatedPot {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let v = self.value;
        if self.rising {
            self.value = self.value.saturating_add(self.step).min(self.max_value);
            if self.value == self.max_value {
                self.rising = false;
            }
        } else {
            self.value = self.value.saturating_sub(self.step);
            if self.value == 0 {
                self.rising = true;
            }
        }
        tracing::trace!(raw = v, "simulated pot sample");
        Ok(v)
    }
}

/// Simulated digital input with a shared, externally settable level.
pub struct SimulatedSwitch {
    level: Arc<AtomicBool>,
}

impl SimulatedSwitch {
    pub fn new(level: bool) -> (Self, Arc<AtomicBool>) {
        let shared = Arc::new(AtomicBool::new(level));
        (
            Self {
                level: shared.clone(),
            },
            shared,
        )
    }

    /// A released switch on a pulled-up input reads high.
    pub fn released() -> Self {
        Self {
            level: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl DigitalInput for SimulatedSwitch {
    fn read(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.level.load(Ordering::Relaxed))
    }
}

/// Simulated output stage tracking the PWM magnitude and both enable lines.
#[derive(Debug, Default)]
pub struct SimulatedPowerStage {
    forward_en: bool,
    backward_en: bool,
    magnitude: u16,
}

impl SimulatedPowerStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current (forward, backward) enable line states.
    pub fn line_states(&self) -> (bool, bool) {
        (self.forward_en, self.backward_en)
    }

    pub fn magnitude(&self) -> u16 {
        self.magnitude
    }
}

impl PowerStage for SimulatedPowerStage {
    fn apply(&mut self, cmd: DriveCommand) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match cmd {
            DriveCommand::AllOff => {
                self.magnitude = 0;
                self.forward_en = false;
                self.backward_en = false;
            }
            DriveCommand::Drive {
                direction,
                magnitude,
            } => {
                // Deactivate the opposite line before activating, so the two
                // lines are never active together even transiently.
                match direction {
                    Direction::Forward => {
                        self.backward_en = false;
                        self.forward_en = true;
                    }
                    Direction::Backward => {
                        self.forward_en = false;
                        self.backward_en = true;
                    }
                }
                self.magnitude = magnitude;
            }
        }
        debug_assert!(!(self.forward_en && self.backward_en));
        tracing::debug!(
            forward = self.forward_en,
            backward = self.backward_en,
            magnitude = self.magnitude,
            "simulated power stage"
        );
        Ok(())
    }
}

#[cfg(feature = "hardware")]
pub mod gpio {
    //! rppal-backed implementations for Raspberry Pi class boards.
    //!
    //! The pot is sampled through an MCP3008 ADC on SPI0; the output stage is
    //! one software-PWM pin plus two direction-enable lines; switches are
    //! pulled-up inputs and read low when pressed.

    use rppal::gpio::{Gpio, InputPin, OutputPin};
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
    use throttle_traits::{DigitalInput, Direction, DriveCommand, PositionSensor, PowerStage};

    use crate::error::HwError;

    const SPI_CLOCK_HZ: u32 = 1_350_000;
    const PWM_FREQUENCY_HZ: f64 = 1_000.0;

    /// Potentiometer wiper read through an MCP3008 channel.
    pub struct Mcp3008Pot {
        spi: Spi,
        channel: u8,
    }

    impl Mcp3008Pot {
        pub fn new(channel: u8) -> Result<Self, HwError> {
            if channel > 7 {
                return Err(HwError::Spi(format!("mcp3008 channel {channel} out of range")));
            }
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            Ok(Self { spi, channel })
        }
    }

    impl PositionSensor for Mcp3008Pot {
        fn read(
            &mut self,
            _timeout: std::time::Duration,
        ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
            // Single-ended conversion: start bit, SGL|channel, one clock byte.
            let tx = [0x01, 0x80 | (self.channel << 4), 0x00];
            let mut rx = [0u8; 3];
            self.spi
                .transfer(&mut rx, &tx)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
            tracing::trace!(raw, channel = self.channel, "mcp3008 sample");
            Ok(raw)
        }
    }

    /// Pulled-up digital input for end and enable switches.
    pub struct GpioSwitch {
        pin: InputPin,
    }

    impl GpioSwitch {
        pub fn new(pin: u8) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input_pullup();
            Ok(Self { pin })
        }
    }

    impl DigitalInput for GpioSwitch {
        fn read(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.pin.is_high())
        }
    }

    /// H-bridge style output stage: software PWM plus two enable lines.
    pub struct GpioPowerStage {
        pwm: OutputPin,
        forward_en: OutputPin,
        backward_en: OutputPin,
        pwm_max: u16,
    }

    impl GpioPowerStage {
        pub fn new(
            pwm_pin: u8,
            forward_en_pin: u8,
            backward_en_pin: u8,
            pwm_max: u16,
        ) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let take = |p: u8| -> Result<OutputPin, HwError> {
                Ok(gpio
                    .get(p)
                    .map_err(|e| HwError::Gpio(e.to_string()))?
                    .into_output_low())
            };
            Ok(Self {
                pwm: take(pwm_pin)?,
                forward_en: take(forward_en_pin)?,
                backward_en: take(backward_en_pin)?,
                pwm_max: pwm_max.max(1),
            })
        }
    }

    impl PowerStage for GpioPowerStage {
        fn apply(
            &mut self,
            cmd: DriveCommand,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            match cmd {
                DriveCommand::AllOff => {
                    self.pwm
                        .clear_pwm()
                        .map_err(|e| HwError::Gpio(e.to_string()))?;
                    self.pwm.set_low();
                    self.forward_en.set_low();
                    self.backward_en.set_low();
                }
                DriveCommand::Drive {
                    direction,
                    magnitude,
                } => {
                    // Drop the opposite enable line before raising the
                    // selected one; both lines high would short the bridge.
                    match direction {
                        Direction::Forward => {
                            self.backward_en.set_low();
                            self.forward_en.set_high();
                        }
                        Direction::Backward => {
                            self.forward_en.set_low();
                            self.backward_en.set_high();
                        }
                    }
                    let duty =
                        f64::from(magnitude.min(self.pwm_max)) / f64::from(self.pwm_max);
                    self.pwm
                        .set_pwm_frequency(PWM_FREQUENCY_HZ, duty)
                        .map_err(|e| HwError::Gpio(e.to_string()))?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn simulated_pot_sweeps_up_then_down() {
        let mut pot = SimulatedPot::sweep(10, 4);
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(pot.read(Duration::from_millis(1)).unwrap());
        }
        assert_eq!(seen, vec![0, 4, 8, 10, 6, 2, 0, 4]);
    }

    #[test]
    fn simulated_switch_reports_shared_level() {
        let (mut sw, level) = SimulatedSwitch::new(true);
        assert!(sw.read().unwrap());
        level.store(false, Ordering::Relaxed);
        assert!(!sw.read().unwrap());
    }
}
