//! Backend assembly and the periodic control loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use throttle_core::{SensorRange, Throttle, Timeouts, util};

/// Assemble a throttle from the validated config.
///
/// With the `hardware` feature this drives real GPIO/SPI; otherwise the
/// simulated backend sweeps the pot through both travel directions.
pub fn build_from_config(cfg: &throttle_config::Config) -> eyre::Result<Throttle> {
    let range = SensorRange::try_from(&cfg.sensor)?;
    let timeouts = Timeouts::from(&cfg.timeouts);

    #[cfg(feature = "hardware")]
    {
        build_gpio(cfg, range, timeouts)
    }
    #[cfg(not(feature = "hardware"))]
    {
        build_simulated(cfg, range, timeouts)
    }
}

#[cfg(not(feature = "hardware"))]
fn build_simulated(
    cfg: &throttle_config::Config,
    range: SensorRange,
    timeouts: Timeouts,
) -> eyre::Result<Throttle> {
    use throttle_hardware::{SimulatedPot, SimulatedPowerStage, SimulatedSwitch};

    // Step size so a full sweep takes a few seconds at the configured rate.
    let step = (u32::from(range.max_value()) / (2 * cfg.sensor.sample_rate_hz).max(1))
        .clamp(1, u32::from(u16::MAX)) as u16;

    let mut builder = Throttle::builder()
        .with_sensor(SimulatedPot::sweep(range.max_value(), step))
        .with_power_stage(SimulatedPowerStage::new())
        .with_range(range)
        .with_timeouts(timeouts);

    if cfg.pins.has_switching() {
        // Released (pulled-up) switches: the latch stays wherever it is.
        builder = builder.with_switching(
            SimulatedSwitch::released(),
            SimulatedSwitch::released(),
            SimulatedSwitch::released(),
        );
    }

    builder.build().wrap_err("assembling simulated throttle")
}

#[cfg(feature = "hardware")]
fn build_gpio(
    cfg: &throttle_config::Config,
    range: SensorRange,
    timeouts: Timeouts,
) -> eyre::Result<Throttle> {
    use throttle_hardware::gpio::{GpioPowerStage, GpioSwitch, Mcp3008Pot};

    let sensor = Mcp3008Pot::new(cfg.pins.pot_channel).wrap_err("opening MCP3008 pot channel")?;
    let power = GpioPowerStage::new(
        cfg.pins.pwm_out,
        cfg.pins.forward_en,
        cfg.pins.backward_en,
        range.pwm_max(),
    )
    .wrap_err("claiming output stage pins")?;

    let mut builder = Throttle::builder()
        .with_sensor(sensor)
        .with_power_stage(power)
        .with_range(range)
        .with_timeouts(timeouts);

    if let (Some(sw1), Some(sw2), Some(en)) = (
        cfg.pins.end_switch_1,
        cfg.pins.end_switch_2,
        cfg.pins.switching_en,
    ) {
        builder = builder.with_switching(
            GpioSwitch::new(sw1).wrap_err("claiming end switch 1")?,
            GpioSwitch::new(sw2).wrap_err("claiming end switch 2")?,
            GpioSwitch::new(en).wrap_err("claiming switching enable input")?,
        );
    }

    builder.build().wrap_err("assembling GPIO throttle")
}

/// Drive the control loop until the cycle budget runs out or shutdown is
/// requested. Outputs are always de-energized on the way out.
pub fn run_loop(
    mut throttle: Throttle,
    rate_hz: u32,
    cycles: Option<u64>,
    json: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    let period = Duration::from_micros(util::period_us(rate_hz));
    tracing::info!(rate_hz, period_us = period.as_micros() as u64, "loop start");

    let mut cycle: u64 = 0;
    let result = loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(cycle, "shutdown requested");
            break Ok(());
        }
        if let Some(n) = cycles
            && cycle >= n
        {
            break Ok(());
        }

        let cmd = match throttle.update() {
            Ok(cmd) => cmd,
            Err(e) => break Err(e.wrap_err("control cycle failed")),
        };
        cycle += 1;

        if json {
            println!(
                "{}",
                serde_json::json!({
                    "cycle": cycle,
                    "raw": throttle.last_raw(),
                    "reversed": throttle.is_reversed(),
                    "direction": cmd.direction().map(|d| format!("{d:?}")),
                    "magnitude": cmd.magnitude(),
                })
            );
        } else {
            tracing::debug!(
                cycle,
                raw = ?throttle.last_raw(),
                ?cmd,
                reversed = throttle.is_reversed(),
                "cycle"
            );
        }

        std::thread::sleep(period);
    };

    // Best-effort: a failed de-energize must not mask the cycle error that
    // stopped the loop.
    match throttle.all_off() {
        Ok(()) => tracing::info!(cycle, "loop stopped, outputs off"),
        Err(e) => {
            tracing::error!(error = %e, cycle, "failed to de-energize outputs");
            if result.is_ok() {
                return Err(e.wrap_err("de-energizing outputs"));
            }
        }
    }
    result
}

/// Run a single cycle against the configured backend, then de-energize.
pub fn self_check(mut throttle: Throttle) -> eyre::Result<()> {
    let cmd = throttle.update().wrap_err("self-check cycle failed")?;
    throttle.all_off().wrap_err("de-energizing outputs")?;
    tracing::info!(?cmd, "self-check passed");
    println!("self-check ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use throttle_core::mocks::{FailingPowerStage, FailingSensor};

    #[test]
    fn cycle_error_is_kept_when_final_all_off_fails_too() {
        let throttle = Throttle::builder()
            .with_sensor(FailingSensor)
            .with_power_stage(FailingPowerStage)
            .build()
            .unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));

        let err = run_loop(throttle, 1000, Some(1), false, &shutdown).expect_err("must fail");
        let chain = format!("{err:#}");
        assert!(chain.contains("control cycle failed"), "chain: {chain}");
        assert!(!chain.contains("de-energizing"), "chain: {chain}");
    }
}
