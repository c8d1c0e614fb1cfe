//! Test and helper mocks for throttle_core.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use throttle_traits::{DigitalInput, DriveCommand, PositionSensor, PowerStage};

/// Sensor that replays a fixed sequence, then repeats the last value.
pub struct ScriptedSensor {
    seq: Vec<u16>,
    idx: usize,
}

impl ScriptedSensor {
    pub fn new(seq: impl Into<Vec<u16>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }
}

impl PositionSensor for ScriptedSensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        Ok(v)
    }
}

/// Sensor backed by a shared value the test body can change between cycles.
pub struct SharedSensor(Arc<AtomicU16>);

impl SharedSensor {
    pub fn new(initial: u16) -> (Self, Arc<AtomicU16>) {
        let value = Arc::new(AtomicU16::new(initial));
        (Self(value.clone()), value)
    }
}

impl PositionSensor for SharedSensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.load(Ordering::Relaxed))
    }
}

/// Sensor that always errors; useful for exercising the hardware error path.
pub struct FailingSensor;

impl PositionSensor for FailingSensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("failing sensor")))
    }
}

/// Digital input backed by a shared logic level.
///
/// Remember the electrical convention: end switches are active-low, so
/// `false` means pressed; the switching-enable input reads `true` (pulled
/// up, open switch) when switching is disabled.
pub struct LevelInput(Arc<AtomicBool>);

impl LevelInput {
    pub fn new(level: bool) -> (Self, Arc<AtomicBool>) {
        let shared = Arc::new(AtomicBool::new(level));
        (Self(shared.clone()), shared)
    }
}

impl DigitalInput for LevelInput {
    fn read(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.load(Ordering::Relaxed))
    }
}

/// Power stage that records every applied command for later inspection.
pub struct RecordingPowerStage {
    log: Arc<Mutex<Vec<DriveCommand>>>,
}

impl RecordingPowerStage {
    pub fn new() -> (Self, Arc<Mutex<Vec<DriveCommand>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Self { log: log.clone() }, log)
    }
}

impl PowerStage for RecordingPowerStage {
    fn apply(&mut self, cmd: DriveCommand) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut log) = self.log.lock() {
            log.push(cmd);
        }
        Ok(())
    }
}

/// Power stage that always errors.
pub struct FailingPowerStage;

impl PowerStage for FailingPowerStage {
    fn apply(
        &mut self,
        _cmd: DriveCommand,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("failing power stage")))
    }
}
