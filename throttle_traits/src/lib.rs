//! Hardware capability traits and shared command types for the throttle stack.
//!
//! The control core only talks to hardware through these traits, so the whole
//! decision logic can be exercised with scripted implementations in tests.

/// Logical drive direction of the output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// The opposite direction.
    #[inline]
    pub fn inverted(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// One output-stage command, produced once per control cycle.
///
/// `AllOff` forces the PWM magnitude to zero and both direction-enable lines
/// inactive. `Drive` selects exactly one enable line plus a PWM magnitude in
/// `[0, pwm_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    AllOff,
    Drive { direction: Direction, magnitude: u16 },
}

impl DriveCommand {
    /// Magnitude of the command; zero for `AllOff`.
    #[inline]
    pub fn magnitude(&self) -> u16 {
        match self {
            DriveCommand::AllOff => 0,
            DriveCommand::Drive { magnitude, .. } => *magnitude,
        }
    }

    /// Direction of the command, if it drives at all.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        match self {
            DriveCommand::AllOff => None,
            DriveCommand::Drive { direction, .. } => Some(*direction),
        }
    }
}

/// Analog position sensor (potentiometer wiper).
pub trait PositionSensor {
    /// Read one raw sample in `[0, max_value]`.
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

/// Single digital input returning the raw logic level.
///
/// Interpretation (active-low switches, pulled-up enable input) is the
/// caller's business; implementations report the level as read.
pub trait DigitalInput {
    fn read(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Bidirectional H-bridge style output stage: one PWM magnitude plus two
/// mutually exclusive direction-enable lines.
///
/// Implementations must never let both enable lines be active at the same
/// instant, including transiently while switching direction.
pub trait PowerStage {
    fn apply(&mut self, cmd: DriveCommand) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

// Forwarding impls so boxed trait objects satisfy the same bounds as
// concrete hardware in generic code.
impl PositionSensor for Box<dyn PositionSensor> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}

impl DigitalInput for Box<dyn DigitalInput> {
    fn read(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read()
    }
}

impl PowerStage for Box<dyn PowerStage> {
    fn apply(&mut self, cmd: DriveCommand) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).apply(cmd)
    }
}
