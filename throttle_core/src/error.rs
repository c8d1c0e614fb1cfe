use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ThrottleError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing position sensor")]
    MissingSensor,
    #[error("missing power stage")]
    MissingPowerStage,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

// For typed hardware error mapping
#[cfg(feature = "hardware-errors")]
use throttle_hardware::error::HwError;

/// Map a boxed trait-boundary error to a typed ThrottleError, with special
/// handling for hardware errors.
pub(crate) fn map_hw_error_dyn(e: &(dyn std::error::Error + 'static)) -> ThrottleError {
    #[cfg(feature = "hardware-errors")]
    if let Some(hw) = e.downcast_ref::<HwError>() {
        return match hw {
            HwError::Timeout => ThrottleError::Timeout,
            other => ThrottleError::HardwareFault(other.to_string()),
        };
    }
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        ThrottleError::Timeout
    } else {
        ThrottleError::Hardware(s)
    }
}
