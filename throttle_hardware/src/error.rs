use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("timeout waiting for hardware")]
    Timeout,
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
}
