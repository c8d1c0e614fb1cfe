use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "throttle",
    version,
    about = "Potentiometer-driven bidirectional motor throttle"
)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, value_name = "FILE", default_value = "etc/throttle.toml")]
    pub config: PathBuf,

    /// Emit telemetry and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level filter (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the control loop at the configured cycle rate
    Run {
        /// Stop after this many cycles (default: run until ctrl-c)
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,

        /// Override the cycle rate from the config (Hz)
        #[arg(long, value_name = "HZ")]
        rate_hz: Option<u32>,
    },
    /// Assemble the configured backend, run one cycle and de-energize
    SelfCheck,
}
