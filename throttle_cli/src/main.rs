#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions)]
//! `throttle` binary: config loading, logging setup, and the run loop.

mod cli;
mod run;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

// Keeps the non-blocking file writer alive for the process lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn init_tracing(level: &str, json: bool, file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path.file_name().unwrap_or(OsStr::new("throttle.log"));
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .init();
    } else if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let content = fs::read_to_string(&args.config)
        .wrap_err_with(|| format!("reading config {}", args.config.display()))?;
    let cfg = throttle_config::load_toml(&content)
        .wrap_err_with(|| format!("parsing config {}", args.config.display()))?;
    cfg.validate().wrap_err("validating config")?;

    // The config level is the fallback when the flag is left at its default.
    let level = if args.log_level == "info" {
        cfg.logging.level.as_deref().unwrap_or("info")
    } else {
        args.log_level.as_str()
    };
    init_tracing(level, args.json, cfg.logging.file.as_deref().map(Path::new));

    let throttle = run::build_from_config(&cfg)?;
    tracing::info!(config = %args.config.display(), "throttle assembled");

    match args.cmd {
        Commands::Run { cycles, rate_hz } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("installing ctrl-c handler")?;
            let rate = rate_hz.unwrap_or(cfg.sensor.sample_rate_hz);
            run::run_loop(throttle, rate, cycles, args.json, &shutdown)
        }
        Commands::SelfCheck => run::self_check(throttle),
    }
}
