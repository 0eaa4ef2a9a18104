//! Reckon - open-loop linear actuator control
//!
//! Command-line binary for a DC linear actuator on a Raspberry Pi. The
//! actuator has no position sensor; its position is reckoned from timed
//! motor pulses and persisted between invocations.
//!
//! Each invocation loads the config and the device record, runs one command
//! on a single-threaded embassy executor while a persistence loop writes
//! committed changes, then releases the outputs and exits.

use anyhow::{Context, Result};
use clap::Parser;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use reckon_drivers::PositionStore;
use reckon_hal_linux::FileStorage;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::channels::{DEVICE_UPDATES, INTERRUPT};
use crate::cli::Cli;
use crate::config::AppConfig;

mod channels;
mod cli;
mod commands;
mod config;
mod delay;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let cli = Cli::parse();
    init_logging();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };

    // The executor never returns on its own
    std::process::exit(code);
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
///
/// Also captures `log` records from the library crates.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Turn the first SIGINT into [`INTERRUPT`]
///
/// The embassy executor has no signal support, so a small tokio runtime
/// waits for Ctrl-C on its own thread. The default handler is replaced, so
/// the process keeps running long enough to stop the motor and persist the
/// position.
fn watch_interrupt() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("sigint".into())
        .spawn(move || {
            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => INTERRUPT.signal(()),
                Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
            }
        })
        .context("failed to spawn signal thread")?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    info!("Reckon starting...");
    let config = AppConfig::load(&cli.config)?;

    let mut store = PositionStore::new(FileStorage::new(&config.store_dir));
    let record = store
        .load()
        .await
        .context("failed to load device record")?;

    if !cli.command.uses_hardware() {
        println!("{record}");
        return Ok(());
    }

    let mut device = commands::open_device(&config, &record)?;
    let home_first = cli.calibrate || config.calibrate_on_start;
    if let Err(e) = watch_interrupt() {
        warn!("Ctrl-C will not stop the actuator: {e:#}");
    }

    let command = device.execute(&cli.command, &config.presets, home_first, &INTERRUPT);
    let outcome = match select(command, store.run(&DEVICE_UPDATES)).await {
        Either::First(outcome) => outcome,
        // The persistence loop never finishes
        Either::Second(()) => Ok(()),
    };

    let released = device.release();
    let persisted = store
        .flush(&DEVICE_UPDATES)
        .await
        .context("failed to persist device record");
    debug!("Final record: {}", store.record());

    outcome.and(released).and(persisted)
}
