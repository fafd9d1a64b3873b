//! # Elevator Control Unit
//!
//! Periodic control loop for a dual-motor elevator.
//!
//! Loads the configuration (or built-in defaults), creates the actuator
//! backend by name, applies an optional startup request, performs RT setup
//! and ticks the controller until Ctrl-C or the tick limit.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use elevator_common::config::LogLevel;
use elevator_common::elevator::state::ElevatorRequest;
use elevator_control_unit::actuator::ActuatorPair;
use elevator_control_unit::config::load_config;
use elevator_control_unit::cycle::{CycleRunner, rt_setup};
use elevator_control_unit::state::ElevatorController;
use elevator_control_unit::telemetry::TracingSink;
use elevator_hal::DriverRegistry;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Elevator Control Unit: periodic dual-motor elevator control loop
#[derive(Parser, Debug)]
#[command(name = "elevator_control_unit")]
#[command(version)]
#[command(about = "Periodic control loop for a dual-motor elevator")]
struct Args {
    /// Path to the elevator TOML. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Actuator backend to drive.
    #[arg(long, default_value = "simulation")]
    driver: String,

    /// Request applied before the first tick: `idle`, `retract`, `top`,
    /// `mid_cube`, `mid_cone`, `bottom` or a raw position.
    #[arg(long, value_name = "REQUEST")]
    request: Option<String>,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    ticks: Option<u64>,

    /// CPU core to pin the control thread to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() {
    let args = Args::parse();

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("FATAL: configuration: {e}");
            process::exit(1);
        }
    };

    if args.print_config {
        match loaded.to_toml() {
            Ok(rendered) => {
                print!("{rendered}");
                return;
            }
            Err(e) => {
                eprintln!("FATAL: {e}");
                process::exit(1);
            }
        }
    }

    setup_tracing(&args, loaded.elevator.shared.log_level);
    info!(
        "{} v{} starting...",
        loaded.elevator.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&args, &loaded) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Elevator Control Unit shutdown complete");
}

fn run(
    args: &Args,
    loaded: &elevator_control_unit::config::LoadedConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &loaded.elevator;

    let registry = DriverRegistry::with_builtin_drivers();
    let device = registry.create_driver(&args.driver, &loaded.driver_context())?;
    let pair = ActuatorPair::from_config(device, &config.actuators);
    let mut controller = ElevatorController::new(pair, config);

    if let Some(token) = args.request.as_deref() {
        let request = ElevatorRequest::parse(token)
            .ok_or_else(|| format!("unrecognized request '{token}'"))?;
        info!(request = request.label(), "startup request");
        controller.request(request);
    }

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let sink = TracingSink::new(config.telemetry.publish_interval);
    let mut runner = CycleRunner::new(controller, sink, config.cycle.period());
    if let Some(ticks) = args.ticks {
        runner = runner.with_max_ticks(ticks);
    }

    let stats = runner.run(&running).clone();
    info!(
        cycles = stats.cycle_count,
        overruns = stats.overruns,
        skipped = stats.skipped_ticks,
        faulted = stats.faulted_ticks,
        max_latency_us = stats.max_latency_ns / 1000,
        anomalies = runner.controller().anomaly_count(),
        final_state = %runner.controller().state(),
        "run summary"
    );
    Ok(())
}

fn setup_tracing(args: &Args, configured: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        configured.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
