//! `fleetwatch` - CLI for the fleet telemetry simulator
//!
//! This binary runs the live dashboard, prints one-off snapshots, and
//! inspects configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use fleetwatch::cli::{Cli, Command, ConfigCommand, FleetArgs, RunCommand, SnapshotCommand};
use fleetwatch::{
    init_logging, render, Clock, Config, DashboardView, FleetMonitor, MonitorConfig,
    MonitorEvent, MonitorHandle, Simulation, SystemClock, SystemStatus,
};

/// Views buffered between the monitor task and the terminal.
const EVENT_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Run(cmd) => {
            cmd.fleet.apply(&mut config);
            handle_run(&config, &cmd).await
        }
        Command::Snapshot(cmd) => {
            cmd.fleet.apply(&mut config);
            handle_snapshot(&config, &cmd)
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_run(config: &Config, cmd: &RunCommand) -> anyhow::Result<()> {
    let monitor_config = MonitorConfig::from_config(config).with_max_ticks(cmd.ticks);
    let mut monitor = FleetMonitor::new(
        Simulation::from_config(config),
        SystemClock,
        monitor_config,
        config.thresholds.clone(),
        config.map.clone(),
    );
    let handle = monitor.handle();
    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let task = tokio::spawn(async move { monitor.run(tx).await });

    let streamed = stream_events(&mut rx, &handle, cmd).await;
    if streamed.is_err() {
        handle.stop();
    }
    streamed?;

    let ticks = task.await.context("monitor task panicked")??;
    info!(ticks, "Dashboard closed");
    Ok(())
}

/// Print views as they arrive until the monitor closes the channel.
async fn stream_events(
    rx: &mut mpsc::Receiver<MonitorEvent>,
    handle: &MonitorHandle,
    cmd: &RunCommand,
) -> anyhow::Result<()> {
    let mut clock = None;
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(MonitorEvent::Fleet(view)) => {
                    let status = SystemStatus::for_view(&view, handle.is_running());
                    emit(&view, status, &cmd.fleet, clock)?;
                }
                Some(MonitorEvent::Clock(now)) => clock = Some(now),
                None => return Ok(()),
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for interrupt")?;
                info!("Interrupt received, stopping");
                handle.stop();
            }
        }
    }
}

fn handle_snapshot(config: &Config, cmd: &SnapshotCommand) -> anyhow::Result<()> {
    let mut simulation = Simulation::from_config(config);
    let snapshot = simulation.advance_by(cmd.ticks);
    let view = DashboardView::build(snapshot, &config.thresholds, &config.map, SystemClock.now());
    let status = SystemStatus::for_view(&view, false);
    emit(&view, status, &cmd.fleet, None)
}

fn emit(
    view: &DashboardView,
    status: SystemStatus,
    args: &FleetArgs,
    clock: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    render::write(&mut out, view, status, &args.query, args.format, clock)?;
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                print_config(config);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_existing(&path)
                .with_context(|| format!("validating {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    let sim = &config.simulation;
    let motion = &config.generator;
    let th = &config.thresholds;
    let map = &config.map;

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Simulation]");
    println!("  Fleet size:         {}", sim.fleet_size);
    println!(
        "  Seed:               {}",
        sim.seed
            .map_or_else(|| "random".to_string(), |seed| seed.to_string())
    );
    println!("  Tick interval:      {} ms", sim.tick_interval_ms);
    println!("  Clock interval:     {} ms", sim.clock_interval_ms);
    println!();
    println!("[Generator]");
    println!(
        "  Origin:             {}, {} (+{})",
        motion.origin_lat, motion.origin_lng, motion.spawn_span
    );
    println!("  Max speed:          {} km/h", motion.max_speed);
    println!(
        "  Fuel burn:          {} moving / {} idle",
        motion.moving_fuel_burn, motion.idle_fuel_burn
    );
    println!();
    println!("[Thresholds]");
    println!("  Low fuel alert:     {}%", th.low_fuel_alert);
    println!("  Low fuel warning:   {}%", th.low_fuel_warning);
    println!("  Slow speed:         {} km/h", th.slow_speed);
    println!(
        "  Congestion:         medium >= {}%, high >= {}%",
        th.congestion_medium_pct, th.congestion_high_pct
    );
    println!("  Max alerts:         {}", th.max_alerts);
    println!();
    println!("[Map]");
    println!(
        "  Viewport:           {}, {} (span {})",
        map.origin_lat, map.origin_lng, map.span
    );
}
