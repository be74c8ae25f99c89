//! Marga - reactive maze navigation daemon
//!
//! Runs the wall-following navigator on a fixed 50 ms control cycle until
//! the goal cell is reached or the process is interrupted. With the default
//! mock device the robot drives a simulated 8x8 maze; every cycle first
//! steps the simulation, then runs one navigator tick.

use marga_nav::config::Config;
use marga_nav::error::Result;
use marga_nav::hardware::{create_device, pid::YawPid};
use marga_nav::nav::{EncoderBank, HeadingController, Navigator, PerceptionSampler};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `marga-nav <path>` (positional)
/// - `marga-nav --config <path>` (flag-based)
/// - `marga-nav -c <path>` (short flag)
///
/// Defaults to `marga.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "marga.toml".to_string()
}

fn load_config(path: &str) -> Config {
    match Config::load(path) {
        Ok(config) => {
            log::info!("Using config: {}", path);
            config
        }
        Err(e) => {
            log::warn!("Could not load {} ({}), using built-in defaults", path, e);
            Config::default()
        }
    }
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = {
        // Bootstrap: read the config before the logger so the configured
        // level can seed the default filter
        let config = load_config(&config_path);
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&config.logging.level),
        )
        .init();
        config
    };

    log::info!("Marga v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Device: {}, start cell ({}, {}) heading {}°",
        config.device.device_type,
        config.nav.start_x,
        config.nav.start_y,
        config.nav.start_heading_deg
    );

    let encoders = Arc::new(EncoderBank::new());
    let bundle = create_device(&config, Arc::clone(&encoders))?;
    let mut sim = bundle.sim;

    let perception = PerceptionSampler::new(
        bundle.right,
        bundle.front,
        bundle.left,
        config.nav.wall_threshold_cm,
        config.nav.sensor_max_range_cm,
    );
    let heading = HeadingController::new(bundle.gyro, Box::new(YawPid::new(&config.corrector)));
    let mut navigator = Navigator::new(&config, bundle.drive, perception, heading, encoders)?;

    // Shutdown on Ctrl-C
    let running = Arc::new(AtomicBool::new(true));
    let running_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Shutdown signal received");
        running_handler.store(false, Ordering::SeqCst);
    })
    .map_err(|e| marga_nav::Error::Device(format!("Failed to set signal handler: {}", e)))?;

    let tick_period = config.nav.tick_period();
    let dt = config.nav.tick_dt();
    let mut next_deadline = Instant::now() + tick_period;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now < next_deadline {
            thread::sleep(next_deadline - now);
        }

        if let Some(sim) = sim.as_mut() {
            sim.step(dt);
        }
        navigator.tick(Instant::now())?;

        if navigator.goal_reached() {
            break;
        }

        // Fixed-period schedule; late cycles skip missed slots instead of
        // bursting to catch up
        next_deadline += tick_period;
        let after = Instant::now();
        if after > next_deadline {
            let mut skipped = 0u32;
            while after > next_deadline {
                next_deadline += tick_period;
                skipped += 1;
            }
            log::warn!("Control cycle overran, skipped {} slot(s)", skipped);
        }
    }

    navigator.halt()?;

    let pose = navigator.pose();
    let (yaw, target) = navigator.heading_estimate();
    log::info!(
        "Run finished: goal_reached={}, cell ({}, {}), {} ticks, {} recorded moves, yaw {:.1}° (target {:.1}°)",
        navigator.goal_reached(),
        pose.cell_x,
        pose.cell_y,
        navigator.ticks(),
        navigator.moves().len(),
        yaw,
        target
    );

    Ok(())
}
