//! Configuration loading for MargaNav
//!
//! All the fixed constants the control loop needs are set here once before
//! control begins: drive speeds, per-cell tick threshold, wall-detection
//! threshold, dwell times and corrector gains.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub nav: NavConfig,
    #[serde(default)]
    pub corrector: CorrectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device type ("mock" is the only shipped driver)
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// RNG seed for the mock simulator's noise model
    #[serde(default = "default_sim_seed")]
    pub sim_seed: u64,

    /// Encoder slip noise stddev for the mock simulator (0.0 disables)
    #[serde(default)]
    pub sim_slip_stddev: f32,
}

/// Motor drive parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    /// Base forward speed (signed PWM units)
    #[serde(default = "default_base_speed")]
    pub base_speed: i16,

    /// In-place turn speed
    #[serde(default = "default_turn_speed")]
    pub turn_speed: i16,

    /// In-place backtrack (180° spin) speed
    #[serde(default = "default_backtrack_speed")]
    pub backtrack_speed: i16,

    /// PWM magnitude clamp applied to every drive command
    #[serde(default = "default_max_pwm")]
    pub max_pwm: i16,
}

/// Navigation thresholds and timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavConfig {
    /// Encoder ticks spanning one maze cell
    #[serde(default = "default_cell_ticks")]
    pub cell_ticks: u32,

    /// Wall-detection threshold (cm); readings at or below are "blocked"
    #[serde(default = "default_wall_threshold_cm")]
    pub wall_threshold_cm: u16,

    /// Maximum credible range reading (cm); beyond this is a fault
    #[serde(default = "default_sensor_max_range_cm")]
    pub sensor_max_range_cm: u16,

    /// Control tick period (ms)
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Settle delay between maneuver phases (ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Dwell in AwaitSensors before sampling and deciding (ms)
    #[serde(default = "default_sensor_dwell_ms")]
    pub sensor_dwell_ms: u64,

    /// Open-loop 90° turn duration (ms)
    #[serde(default = "default_turn_dwell_ms")]
    pub turn_dwell_ms: u64,

    /// Open-loop 180° backtrack spin duration (ms)
    #[serde(default = "default_backtrack_dwell_ms")]
    pub backtrack_dwell_ms: u64,

    /// Start cell column [0,7]
    #[serde(default = "default_start_x")]
    pub start_x: u8,

    /// Start cell row [0,7]
    #[serde(default = "default_start_y")]
    pub start_y: u8,

    /// Start heading in degrees (0, 90, 180 or 270)
    #[serde(default = "default_start_heading_deg")]
    pub start_heading_deg: u16,
}

/// Yaw corrector gains (output bounded to ±output_limit)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorrectorConfig {
    #[serde(default = "default_kp")]
    pub kp: f32,
    #[serde(default)]
    pub ki: f32,
    #[serde(default = "default_kd")]
    pub kd: f32,
    #[serde(default = "default_output_limit")]
    pub output_limit: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_device_type() -> String {
    "mock".to_string()
}
fn default_sim_seed() -> u64 {
    42
}
fn default_base_speed() -> i16 {
    120
}
fn default_turn_speed() -> i16 {
    100
}
fn default_backtrack_speed() -> i16 {
    140
}
fn default_max_pwm() -> i16 {
    255
}
fn default_cell_ticks() -> u32 {
    360
}
fn default_wall_threshold_cm() -> u16 {
    15
}
fn default_sensor_max_range_cm() -> u16 {
    400
}
fn default_tick_period_ms() -> u64 {
    50
}
fn default_settle_ms() -> u64 {
    200
}
fn default_sensor_dwell_ms() -> u64 {
    1000
}
fn default_turn_dwell_ms() -> u64 {
    1000
}
fn default_backtrack_dwell_ms() -> u64 {
    2000
}
fn default_start_x() -> u8 {
    7
}
fn default_start_y() -> u8 {
    0
}
fn default_start_heading_deg() -> u16 {
    90
}
fn default_kp() -> f32 {
    0.8
}
fn default_kd() -> f32 {
    0.05
}
fn default_output_limit() -> f32 {
    30.0
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            sim_seed: default_sim_seed(),
            sim_slip_stddev: 0.0,
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            turn_speed: default_turn_speed(),
            backtrack_speed: default_backtrack_speed(),
            max_pwm: default_max_pwm(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cell_ticks: default_cell_ticks(),
            wall_threshold_cm: default_wall_threshold_cm(),
            sensor_max_range_cm: default_sensor_max_range_cm(),
            tick_period_ms: default_tick_period_ms(),
            settle_ms: default_settle_ms(),
            sensor_dwell_ms: default_sensor_dwell_ms(),
            turn_dwell_ms: default_turn_dwell_ms(),
            backtrack_dwell_ms: default_backtrack_dwell_ms(),
            start_x: default_start_x(),
            start_y: default_start_y(),
            start_heading_deg: default_start_heading_deg(),
        }
    }
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: 0.0,
            kd: default_kd(),
            output_limit: default_output_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            drive: DriveConfig::default(),
            nav: NavConfig::default(),
            corrector: CorrectorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

impl NavConfig {
    /// Control tick period as a Duration
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Tick period in seconds, the dt used for heading integration
    pub fn tick_dt(&self) -> f32 {
        self.tick_period_ms as f32 / 1000.0
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn sensor_dwell(&self) -> Duration {
        Duration::from_millis(self.sensor_dwell_ms)
    }

    pub fn turn_dwell(&self) -> Duration {
        Duration::from_millis(self.turn_dwell_ms)
    }

    pub fn backtrack_dwell(&self) -> Duration {
        Duration::from_millis(self.backtrack_dwell_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device.device_type, "mock");
        assert_eq!(config.drive.base_speed, 120);
        assert_eq!(config.nav.cell_ticks, 360);
        assert_eq!(config.nav.wall_threshold_cm, 15);
        assert_eq!(config.nav.tick_period_ms, 50);
        assert_eq!(config.nav.start_x, 7);
        assert_eq!(config.nav.start_y, 0);
        assert_eq!(config.nav.start_heading_deg, 90);
        assert_eq!(config.corrector.output_limit, 30.0);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[device]"));
        assert!(toml_string.contains("[drive]"));
        assert!(toml_string.contains("[nav]"));
        assert!(toml_string.contains("[corrector]"));
        assert!(toml_string.contains("cell_ticks = 360"));

        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.drive.turn_speed, config.drive.turn_speed);
        assert_eq!(parsed.nav.backtrack_dwell_ms, config.nav.backtrack_dwell_ms);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
[drive]
base_speed = 90

[nav]
wall_threshold_cm = 20
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.drive.base_speed, 90);
        assert_eq!(config.drive.turn_speed, 100); // default
        assert_eq!(config.nav.wall_threshold_cm, 20);
        assert_eq!(config.nav.cell_ticks, 360); // default
        assert_eq!(config.device.device_type, "mock"); // whole section defaulted
    }

    #[test]
    fn test_durations() {
        let nav = NavConfig::default();
        assert_eq!(nav.tick_period(), Duration::from_millis(50));
        assert!((nav.tick_dt() - 0.05).abs() < 1e-6);
        assert_eq!(nav.turn_dwell(), Duration::from_millis(1000));
        assert_eq!(nav.backtrack_dwell(), Duration::from_millis(2000));
    }
}
