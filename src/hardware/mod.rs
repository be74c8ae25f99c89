//! Hardware abstraction traits and device factory.
//!
//! The navigation core talks to actuators and sensors only through these
//! traits. The shipped driver is the maze simulator in [`mock`]; real device
//! bring-up (bus addressing, pin and interrupt wiring) lives outside this
//! crate and would plug in behind the same traits.

pub mod mock;
pub mod pid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::nav::encoder::EncoderBank;
use std::sync::Arc;

/// Differential drive actuator
pub trait DriveMotors: Send {
    /// Set left wheel speed; sign is direction, magnitude is clamped to the
    /// device PWM range by the implementation.
    fn set_left_speed(&mut self, speed: i16) -> Result<()>;

    /// Set right wheel speed
    fn set_right_speed(&mut self, speed: i16) -> Result<()>;

    /// Stop both motors immediately
    fn stop_all(&mut self) -> Result<()>;
}

/// Single fixed-mount range sensor
pub trait RangeSensor: Send {
    /// One synchronous distance reading in millimetres
    fn sample(&mut self) -> Result<u16>;
}

/// Angular-rate sensor about the vertical axis
pub trait RateGyro: Send {
    /// One synchronous rate reading in degrees per second
    fn sample(&mut self) -> Result<f32>;
}

/// Bounded yaw corrector.
///
/// Implementations must clamp their output; the state machine adds the
/// returned correction to one wheel's speed and subtracts it from the
/// other's without further bounding.
pub trait YawCorrector: Send {
    fn correct(&mut self, error_deg: f32, dt: f32) -> f32;
}

/// Everything the navigator needs from a device driver
pub struct DeviceBundle {
    pub drive: Box<dyn DriveMotors>,
    pub right: Box<dyn RangeSensor>,
    pub front: Box<dyn RangeSensor>,
    pub left: Box<dyn RangeSensor>,
    pub gyro: Box<dyn RateGyro>,
    /// Present only for the mock driver; the control loop steps it
    pub sim: Option<mock::MazeSim>,
}

/// Create the device bundle named by the configuration.
///
/// Bring-up failure here is fatal: control never starts without a device.
pub fn create_device(config: &Config, encoders: Arc<EncoderBank>) -> Result<DeviceBundle> {
    match config.device.device_type.as_str() {
        "mock" => Ok(mock::create_mock_device(config, encoders)),
        other => Err(Error::NotSupported(format!(
            "unknown device type '{}'",
            other
        ))),
    }
}
