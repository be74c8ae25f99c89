//! Marga - reactive grid-maze navigation
//!
//! A right-hand wall-following navigator for a differential-drive robot in
//! an 8x8 maze. The robot dead-reckons its cell position from wheel encoder
//! counts, holds its heading with a gyro-fed PID corrector, senses walls
//! with three range sensors and records its moves so dead ends can be
//! backed out of. A static distance field over the grid tells it when the
//! goal cell has been reached.
//!
//! The crate splits into:
//! - [`nav`] - the navigation state machine and its supporting pieces
//!   (pose tracking, encoder accumulation, heading control, wall
//!   perception, move history, goal detection)
//! - [`hardware`] - device traits for the drive, gyro and range sensors,
//!   plus a maze simulation implementing them for desktop runs
//! - [`config`] - TOML configuration with full defaults

pub mod config;
pub mod error;
pub mod hardware;
pub mod nav;

pub use config::Config;
pub use error::{Error, Result};
