//! Maze simulation devices.
//!
//! Hardware-free stand-ins for the drive, gyro and range sensors, backed by
//! a small kinematic simulation of the robot inside an 8x8 walled maze.
//! Commanded wheel speeds become encoder edges (with optional gaussian slip
//! noise) and an angular rate; the three range sensors read walls off the
//! maze map for the robot's current cell and facing.

use super::{DeviceBundle, DriveMotors, RangeSensor, RateGyro};
use crate::config::Config;
use crate::error::Result;
use crate::nav::encoder::EncoderBank;
use crate::nav::pose::{Heading, GRID_MAX};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::sync::Arc;

/// Range reading published when a wall is adjacent (mm)
pub const WALL_READING_MM: u16 = 50;
/// Range reading published for an open side (mm)
pub const OPEN_READING_MM: u16 = 600;

const WALL_N: u8 = 0x01;
const WALL_E: u8 = 0x02;
const WALL_S: u8 = 0x04;
const WALL_W: u8 = 0x08;

fn wall_bit(heading: Heading) -> u8 {
    match heading {
        Heading::North => WALL_N,
        Heading::East => WALL_E,
        Heading::South => WALL_S,
        Heading::West => WALL_W,
    }
}

fn neighbor(x: u8, y: u8, heading: Heading) -> Option<(u8, u8)> {
    match heading {
        Heading::East if x < GRID_MAX => Some((x + 1, y)),
        Heading::North if y > 0 => Some((x, y - 1)),
        Heading::West if x > 0 => Some((x - 1, y)),
        Heading::South if y < GRID_MAX => Some((x, y + 1)),
        _ => None,
    }
}

/// 8x8 maze wall layout, one bitmask per cell
#[derive(Clone, Debug, Default)]
pub struct MazeMap {
    walls: [[u8; 8]; 8],
}

impl MazeMap {
    /// Empty map with no walls at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with the outer border walled in
    pub fn bordered() -> Self {
        let mut map = Self::new();
        for i in 0..=GRID_MAX {
            map.walls[0][i as usize] |= WALL_N;
            map.walls[GRID_MAX as usize][i as usize] |= WALL_S;
            map.walls[i as usize][0] |= WALL_W;
            map.walls[i as usize][GRID_MAX as usize] |= WALL_E;
        }
        map
    }

    /// Add a wall on one side of a cell (and the matching side of the
    /// neighboring cell, so the map stays consistent from both sides)
    pub fn set_wall(&mut self, x: u8, y: u8, heading: Heading) {
        if x > GRID_MAX || y > GRID_MAX {
            return;
        }
        self.walls[y as usize][x as usize] |= wall_bit(heading);
        if let Some((nx, ny)) = neighbor(x, y, heading) {
            self.walls[ny as usize][nx as usize] |= wall_bit(heading.reverse());
        }
    }

    /// Is there a wall on this side of the cell? The outside of the grid
    /// always counts as walled.
    pub fn has_wall(&self, x: u8, y: u8, heading: Heading) -> bool {
        if x > GRID_MAX || y > GRID_MAX {
            return true;
        }
        if neighbor(x, y, heading).is_none() {
            return true;
        }
        self.walls[y as usize][x as usize] & wall_bit(heading) != 0
    }

    /// Demo maze: bordered, with a few internal walls to force turns and
    /// at least one dead end
    pub fn demo() -> Self {
        let mut map = Self::bordered();
        // spine below the top row, leaving a gap at the west end
        for x in 1..=GRID_MAX {
            map.set_wall(x, 0, Heading::South);
        }
        // pocket on the east side
        map.set_wall(6, 2, Heading::West);
        map.set_wall(6, 3, Heading::West);
        map.set_wall(6, 3, Heading::South);
        // partial wall around the center
        map.set_wall(3, 2, Heading::South);
        map.set_wall(4, 3, Heading::East);
        map.set_wall(2, 4, Heading::North);
        map.set_wall(2, 5, Heading::East);
        map
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct SideReadingsMm {
    right: u16,
    front: u16,
    left: u16,
}

/// State shared between the simulator and its device handles
#[derive(Default)]
struct SimShared {
    /// Commanded wheel speeds (left, right)
    drive: Mutex<(i16, i16)>,
    /// Current angular rate (deg/s, clockwise positive)
    rate_dps: Mutex<f32>,
    /// Latest side range readings
    readings: Mutex<SideReadingsMm>,
}

/// Mock differential drive
pub struct SimDrive {
    shared: Arc<SimShared>,
    max_pwm: i16,
}

impl DriveMotors for SimDrive {
    fn set_left_speed(&mut self, speed: i16) -> Result<()> {
        self.shared.drive.lock().0 = speed.clamp(-self.max_pwm, self.max_pwm);
        Ok(())
    }

    fn set_right_speed(&mut self, speed: i16) -> Result<()> {
        self.shared.drive.lock().1 = speed.clamp(-self.max_pwm, self.max_pwm);
        Ok(())
    }

    fn stop_all(&mut self) -> Result<()> {
        *self.shared.drive.lock() = (0, 0);
        Ok(())
    }
}

/// Mock angular-rate sensor
pub struct SimGyro {
    shared: Arc<SimShared>,
}

impl RateGyro for SimGyro {
    fn sample(&mut self) -> Result<f32> {
        Ok(*self.shared.rate_dps.lock())
    }
}

#[derive(Clone, Copy)]
enum Side {
    Right,
    Front,
    Left,
}

/// Mock range sensor for one fixed side
pub struct SimRange {
    shared: Arc<SimShared>,
    side: Side,
}

impl RangeSensor for SimRange {
    fn sample(&mut self) -> Result<u16> {
        let readings = *self.shared.readings.lock();
        Ok(match self.side {
            Side::Right => readings.right,
            Side::Front => readings.front,
            Side::Left => readings.left,
        })
    }
}

/// Simulation tuning constants
#[derive(Clone, Copy, Debug)]
pub struct SimTuning {
    /// Encoder ticks per PWM unit per second of wheel drive
    pub ticks_per_unit_per_sec: f32,
    /// Spin rate per PWM unit of wheel-speed difference (deg/s)
    pub turn_deg_per_unit_per_sec: f32,
    /// Ticks spanning one maze cell (matches the navigator's threshold)
    pub cell_ticks: u32,
    /// Multiplicative encoder slip noise stddev (0.0 disables)
    pub slip_stddev: f32,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            ticks_per_unit_per_sec: 2.0,
            // (turn_speed - (-turn_speed)) * 0.45 = 90 deg/s at the default
            // turn speed of 100, so a 1000 ms dwell spins ~90°
            turn_deg_per_unit_per_sec: 0.45,
            cell_ticks: 360,
            slip_stddev: 0.0,
        }
    }
}

/// Kinematic maze simulation stepped by the control loop
pub struct MazeSim {
    map: MazeMap,
    shared: Arc<SimShared>,
    encoders: Arc<EncoderBank>,
    tuning: SimTuning,
    cell_x: u8,
    cell_y: u8,
    /// Continuous true heading in compass degrees [0, 360)
    facing_deg: f32,
    /// Forward travel accumulated toward the next cell boundary (ticks)
    travel_ticks: f32,
    left_accum: f32,
    right_accum: f32,
    rng: SmallRng,
}

impl MazeSim {
    pub fn new(
        map: MazeMap,
        encoders: Arc<EncoderBank>,
        start_x: u8,
        start_y: u8,
        start_heading: Heading,
        tuning: SimTuning,
        seed: u64,
    ) -> Self {
        let mut sim = Self {
            map,
            shared: Arc::new(SimShared::default()),
            encoders,
            tuning,
            cell_x: start_x.min(GRID_MAX),
            cell_y: start_y.min(GRID_MAX),
            facing_deg: start_heading.degrees() as f32,
            travel_ticks: 0.0,
            left_accum: 0.0,
            right_accum: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        };
        sim.publish_readings();
        sim
    }

    /// Device handles wired to this simulation
    pub fn devices(&self, max_pwm: i16) -> (SimDrive, SimGyro, SimRange, SimRange, SimRange) {
        (
            SimDrive {
                shared: Arc::clone(&self.shared),
                max_pwm,
            },
            SimGyro {
                shared: Arc::clone(&self.shared),
            },
            SimRange {
                shared: Arc::clone(&self.shared),
                side: Side::Right,
            },
            SimRange {
                shared: Arc::clone(&self.shared),
                side: Side::Front,
            },
            SimRange {
                shared: Arc::clone(&self.shared),
                side: Side::Left,
            },
        )
    }

    /// Advance the simulation by dt seconds
    pub fn step(&mut self, dt: f32) {
        let (left, right) = *self.shared.drive.lock();
        let (lf, rf) = (left as f32, right as f32);

        // Spin: clockwise positive when the left wheel leads. The compass
        // facing decreases under a clockwise spin (North 90° -> East 0°).
        let rate = (lf - rf) * self.tuning.turn_deg_per_unit_per_sec;
        *self.shared.rate_dps.lock() = rate;
        self.facing_deg = (self.facing_deg - rate * dt).rem_euclid(360.0);

        // Encoder edges from wheel motion, with fractional carry
        let left_ticks = lf.abs() * self.tuning.ticks_per_unit_per_sec * dt * self.slip();
        let right_ticks = rf.abs() * self.tuning.ticks_per_unit_per_sec * dt * self.slip();
        self.left_accum += left_ticks;
        self.right_accum += right_ticks;
        for _ in 0..self.left_accum.trunc() as u32 {
            self.encoders.increment_left();
        }
        for _ in 0..self.right_accum.trunc() as u32 {
            self.encoders.increment_right();
        }
        self.left_accum = self.left_accum.fract();
        self.right_accum = self.right_accum.fract();

        // Forward travel moves the true cell one step per cell's worth of
        // ticks, unless a wall blocks the way (the robot grinds in place)
        if left > 0 && right > 0 {
            let avg = (lf + rf) * 0.5;
            self.travel_ticks += avg * self.tuning.ticks_per_unit_per_sec * dt;
            if self.travel_ticks >= self.tuning.cell_ticks as f32 {
                self.travel_ticks -= self.tuning.cell_ticks as f32;
                let facing = self.quantized_facing();
                if !self.map.has_wall(self.cell_x, self.cell_y, facing) {
                    if let Some((nx, ny)) = neighbor(self.cell_x, self.cell_y, facing) {
                        self.cell_x = nx;
                        self.cell_y = ny;
                    }
                } else {
                    log::debug!(
                        "Sim: wall ahead at ({}, {}) facing {:?}, wheels slipping",
                        self.cell_x,
                        self.cell_y,
                        facing
                    );
                }
            }
        }

        self.publish_readings();
    }

    fn slip(&mut self) -> f32 {
        if self.tuning.slip_stddev > 0.0 {
            let noise: f32 = self.rng.sample(StandardNormal);
            1.0 + noise * self.tuning.slip_stddev
        } else {
            1.0
        }
    }

    /// Facing rounded to the nearest grid direction
    fn quantized_facing(&self) -> Heading {
        let quadrant = ((self.facing_deg / 90.0).round() as u16 % 4) * 90;
        Heading::from_degrees(quadrant).unwrap_or(Heading::East)
    }

    fn publish_readings(&mut self) {
        let facing = self.quantized_facing();
        let reading = |blocked: bool| {
            if blocked {
                WALL_READING_MM
            } else {
                OPEN_READING_MM
            }
        };
        let readings = SideReadingsMm {
            right: reading(self.map.has_wall(self.cell_x, self.cell_y, facing.right())),
            front: reading(self.map.has_wall(self.cell_x, self.cell_y, facing)),
            left: reading(self.map.has_wall(self.cell_x, self.cell_y, facing.left())),
        };
        *self.shared.readings.lock() = readings;
    }

    /// True cell position (ground truth, unavailable to the navigator)
    pub fn cell(&self) -> (u8, u8) {
        (self.cell_x, self.cell_y)
    }

    pub fn facing_deg(&self) -> f32 {
        self.facing_deg
    }

    /// Currently commanded wheel speeds
    pub fn wheel_speeds(&self) -> (i16, i16) {
        *self.shared.drive.lock()
    }
}

/// Build a device bundle around a maze simulation
pub fn mock_bundle(config: &Config, encoders: Arc<EncoderBank>, map: MazeMap) -> DeviceBundle {
    let start_heading =
        Heading::from_degrees(config.nav.start_heading_deg).unwrap_or(Heading::North);
    let tuning = SimTuning {
        cell_ticks: config.nav.cell_ticks,
        slip_stddev: config.device.sim_slip_stddev,
        ..SimTuning::default()
    };
    let sim = MazeSim::new(
        map,
        encoders,
        config.nav.start_x,
        config.nav.start_y,
        start_heading,
        tuning,
        config.device.sim_seed,
    );
    let (drive, gyro, right, front, left) = sim.devices(config.drive.max_pwm);
    DeviceBundle {
        drive: Box::new(drive),
        right: Box::new(right),
        front: Box::new(front),
        left: Box::new(left),
        gyro: Box::new(gyro),
        sim: Some(sim),
    }
}

/// Mock device with the built-in demo maze
pub fn create_mock_device(config: &Config, encoders: Arc<EncoderBank>) -> DeviceBundle {
    mock_bundle(config, encoders, MazeMap::demo())
}
