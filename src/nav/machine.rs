//! Navigation state machine.
//!
//! The orchestrator for the whole robot: it owns the encoder bank, the
//! perception sampler, the heading controller, the pose and the path
//! memory, and runs once per fixed 50 ms control tick. Each tick issues at
//! most one drive-command group and at most one state transition; heading
//! integration runs unconditionally every tick, and the computed correction
//! feeds motor output on the following tick while driving or spinning.
//!
//! Maneuver completion is purely time-based: turns and the 180° backtrack
//! spin run open loop for a fixed dwell with no verification that the
//! physical maneuver achieved the intended heading change. The settle delay
//! between maneuver phases is a resume-after deadline, never a blocking
//! sleep inside the tick.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::config::{Config, DriveConfig, NavConfig};
use crate::error::{Error, Result};
use crate::hardware::DriveMotors;

use super::encoder::{EncoderBank, EncoderSnapshot};
use super::grid::DistanceField;
use super::heading::HeadingController;
use super::path::{Move, PathMemory};
use super::perception::PerceptionSampler;
use super::pose::{Heading, Pose};

/// Navigation state, one variant per state with only that state's data
#[derive(Clone, Copy, Debug)]
pub enum NavState {
    /// Driving straight across a cell
    Forward,

    /// Stopped at a decision point, waiting out the sensor dwell
    AwaitSensors { entered_at: Instant },

    /// Open-loop 90° left spin
    TurnLeft { entered_at: Instant },

    /// Open-loop 90° right spin
    TurnRight { entered_at: Instant },

    /// Resuming straight drive without a fresh cell boundary
    ContinueForward,

    /// Open-loop 180° reversal spin
    Backtrack { entered_at: Instant },
}

impl NavState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            NavState::Forward => "Forward",
            NavState::AwaitSensors { .. } => "AwaitSensors",
            NavState::TurnLeft { .. } => "TurnLeft",
            NavState::TurnRight { .. } => "TurnRight",
            NavState::ContinueForward => "ContinueForward",
            NavState::Backtrack { .. } => "Backtrack",
        }
    }
}

#[derive(Clone, Copy)]
enum TurnDir {
    Left,
    Right,
}

/// The navigation context: all mutable state, owned by the tick context
pub struct Navigator {
    state: NavState,
    pose: Pose,
    path: PathMemory,
    heading: HeadingController,
    perception: PerceptionSampler,
    encoders: Arc<EncoderBank>,
    drive: Box<dyn DriveMotors>,
    nav_cfg: NavConfig,
    drive_cfg: DriveConfig,
    /// Fixed integration step (seconds), from the tick period
    dt: f32,
    /// Dispatch is suppressed until this deadline passes (settle delay)
    resume_at: Option<Instant>,
    /// Correction computed on the previous tick, applied to drive output
    last_correction: f32,
    /// Terminal success flag; freezes drive and transitions permanently
    goal_reached: bool,
    tick_count: u64,
}

impl Navigator {
    pub fn new(
        config: &Config,
        drive: Box<dyn DriveMotors>,
        perception: PerceptionSampler,
        heading: HeadingController,
        encoders: Arc<EncoderBank>,
    ) -> Result<Self> {
        let start_heading = Heading::from_degrees(config.nav.start_heading_deg).ok_or_else(|| {
            Error::Config(format!(
                "start_heading_deg must be 0, 90, 180 or 270 (got {})",
                config.nav.start_heading_deg
            ))
        })?;
        let pose = Pose::new(config.nav.start_x, config.nav.start_y, start_heading);

        info!(
            "Navigator: start pose ({}, {}) facing {:?}",
            pose.cell_x, pose.cell_y, pose.heading
        );

        Ok(Self {
            state: NavState::Forward,
            pose,
            path: PathMemory::new(),
            heading,
            perception,
            encoders,
            drive,
            nav_cfg: config.nav.clone(),
            drive_cfg: config.drive.clone(),
            dt: config.nav.tick_dt(),
            resume_at: None,
            last_correction: 0.0,
            goal_reached: false,
            tick_count: 0,
        })
    }

    /// One control tick.
    ///
    /// Order per the control flow contract: snapshot encoders, evaluate the
    /// current state, then integrate heading and store the correction for
    /// the next tick's drive output.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        self.tick_count += 1;
        let snap = self.encoders.snapshot();

        if !self.goal_reached && !self.settling(now) {
            self.dispatch(snap, now)?;
        }

        // Heading integration runs every tick regardless of state
        self.last_correction = self.heading.update(self.dt)?;
        Ok(())
    }

    fn settling(&mut self, now: Instant) -> bool {
        match self.resume_at {
            Some(deadline) if now < deadline => true,
            Some(_) => {
                self.resume_at = None;
                false
            }
            None => false,
        }
    }

    fn dispatch(&mut self, snap: EncoderSnapshot, now: Instant) -> Result<()> {
        match self.state {
            NavState::Forward => self.forward(snap, now),
            NavState::AwaitSensors { entered_at } => self.await_sensors(entered_at, now),
            NavState::TurnLeft { entered_at } => self.turn(TurnDir::Left, entered_at, now),
            NavState::TurnRight { entered_at } => self.turn(TurnDir::Right, entered_at, now),
            NavState::ContinueForward => self.continue_forward(),
            NavState::Backtrack { entered_at } => self.backtrack(entered_at, now),
        }
    }

    fn forward(&mut self, snap: EncoderSnapshot, now: Instant) -> Result<()> {
        let cell_ticks = self.nav_cfg.cell_ticks;
        if snap.left >= cell_ticks || snap.right >= cell_ticks {
            // Cell boundary: either wheel reaching the threshold commits the advance
            self.drive.stop_all()?;
            self.encoders.take();
            self.resume_at = Some(now + self.nav_cfg.settle());
            self.path.push(Move::Advance);
            self.pose.advance();
            debug!(
                "Nav: advance committed, cell ({}, {}) facing {:?}",
                self.pose.cell_x, self.pose.cell_y, self.pose.heading
            );

            if DistanceField::is_goal(self.pose.cell_x, self.pose.cell_y) {
                self.goal_reached = true;
                info!(
                    "Nav: goal reached at ({}, {}) after {} ticks, {} moves recorded; drive frozen",
                    self.pose.cell_x,
                    self.pose.cell_y,
                    self.tick_count,
                    self.path.len()
                );
            } else {
                // Entry time lands at settle expiry so the sensor dwell
                // starts once the robot is stationary
                self.state = NavState::AwaitSensors {
                    entered_at: now + self.nav_cfg.settle(),
                };
            }
        } else {
            let base = self.drive_cfg.base_speed as f32;
            let (left, right) = self.corrected_pair(base, base);
            self.drive.set_left_speed(left)?;
            self.drive.set_right_speed(right)?;
        }
        Ok(())
    }

    fn await_sensors(&mut self, entered_at: Instant, now: Instant) -> Result<()> {
        if now.duration_since(entered_at) < self.nav_cfg.sensor_dwell() {
            return Ok(());
        }

        let readings = self.perception.sample();
        let threshold = self.nav_cfg.wall_threshold_cm;
        debug!(
            "Nav: readings right={}cm front={}cm left={}cm (threshold {}cm)",
            readings.right_cm, readings.front_cm, readings.left_cm, threshold
        );

        // Right-hand priority is absolute: an open right always wins
        if readings.right_open(threshold) {
            self.heading.step_target(90.0);
            self.path.push(Move::TurnRight);
            self.state = NavState::TurnRight { entered_at: now };
            info!("Nav: right open, turning right");
        } else if readings.left_open(threshold) {
            self.heading.step_target(-90.0);
            self.path.push(Move::TurnLeft);
            self.state = NavState::TurnLeft { entered_at: now };
            info!("Nav: left open, turning left");
        } else if !readings.front_open(threshold) {
            self.heading.step_target(180.0);
            self.path.push(Move::Backtrack);
            self.state = NavState::Backtrack { entered_at: now };
            info!("Nav: dead end, backtracking");
        } else {
            // Corridor: front open, both sides walled. Nothing is pushed.
            self.state = NavState::ContinueForward;
            debug!("Nav: corridor ahead, continuing forward");
        }
        Ok(())
    }

    fn turn(&mut self, dir: TurnDir, entered_at: Instant, now: Instant) -> Result<()> {
        if now.duration_since(entered_at) >= self.nav_cfg.turn_dwell() {
            self.drive.stop_all()?;
            self.encoders.take();
            self.resume_at = Some(now + self.nav_cfg.settle());
            match dir {
                TurnDir::Right => self.pose.turn_right(),
                TurnDir::Left => self.pose.turn_left(),
            }
            self.state = NavState::Forward;
            debug!("Nav: turn complete, facing {:?}", self.pose.heading);
        } else {
            let spin = self.drive_cfg.turn_speed as f32;
            let (left, right) = match dir {
                TurnDir::Right => self.corrected_pair(spin, -spin),
                TurnDir::Left => self.corrected_pair(-spin, spin),
            };
            self.drive.set_left_speed(left)?;
            self.drive.set_right_speed(right)?;
        }
        Ok(())
    }

    fn backtrack(&mut self, entered_at: Instant, now: Instant) -> Result<()> {
        if now.duration_since(entered_at) >= self.nav_cfg.backtrack_dwell() {
            self.drive.stop_all()?;
            self.encoders.take();
            self.resume_at = Some(now + self.nav_cfg.settle());
            // Audit only: the popped move never alters the drive
            match self.path.pop() {
                Some(mv) => debug!("Nav: backtrack popped {:?} from path memory", mv),
                None => debug!("Nav: backtrack with empty path memory"),
            }
            self.pose.reverse();
            self.state = NavState::Forward;
            debug!("Nav: backtrack complete, facing {:?}", self.pose.heading);
        } else {
            let spin = self.drive_cfg.backtrack_speed as f32;
            let (left, right) = self.corrected_pair(spin, -spin);
            self.drive.set_left_speed(left)?;
            self.drive.set_right_speed(right)?;
        }
        Ok(())
    }

    fn continue_forward(&mut self) -> Result<()> {
        // Base drive restored without correction; the corrector idles here
        let base = self.clamp_pwm(self.drive_cfg.base_speed as f32);
        self.drive.set_left_speed(base)?;
        self.drive.set_right_speed(base)?;
        self.state = NavState::Forward;
        Ok(())
    }

    /// Correction added to the left wheel and subtracted from the right,
    /// both clamped to the PWM range.
    fn corrected_pair(&self, left_base: f32, right_base: f32) -> (i16, i16) {
        (
            self.clamp_pwm(left_base + self.last_correction),
            self.clamp_pwm(right_base - self.last_correction),
        )
    }

    fn clamp_pwm(&self, speed: f32) -> i16 {
        let max = self.drive_cfg.max_pwm as f32;
        speed.clamp(-max, max) as i16
    }

    // Accessors

    /// Stop both motors. Called on shutdown paths outside the tick cycle.
    pub fn halt(&mut self) -> Result<()> {
        self.drive.stop_all()
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn moves(&self) -> &[Move] {
        self.path.moves()
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    pub fn heading_estimate(&self) -> (f32, f32) {
        (self.heading.current_yaw(), self.heading.target_yaw())
    }
}
