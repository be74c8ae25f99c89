//! Closed-loop heading control.
//!
//! Integrates angular-rate samples into a yaw estimate every control tick
//! and computes the error against a target yaw that the state machine steps
//! by ±90° on turns and +180° on a backtrack. The target is only ever
//! stepped relative to its own running value — it is never re-anchored to a
//! ground truth, so integration drift across repeated turns accumulates.
//! That is an accepted trade-off of the design.

use crate::error::Result;
use crate::hardware::{RateGyro, YawCorrector};

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Gyro-integrated yaw estimate with a bounded external corrector
pub struct HeadingController {
    gyro: Box<dyn RateGyro>,
    corrector: Box<dyn YawCorrector>,
    /// Integrated yaw in (-180, 180] degrees
    current_yaw: f32,
    /// Target yaw, stepped by the state machine
    target_yaw: f32,
    /// Error from the most recent update
    last_error: f32,
}

impl HeadingController {
    pub fn new(gyro: Box<dyn RateGyro>, corrector: Box<dyn YawCorrector>) -> Self {
        Self {
            gyro,
            corrector,
            current_yaw: 0.0,
            target_yaw: 0.0,
            last_error: 0.0,
        }
    }

    /// One integration step: sample the gyro, integrate over the fixed tick
    /// period, compute the error and return the bounded wheel correction.
    pub fn update(&mut self, dt: f32) -> Result<f32> {
        let rate = self.gyro.sample()?;
        self.current_yaw = wrap_degrees(self.current_yaw + rate * dt);
        self.last_error = self.target_yaw - self.current_yaw;
        Ok(self.corrector.correct(self.last_error, dt))
    }

    /// Step the target yaw by a relative delta (±90 on turns, +180 on
    /// backtrack), wrapped into (-180, 180].
    pub fn step_target(&mut self, delta_deg: f32) {
        self.target_yaw = wrap_degrees(self.target_yaw + delta_deg);
        log::debug!(
            "Heading: target stepped by {:+.0}° to {:.1}° (current {:.1}°)",
            delta_deg,
            self.target_yaw,
            self.current_yaw
        );
    }

    pub fn current_yaw(&self) -> f32 {
        self.current_yaw
    }

    pub fn target_yaw(&self) -> f32 {
        self.target_yaw
    }

    pub fn error(&self) -> f32 {
        self.last_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRateGyro(f32);

    impl RateGyro for FixedRateGyro {
        fn sample(&mut self) -> Result<f32> {
            Ok(self.0)
        }
    }

    struct PassThroughCorrector;

    impl YawCorrector for PassThroughCorrector {
        fn correct(&mut self, error_deg: f32, _dt: f32) -> f32 {
            error_deg
        }
    }

    fn controller(rate: f32) -> HeadingController {
        HeadingController::new(Box::new(FixedRateGyro(rate)), Box::new(PassThroughCorrector))
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(270.0), -90.0);
        assert_eq!(wrap_degrees(-270.0), 90.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-450.0), -90.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
    }

    #[test]
    fn test_integration_accumulates_rate() {
        let mut ctrl = controller(10.0); // 10 deg/s
        for _ in 0..20 {
            ctrl.update(0.05).unwrap();
        }
        // 1 second at 10 deg/s
        assert!((ctrl.current_yaw() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_yaw_stays_wrapped() {
        let mut ctrl = controller(90.0);
        for _ in 0..200 {
            ctrl.update(0.05).unwrap();
            let yaw = ctrl.current_yaw();
            assert!(yaw > -180.0 && yaw <= 180.0, "yaw = {}", yaw);
        }
    }

    #[test]
    fn test_error_tracks_target() {
        let mut ctrl = controller(0.0);
        ctrl.step_target(90.0);
        ctrl.update(0.05).unwrap();
        assert!((ctrl.error() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_steps_are_relative_and_wrapped() {
        let mut ctrl = controller(0.0);
        ctrl.step_target(90.0);
        ctrl.step_target(90.0);
        ctrl.step_target(90.0);
        // 270 wraps to -90
        assert!((ctrl.target_yaw() + 90.0).abs() < 1e-6);
        ctrl.step_target(180.0);
        assert!((ctrl.target_yaw() - 90.0).abs() < 1e-6);
    }
}
