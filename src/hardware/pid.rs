//! Bounded PID yaw corrector.
//!
//! Reference implementation of the [`YawCorrector`](super::YawCorrector)
//! collaborator: a PID on the heading error with output clamped to the
//! configured limit (±30 by default) and integral anti-windup at the same
//! bound.

use super::YawCorrector;
use crate::config::CorrectorConfig;

/// PID controller with output clamping
pub struct YawPid {
    kp: f32,
    ki: f32,
    kd: f32,
    output_limit: f32,
    integral: f32,
    prev_error: f32,
    first_update: bool,
}

impl YawPid {
    pub fn new(config: &CorrectorConfig) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            output_limit: config.output_limit.abs(),
            integral: 0.0,
            prev_error: 0.0,
            first_update: true,
        }
    }

    /// Clear integrator and derivative history
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.first_update = true;
    }
}

impl YawCorrector for YawPid {
    fn correct(&mut self, error_deg: f32, dt: f32) -> f32 {
        self.integral = (self.integral + error_deg * dt).clamp(-self.output_limit, self.output_limit);

        let derivative = if self.first_update || dt <= 0.0 {
            self.first_update = false;
            0.0
        } else {
            (error_deg - self.prev_error) / dt
        };
        self.prev_error = error_deg;

        let output = self.kp * error_deg + self.ki * self.integral + self.kd * derivative;
        output.clamp(-self.output_limit, self.output_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(kp: f32, ki: f32, kd: f32) -> YawPid {
        YawPid::new(&CorrectorConfig {
            kp,
            ki,
            kd,
            output_limit: 30.0,
        })
    }

    #[test]
    fn test_zero_error_zero_output() {
        let mut p = pid(0.8, 0.1, 0.05);
        assert_eq!(p.correct(0.0, 0.05), 0.0);
        assert_eq!(p.correct(0.0, 0.05), 0.0);
    }

    #[test]
    fn test_proportional_response() {
        let mut p = pid(0.5, 0.0, 0.0);
        let out = p.correct(10.0, 0.05);
        assert!((out - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_output_clamped() {
        let mut p = pid(10.0, 0.0, 0.0);
        assert_eq!(p.correct(500.0, 0.05), 30.0);
        assert_eq!(p.correct(-500.0, 0.05), -30.0);
    }

    #[test]
    fn test_integral_windup_bounded() {
        let mut p = pid(0.0, 1.0, 0.0);
        // Hold a large error: integral must saturate rather than grow without bound
        for _ in 0..10_000 {
            let out = p.correct(1000.0, 0.05);
            assert!(out <= 30.0);
        }
        // After saturation, a small opposing error still has effect
        let out = p.correct(-1000.0, 0.05);
        assert!(out < 30.0);
    }

    #[test]
    fn test_derivative_skipped_on_first_update() {
        let mut p = pid(0.0, 0.0, 1.0);
        // No previous error, so the first derivative term is zero
        assert_eq!(p.correct(100.0, 0.05), 0.0);
        // Second call sees no change in error: derivative still zero
        assert_eq!(p.correct(100.0, 0.05), 0.0);
        // Error drop produces a negative derivative
        assert!(p.correct(50.0, 0.05) < 0.0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut p = pid(0.0, 1.0, 1.0);
        p.correct(100.0, 0.05);
        p.correct(100.0, 0.05);
        p.reset();
        assert_eq!(p.correct(0.0, 0.05), 0.0);
    }
}
