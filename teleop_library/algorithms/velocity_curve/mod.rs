//! Step-to-velocity curves
//!
//! A keyboard gives discrete speed levels ("steps"), a robot wants a
//! velocity. `VelocityCurve` spreads `steps` levels linearly from `min` (at
//! step 1) to `max` (at the last step); step 0 is standstill.
//!
//! # Example
//!
//! ```rust
//! use teleop_library::algorithms::velocity_curve::VelocityCurve;
//!
//! let forward = VelocityCurve::new(0.5, 1.0, 4).unwrap();
//! assert_eq!(forward.velocity(1.0, 0), 0.0);
//! assert_eq!(forward.velocity(1.0, 1), 0.5);
//! assert!((forward.velocity(1.0, 4) - 1.0).abs() < 1e-12);
//! ```

use crate::config::TeleopConfig;
use teleop_core::{TeleopError, TeleopResult};

/// Linear interpolation from `min` to `max` over `steps` discrete levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCurve {
    min: f64,
    max: f64,
    steps: u32,
    step_incr: f64,
}

impl VelocityCurve {
    /// Build a curve; `min` and `max` must be positive with `min <= max`,
    /// and there must be at least one step
    pub fn new(min: f64, max: f64, steps: u32) -> TeleopResult<Self> {
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max <= 0.0 {
            return Err(TeleopError::config(format!(
                "velocity bounds must be positive, got min={} max={}",
                min, max
            )));
        }
        if min > max {
            return Err(TeleopError::config(format!(
                "velocity min {} exceeds max {}",
                min, max
            )));
        }
        if steps == 0 {
            return Err(TeleopError::config("number of speed steps must be at least 1"));
        }

        // With a single step only `min` is ever reached
        let step_incr = if steps > 1 {
            (max - min) / f64::from(steps - 1)
        } else {
            0.0
        };

        Ok(Self {
            min,
            max,
            steps,
            step_incr,
        })
    }

    /// Velocity for `step` scaled by `direction` (usually -1.0, 0.0 or 1.0)
    ///
    /// Steps above the configured count are treated as the last step.
    pub fn velocity(&self, direction: f64, step: u32) -> f64 {
        if step == 0 {
            return 0.0;
        }
        let step = step.min(self.steps);
        direction * (self.min + self.step_incr * f64::from(step - 1))
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn step_increment(&self) -> f64 {
        self.step_incr
    }
}

/// The three curves a differential-drive teleop needs
///
/// Forward and backward are separate so reversing can be slower than
/// driving ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurboCurves {
    pub forward: VelocityCurve,
    pub backward: VelocityCurve,
    pub angular: VelocityCurve,
}

impl TurboCurves {
    pub fn new(config: &TeleopConfig) -> TeleopResult<Self> {
        let curve = |range: &crate::config::SpeedRange, axis: &str| {
            VelocityCurve::new(range.min, range.max, config.steps).map_err(|e| match e {
                TeleopError::Config(msg) => TeleopError::Config(format!("{}: {}", axis, msg)),
                other => other,
            })
        };

        Ok(Self {
            forward: curve(&config.linear_forward, "linear forward")?,
            backward: curve(&config.linear_backward, "linear backward")?,
            angular: curve(&config.angular, "angular")?,
        })
    }

    /// Signed (linear, angular) velocity for the given step counts
    pub fn twist(&self, linear_steps: i32, angular_steps: i32) -> (f64, f64) {
        let linear = if linear_steps >= 0 {
            self.forward.velocity(1.0, linear_steps.unsigned_abs())
        } else {
            self.backward.velocity(-1.0, linear_steps.unsigned_abs())
        };
        let angular = self
            .angular
            .velocity(f64::from(angular_steps.signum()), angular_steps.unsigned_abs());
        (linear, angular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_zero_is_standstill() {
        let curve = VelocityCurve::new(0.5, 1.0, 4).unwrap();
        assert_eq!(curve.velocity(1.0, 0), 0.0);
        assert_eq!(curve.velocity(-1.0, 0), 0.0);
        assert_eq!(curve.velocity(0.0, 0), 0.0);
    }

    #[test]
    fn test_last_step_reaches_max() {
        for (min, max, steps) in [(0.5, 1.0, 4), (0.25, 0.5, 4), (0.7, 1.2, 7), (1.0, 1.0, 3)] {
            let curve = VelocityCurve::new(min, max, steps).unwrap();
            assert_relative_eq!(curve.velocity(1.0, steps), max, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_first_step_is_min() {
        let curve = VelocityCurve::new(0.7, 1.2, 4).unwrap();
        assert_relative_eq!(curve.velocity(1.0, 1), 0.7);
    }

    #[test]
    fn test_single_step_uses_min() {
        let curve = VelocityCurve::new(0.5, 1.0, 1).unwrap();
        assert_relative_eq!(curve.velocity(1.0, 1), 0.5);
        assert_eq!(curve.step_increment(), 0.0);
    }

    #[test]
    fn test_monotonic_in_step() {
        let curve = VelocityCurve::new(0.3, 2.0, 10).unwrap();
        let mut previous = curve.velocity(1.0, 1);
        for step in 2..=10 {
            let v = curve.velocity(1.0, step);
            assert!(v >= previous, "step {} went from {} to {}", step, previous, v);
            previous = v;
        }
    }

    #[test]
    fn test_direction_scales_sign() {
        let curve = VelocityCurve::new(0.25, 0.5, 4).unwrap();
        assert_relative_eq!(curve.velocity(-1.0, 4), -0.5);
        assert_eq!(curve.velocity(0.0, 3), 0.0);
    }

    #[test]
    fn test_interpolated_angular_example() {
        let curve = VelocityCurve::new(0.7, 1.2, 4).unwrap();
        // 0.7 + 1 * (1.2 - 0.7) / 3
        assert_relative_eq!(curve.velocity(1.0, 2), 0.8666666666666667, epsilon = 1e-12);
    }

    #[test]
    fn test_step_beyond_count_is_clamped() {
        let curve = VelocityCurve::new(0.5, 1.0, 4).unwrap();
        assert_relative_eq!(curve.velocity(1.0, 9), 1.0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(matches!(VelocityCurve::new(0.0, 1.0, 4), Err(TeleopError::Config(_))));
        assert!(matches!(VelocityCurve::new(0.5, -1.0, 4), Err(TeleopError::Config(_))));
        assert!(matches!(VelocityCurve::new(0.5, 1.0, 0), Err(TeleopError::Config(_))));
        assert!(matches!(VelocityCurve::new(2.0, 1.0, 4), Err(TeleopError::Config(_))));
        assert!(VelocityCurve::new(f64::NAN, 1.0, 4).is_err());
    }

    #[test]
    fn test_twist_picks_curve_by_sign() {
        let curves = TurboCurves::new(&TeleopConfig::default()).unwrap();

        let (linear, angular) = curves.twist(4, 0);
        assert_relative_eq!(linear, 1.0);
        assert_eq!(angular, 0.0);

        let (linear, _) = curves.twist(-1, 0);
        assert_relative_eq!(linear, -0.25);

        let (_, angular) = curves.twist(0, -2);
        assert_relative_eq!(angular, -0.8666666666666667, epsilon = 1e-12);

        assert_eq!(curves.twist(0, 0), (0.0, 0.0));
    }

    #[test]
    fn test_turbo_error_names_axis() {
        let mut config = TeleopConfig::default();
        config.linear_backward.min = -1.0;
        let err = TurboCurves::new(&config).unwrap_err();
        assert!(err.to_string().contains("linear backward"));
    }
}
