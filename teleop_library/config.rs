//! Teleop configuration resolved from [`RuntimeParams`]

use crate::algorithms::TurboCurves;
use serde::{Deserialize, Serialize};
use teleop_core::params::{
    PARAM_ANGULAR_MAX, PARAM_ANGULAR_MIN, PARAM_HZ, PARAM_LINEAR_BACKWARD_MAX,
    PARAM_LINEAR_BACKWARD_MIN, PARAM_LINEAR_FORWARD_MAX, PARAM_LINEAR_FORWARD_MIN, PARAM_STEPS,
    PARAM_TOPIC,
};
use teleop_core::{Rate, RuntimeParams, TeleopError, TeleopResult};

/// Upper bound on speed steps so step counts always fit an `i32` accumulator
pub const MAX_STEPS: u32 = i32::MAX as u32;

/// Velocity bounds of one motion axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeleopConfig {
    /// Publish rate while no key is pressed, in Hz
    pub hz: f64,
    /// Speed steps per direction
    pub steps: u32,
    pub linear_forward: SpeedRange,
    pub linear_backward: SpeedRange,
    pub angular: SpeedRange,
    /// Topic velocity commands are published on
    pub topic: String,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            hz: 10.0,
            steps: 4,
            linear_forward: SpeedRange::new(0.5, 1.0),
            linear_backward: SpeedRange::new(0.25, 0.5),
            angular: SpeedRange::new(0.7, 1.2),
            topic: "key_vel".to_string(),
        }
    }
}

impl TeleopConfig {
    /// Read and validate the configuration; missing keys fall back to defaults
    pub fn from_params(params: &RuntimeParams) -> TeleopResult<Self> {
        let defaults = Self::default();

        let steps: i64 = read(params, PARAM_STEPS, i64::from(defaults.steps))?;
        let steps = u32::try_from(steps).map_err(|_| {
            TeleopError::config(format!("parameter '{}' must be a positive integer, got {}", PARAM_STEPS, steps))
        })?;

        let config = Self {
            hz: read(params, PARAM_HZ, defaults.hz)?,
            steps,
            linear_forward: SpeedRange::new(
                read(params, PARAM_LINEAR_FORWARD_MIN, defaults.linear_forward.min)?,
                read(params, PARAM_LINEAR_FORWARD_MAX, defaults.linear_forward.max)?,
            ),
            linear_backward: SpeedRange::new(
                read(params, PARAM_LINEAR_BACKWARD_MIN, defaults.linear_backward.min)?,
                read(params, PARAM_LINEAR_BACKWARD_MAX, defaults.linear_backward.max)?,
            ),
            angular: SpeedRange::new(
                read(params, PARAM_ANGULAR_MIN, defaults.angular.min)?,
                read(params, PARAM_ANGULAR_MAX, defaults.angular.max)?,
            ),
            topic: read(params, PARAM_TOPIC, defaults.topic)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every startup invariant; any failure is fatal
    pub fn validate(&self) -> TeleopResult<()> {
        if !self.hz.is_finite() || self.hz <= 0.0 {
            return Err(TeleopError::config(format!(
                "rate must be a positive number of Hz, got {}",
                self.hz
            )));
        }
        Rate::new(self.hz).map_err(|e| match e {
            TeleopError::InvalidInput(msg) => TeleopError::Config(msg),
            other => other,
        })?;
        if self.steps > MAX_STEPS {
            return Err(TeleopError::config(format!(
                "at most {} speed steps are supported, got {}",
                MAX_STEPS, self.steps
            )));
        }
        if self.topic.trim().is_empty() {
            return Err(TeleopError::config("topic name must not be empty"));
        }
        TurboCurves::new(self)?;
        Ok(())
    }
}

/// Typed read that reports a present-but-mistyped key instead of defaulting
fn read<T: for<'de> Deserialize<'de>>(params: &RuntimeParams, key: &str, default: T) -> TeleopResult<T> {
    if !params.has(key) {
        return Ok(default);
    }
    params.get(key).ok_or_else(|| {
        TeleopError::config(format!(
            "parameter '{}' has the wrong type (expected {})",
            key,
            std::any::type_name::<T>()
        ))
    })
}
