use serde::{Deserialize, Serialize};
use teleop_core::LogSummary;

/// Command velocity message for robot control
///
/// Linear velocity along the robot's forward axis and angular velocity
/// around its vertical axis, both signed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdVel {
    pub stamp_nanos: u64,
    pub linear: f64,  // m/s, positive forward
    pub angular: f64, // rad/s, positive counter-clockwise
}

impl CmdVel {
    /// Create a new CmdVel message with current timestamp
    pub fn new(linear: f64, angular: f64) -> Self {
        Self {
            stamp_nanos: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64,
            linear,
            angular,
        }
    }

    /// Create a zero velocity command (stop)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn with_timestamp(linear: f64, angular: f64, stamp_nanos: u64) -> Self {
        Self {
            stamp_nanos,
            linear,
            angular,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl Default for CmdVel {
    fn default() -> Self {
        Self::zero()
    }
}

impl LogSummary for CmdVel {
    fn log_summary(&self) -> String {
        format!("lin={:.3}, ang={:.3}", self.linear, self.angular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cmd_vel_creation() {
        let cmd = CmdVel::new(1.5, 0.8);
        assert_relative_eq!(cmd.linear, 1.5);
        assert_relative_eq!(cmd.angular, 0.8);
        assert!(cmd.stamp_nanos > 0);
    }

    #[test]
    fn test_cmd_vel_zero() {
        let cmd = CmdVel::zero();
        assert!(cmd.is_zero());
    }

    #[test]
    fn test_cmd_vel_with_timestamp() {
        let cmd = CmdVel::with_timestamp(2.0, 1.0, 123456789);
        assert_eq!(cmd.stamp_nanos, 123456789);
    }

    #[test]
    fn test_log_summary() {
        let cmd = CmdVel::with_timestamp(-0.25, 0.8667, 1);
        assert_eq!(cmd.log_summary(), "lin=-0.250, ang=0.867");
    }

    #[test]
    fn test_json_shape() {
        let cmd = CmdVel::with_timestamp(0.5, -0.7, 42);
        let json = serde_json::to_value(cmd).unwrap();
        assert_eq!(json["stamp_nanos"], 42);
        assert_eq!(json["linear"], 0.5);
        assert_eq!(json["angular"], -0.7);
    }
}
