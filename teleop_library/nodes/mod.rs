//! Teleop nodes
//!
//! - `KeyTeleopNode` - Arrow-key driven velocity commands on a terminal
//! - `CmdVelRecorderNode` - Records a velocity topic to a JSON-lines file

pub mod cmd_vel_recorder_node;
pub mod key_teleop_node;

pub use cmd_vel_recorder_node::CmdVelRecorderNode;
pub use key_teleop_node::{KeyOutcome, KeyTeleopNode, TeleopState};
