//! Message types published by the teleop nodes

pub mod cmd_vel;

pub use cmd_vel::CmdVel;
