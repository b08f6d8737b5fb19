//! Algorithms used by the teleop nodes

pub mod velocity_curve;

pub use velocity_curve::{TurboCurves, VelocityCurve};
