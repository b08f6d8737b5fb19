//! # Keyboard teleop library
//!
//! ## Structure
//!
//! ```text
//! teleop_library/
//! ── algorithms/     # Step-to-velocity curves
//! ── messages/       # CmdVel
//! ── nodes/          # KeyTeleopNode, CmdVelRecorderNode
//! ── terminal/       # Key input and status screen (crossterm + scripted mock)
//! ── config.rs       # TeleopConfig resolved from runtime parameters
//! ── apps/           # key_teleop binary
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use teleop_library::prelude::*;
//! use teleop_core::Scheduler;
//!
//! let config = TeleopConfig::default();
//! let node = KeyTeleopNode::new(ScriptedTerminal::new(10), &config).unwrap();
//!
//! let mut scheduler = Scheduler::new().name("key_teleop");
//! scheduler.add(Box::new(node), 0, Some(true));
//! let handle = scheduler.spawn().unwrap();
//! handle.stop().unwrap();
//! ```

pub mod algorithms;
pub mod config;
pub mod messages;
pub mod nodes;
pub mod terminal;

pub use teleop_core::core::LogSummary;

pub use messages::*;

pub mod prelude {
    pub use crate::algorithms::{TurboCurves, VelocityCurve};
    pub use crate::config::{SpeedRange, TeleopConfig};
    pub use crate::messages::CmdVel;
    pub use crate::nodes::{CmdVelRecorderNode, KeyOutcome, KeyTeleopNode, TeleopState};
    pub use crate::terminal::{Key, ScriptedTerminal, StatusLayout, TerminalInterface};
    #[cfg(feature = "crossterm")]
    pub use crate::terminal::CrosstermWindow;
}
