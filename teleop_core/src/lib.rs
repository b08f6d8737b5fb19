//! # Teleop Core
//!
//! The runtime underneath the keyboard teleoperation tools:
//!
//! - **Nodes**: independent units with an init / tick / shutdown lifecycle
//! - **Communication**: publisher-subscriber messaging over named topics
//! - **Scheduling**: a tick loop that can run on its own thread, plus a fixed-rate sleeper
//! - **Params**: flat key-value configuration loaded from TOML or YAML
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use teleop_core::{Hub, Node, NodeInfo, Scheduler};
//!
//! struct ExampleNode {
//!     output: Hub<String>,
//! }
//!
//! impl Node for ExampleNode {
//!     fn name(&self) -> &'static str { "example" }
//!
//!     fn tick(&mut self, ctx: &mut NodeInfo) {
//!         let _ = self.output.send("hello".into(), Some(ctx));
//!     }
//! }
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod params;
pub mod scheduling;

pub use communication::Hub;
pub use crate::core::{LogSummary, Node, NodeInfo, NodeState, TopicMetadata};
pub use error::{TeleopError, TeleopResult};
pub use params::RuntimeParams;
pub use scheduling::{Rate, Scheduler, SchedulerHandle, Shutdown};
