//! # Scheduling
//!
//! - **Scheduler**: ticks registered nodes in priority order (0 = highest)
//! - **SchedulerHandle**: a scheduler moved onto its own thread, with stop + join
//! - **Rate**: fixed-rate sleeper nodes use to pace their own ticks
//! - **Shutdown**: shared stop request, optionally wired to Ctrl+C
//!
//! ## Usage
//!
//! ```rust,ignore
//! use teleop_core::Scheduler;
//!
//! let mut scheduler = Scheduler::new().name("teleop");
//! scheduler.add(Box::new(teleop_node), 0, Some(true));
//! let handle = scheduler.spawn()?;
//! handle.shutdown_signal().wait();
//! handle.stop()?;
//! ```

pub mod rate;
pub mod scheduler;
pub mod shutdown;

pub use rate::Rate;
pub use scheduler::{Scheduler, SchedulerHandle};
pub use shutdown::Shutdown;
