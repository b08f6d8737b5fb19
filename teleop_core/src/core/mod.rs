//! # Core types and traits
//!
//! - **Node**: the base trait for every computational unit
//! - **NodeInfo**: runtime context provided to nodes during execution
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - Node is created with configuration
//! 2. **Initialization** - `init()` is called to set up resources
//! 3. **Execution** - `tick()` is called repeatedly by the scheduler
//! 4. **Shutdown** - `shutdown()` is called to clean up resources

pub mod node;

pub use node::{LogSummary, Node, NodeInfo, NodeMetrics, NodeState, TopicMetadata};
