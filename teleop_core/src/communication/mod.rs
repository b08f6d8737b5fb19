//! # Communication layer
//!
//! Named in-process topics with publisher-subscriber semantics:
//!
//! - **Hub**: endpoint used by nodes to publish and receive
//! - **Topic**: bounded broadcast ring backing every Hub of one name
//!
//! ```rust,no_run
//! use teleop_core::communication::Hub;
//! let hub: Hub<String> = Hub::new("topic_name").unwrap();
//! ```

pub mod hub;
pub mod topic;

pub use hub::{Hub, HubMetrics, DEFAULT_CAPACITY};
pub use topic::Topic;
