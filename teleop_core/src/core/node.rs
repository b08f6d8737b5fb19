use crate::error::TeleopResult;
use crate::scheduling::Shutdown;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types
///
/// Published messages are logged through this summary instead of their
/// full `Debug` output.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Performance metrics for node execution
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
}

/// Per-node runtime context handed to every lifecycle call
pub struct NodeInfo {
    name: String,
    state: NodeState,
    logging_enabled: bool,

    metrics: NodeMetrics,
    creation_time: Instant,
    tick_start_time: Option<Instant>,

    // topic -> message count
    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,

    shutdown: Option<Shutdown>,
}

impl NodeInfo {
    pub fn new(node_name: impl Into<String>, logging_enabled: bool) -> Self {
        Self {
            name: node_name.into(),
            state: NodeState::Uninitialized,
            logging_enabled,
            metrics: NodeMetrics::default(),
            creation_time: Instant::now(),
            tick_start_time: None,
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
            shutdown: None,
        }
    }

    /// Attach the shutdown signal that `request_shutdown` triggers
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            tracing::debug!(node = %self.name, from = %self.state, to = %new_state, "state change");
            self.state = new_state;
        }
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    /// Ask the owning scheduler to stop at the next tick boundary
    pub fn request_shutdown(&mut self) {
        match &self.shutdown {
            Some(shutdown) => {
                self.log_info("shutdown requested");
                shutdown.trigger();
            }
            None => self.log_warning("shutdown requested but no shutdown signal is attached"),
        }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|s| s.is_triggered())
            .unwrap_or(false)
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;
            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            let total = self.metrics.avg_tick_duration_ms * (self.metrics.total_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total + duration_ms) / self.metrics.total_ticks as f64;
        }
    }

    /// Record a publish; used by `Hub::send` after the message has moved
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        if self.logging_enabled {
            tracing::trace!(node = %self.name, topic, "--PUB--> {}", summary);
        }
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
    }

    /// Record a receive; used by `Hub::recv`
    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        if self.logging_enabled {
            tracing::trace!(node = %self.name, topic, "<--SUB-- {}", summary);
        }
        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_received += 1;
    }

    pub fn log_info(&self, message: &str) {
        if self.logging_enabled {
            tracing::info!(node = %self.name, "{}", message);
        }
    }

    pub fn log_debug(&self, message: &str) {
        if self.logging_enabled {
            tracing::debug!(node = %self.name, "{}", message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.logging_enabled {
            tracing::warn!(node = %self.name, "{}", message);
        }
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        // errors are always logged
        tracing::error!(node = %self.name, "{}", message);
        self.metrics.errors_count += 1;
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }
    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }
    pub fn uptime(&self) -> Duration {
        self.creation_time.elapsed()
    }
}

/// Topic metadata for monitoring and introspection
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMetadata {
    pub topic_name: String,
    pub type_name: String,
}

impl TopicMetadata {
    pub fn of<T>(topic_name: &str) -> Self {
        Self {
            topic_name: topic_name.to_string(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}

/// A unit of work driven by the scheduler
///
/// Lifecycle: `init` once, `tick` repeatedly until shutdown is requested,
/// then `shutdown` once. A node that needs a fixed rate paces itself inside
/// `tick` (see [`crate::scheduling::Rate`]).
pub trait Node: Send {
    /// Get the node's name (must be unique within a scheduler)
    fn name(&self) -> &'static str;

    fn init(&mut self, ctx: &mut NodeInfo) -> TeleopResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    fn tick(&mut self, ctx: &mut NodeInfo);

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> TeleopResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }
}

impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for i32 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for u64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_metrics() {
        let mut ctx = NodeInfo::new("metrics", false);
        for _ in 0..3 {
            ctx.start_tick();
            ctx.record_tick();
        }
        assert_eq!(ctx.metrics().total_ticks, 3);
        assert!(ctx.metrics().max_tick_duration_ms >= ctx.metrics().last_tick_duration_ms);
    }

    #[test]
    fn test_record_tick_without_start_is_noop() {
        let mut ctx = NodeInfo::new("idle", false);
        ctx.record_tick();
        assert_eq!(ctx.metrics().total_ticks, 0);
    }

    #[test]
    fn test_request_shutdown_triggers_signal() {
        let shutdown = Shutdown::new();
        let mut ctx = NodeInfo::new("quitter", false).with_shutdown(shutdown.clone());

        assert!(!ctx.shutdown_requested());
        ctx.request_shutdown();
        assert!(shutdown.is_triggered());
        assert!(ctx.shutdown_requested());
    }

    #[test]
    fn test_request_shutdown_without_signal_warns() {
        let mut ctx = NodeInfo::new("orphan", false);
        ctx.request_shutdown();
        assert_eq!(ctx.metrics().warnings_count, 1);
    }

    #[test]
    fn test_pub_summary_counts() {
        let mut ctx = NodeInfo::new("pub", true);
        ctx.log_pub_summary("key_vel", "lin=0.000, ang=0.000");
        ctx.log_pub_summary("key_vel", "lin=0.500, ang=0.000");
        assert_eq!(ctx.published_topics().get("key_vel"), Some(&2));
        assert_eq!(ctx.metrics().messages_sent, 2);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(NodeState::Error("boom".into()).to_string(), "Error: boom");
        assert_eq!(NodeState::Running.to_string(), "Running");
    }
}
