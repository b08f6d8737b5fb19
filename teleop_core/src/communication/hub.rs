use super::topic::Topic;
use crate::core::node::{LogSummary, NodeInfo};
use crate::error::TeleopResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default number of messages retained per topic
pub const DEFAULT_CAPACITY: usize = 1024;

/// Lock-free counters for Hub monitoring
#[derive(Debug, Default)]
struct AtomicHubMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    send_failures: AtomicU64,
    recv_failures: AtomicU64,
}

impl AtomicHubMetrics {
    fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            recv_failures: self.recv_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a Hub's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub send_failures: u64,
    pub recv_failures: u64,
}

/// Publisher/subscriber endpoint on a named topic
///
/// Every Hub opened with the same name shares one topic. Each Hub reads
/// with its own cursor, starting at the messages published after it was
/// created.
pub struct Hub<T> {
    topic: Arc<Topic<T>>,
    topic_name: String,
    cursor: AtomicU64,
    metrics: Arc<AtomicHubMetrics>,
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Hub<T> {
    pub fn new(topic_name: &str) -> TeleopResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_CAPACITY)
    }

    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> TeleopResult<Self> {
        let topic = Topic::open(topic_name, capacity)?;
        let cursor = AtomicU64::new(topic.head());

        Ok(Hub {
            topic,
            topic_name: topic_name.to_string(),
            cursor,
            metrics: Arc::new(AtomicHubMetrics::default()),
        })
    }

    /// Publish a message
    ///
    /// The in-process ring never refuses a message, so this only returns
    /// `Err(msg)` if that changes; callers may treat it as infallible.
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>) -> Result<(), T>
    where
        T: LogSummary,
    {
        match ctx {
            Some(ctx) => {
                // summary before the move
                let summary = msg.log_summary();
                self.topic.push(msg);
                ctx.log_pub_summary(&self.topic_name, &summary);
            }
            None => {
                self.topic.push(msg);
            }
        }
        self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Take the next message this Hub has not seen yet
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let cursor = self.cursor.load(Ordering::Acquire);
        match self.topic.read_from(cursor) {
            Some((seq, msg)) => {
                self.cursor.store(seq + 1, Ordering::Release);
                if let Some(ctx) = ctx {
                    ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
                }
                self.metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                Some(msg)
            }
            None => {
                self.metrics.recv_failures.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn get_metrics(&self) -> HubMetrics {
        self.metrics.snapshot()
    }

    pub fn get_topic_name(&self) -> &str {
        &self.topic_name
    }
}
