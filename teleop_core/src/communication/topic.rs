use crate::error::{TeleopError, TeleopResult};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

// Safety limits to prevent dangerous configurations
const MAX_CAPACITY: usize = 1_000_000;
const MIN_CAPACITY: usize = 1;

type AnyTopic = Arc<dyn Any + Send + Sync>;

/// Process-wide topic table, keyed by topic name
static TOPICS: Lazy<Mutex<HashMap<String, AnyTopic>>> = Lazy::new(|| Mutex::new(HashMap::new()));

struct RingBuffer<T> {
    slots: VecDeque<T>,
    /// Sequence number the next pushed message will get
    next_seq: u64,
}

/// Bounded broadcast ring shared by every `Hub` opened on the same name
///
/// Messages carry a global sequence number. Readers keep their own cursor,
/// so every subscriber sees every retained message. When full, the oldest
/// message is dropped.
pub struct Topic<T> {
    name: String,
    capacity: usize,
    ring: Mutex<RingBuffer<T>>,
}

impl<T: Clone + Send + 'static> Topic<T> {
    fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            ring: Mutex::new(RingBuffer {
                slots: VecDeque::with_capacity(capacity.min(1024)),
                next_seq: 0,
            }),
        }
    }

    /// Open (or create) the topic called `name`
    pub fn open(name: &str, capacity: usize) -> TeleopResult<Arc<Self>>
    where
        T: Sync,
    {
        if name.is_empty() {
            return Err(TeleopError::invalid_input("Topic name must not be empty"));
        }
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(TeleopError::invalid_input(format!(
                "Topic capacity {} outside [{}, {}]",
                capacity, MIN_CAPACITY, MAX_CAPACITY
            )));
        }

        let mut topics = TOPICS.lock();
        if let Some(existing) = topics.get(name) {
            return existing.clone().downcast::<Topic<T>>().map_err(|_| {
                TeleopError::communication(format!(
                    "Topic '{}' already exists with a different message type than {}",
                    name,
                    std::any::type_name::<T>()
                ))
            });
        }

        let topic = Arc::new(Topic::new(name, capacity));
        topics.insert(name.to_string(), topic.clone() as AnyTopic);
        tracing::debug!(topic = name, capacity, "created topic");
        Ok(topic)
    }

    /// Append a message and return its sequence number
    pub fn push(&self, msg: T) -> u64 {
        let mut ring = self.ring.lock();
        if ring.slots.len() == self.capacity {
            ring.slots.pop_front();
        }
        ring.slots.push_back(msg);
        let seq = ring.next_seq;
        ring.next_seq += 1;
        seq
    }

    /// Read the first retained message with sequence `>= cursor`
    pub fn read_from(&self, cursor: u64) -> Option<(u64, T)> {
        let ring = self.ring.lock();
        let oldest = ring.next_seq - ring.slots.len() as u64;
        let seq = cursor.max(oldest);
        if seq >= ring.next_seq {
            return None;
        }
        let msg = ring.slots.get((seq - oldest) as usize)?.clone();
        Some((seq, msg))
    }

    /// Sequence number the next message will be assigned
    pub fn head(&self) -> u64 {
        self.ring.lock().next_seq
    }

    pub fn len(&self) -> usize {
        self.ring.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
