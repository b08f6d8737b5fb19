use super::shutdown::Shutdown;
use crate::core::{Node, NodeInfo, NodeState};
use crate::error::{TeleopError, TeleopResult};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How long an idle scheduler (no runnable node) waits between stop checks
const IDLE_POLL: Duration = Duration::from_millis(50);

struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
}

/// Holds nodes and drives the tick loop
///
/// The scheduler does not pace itself: it ticks every node in priority
/// order, back to back, and nodes that need a fixed rate sleep inside their
/// own `tick`. The stop flag is checked once per pass, so shutdown takes
/// effect at tick boundaries.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    shutdown: Shutdown,
    scheduler_name: String,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            shutdown: Shutdown::new(),
            scheduler_name: "DefaultScheduler".to_string(),
        }
    }

    /// Set the scheduler name (also used as the background thread name)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Share an existing shutdown signal; call before adding nodes
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_signal(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Register a node; lower priority values tick first
    ///
    /// ```rust,ignore
    /// scheduler.add(Box::new(teleop), 0, Some(true));
    /// scheduler.add(Box::new(recorder), 100, None); // logging off
    /// ```
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context =
            NodeInfo::new(node_name.clone(), logging_enabled).with_shutdown(self.shutdown.clone());

        // stable: equal priorities keep insertion order
        let index = self
            .nodes
            .iter()
            .position(|n| n.priority > priority)
            .unwrap_or(self.nodes.len());
        self.nodes.insert(
            index,
            RegisteredNode {
                node,
                priority,
                initialized: false,
                context,
            },
        );

        tracing::debug!(
            scheduler = %self.scheduler_name,
            node = %node_name,
            priority,
            logging_enabled,
            "added node"
        );
        self
    }

    pub fn get_node_list(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|registered| registered.node.name().to_string())
            .collect()
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_triggered()
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Run in the current thread until shutdown is requested
    pub fn run(&mut self) -> TeleopResult<()> {
        self.run_with_limit(None)
    }

    /// Run for at most `duration`, then shut down gracefully
    pub fn run_for(&mut self, duration: Duration) -> TeleopResult<()> {
        self.run_with_limit(Some(duration))
    }

    /// Move the scheduler onto a dedicated thread
    pub fn spawn(mut self) -> TeleopResult<SchedulerHandle> {
        let shutdown = self.shutdown.clone();
        let name = self.scheduler_name.clone();

        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || self.run())
            .map_err(|e| TeleopError::Internal(format!("Failed to spawn scheduler thread: {}", e)))?;

        tracing::info!(scheduler = %name, "scheduler started in background");
        Ok(SchedulerHandle {
            name,
            shutdown,
            thread: Some(thread),
        })
    }

    fn run_with_limit(&mut self, duration: Option<Duration>) -> TeleopResult<()> {
        let start_time = Instant::now();
        self.init_nodes();

        let runnable = self.nodes.iter().filter(|n| n.initialized).count();
        if runnable == 0 {
            tracing::warn!(scheduler = %self.scheduler_name, "no runnable nodes, idling until shutdown");
        }

        while self.is_running() {
            if let Some(max_duration) = duration {
                if start_time.elapsed() >= max_duration {
                    tracing::info!(scheduler = %self.scheduler_name, "reached time limit of {:?}", max_duration);
                    break;
                }
            }

            if runnable == 0 {
                self.shutdown.wait_timeout(IDLE_POLL);
                continue;
            }

            for registered in self.nodes.iter_mut().filter(|n| n.initialized) {
                registered.context.start_tick();
                registered.node.tick(&mut registered.context);
                registered.context.record_tick();
            }
        }

        self.shutdown_nodes();
        tracing::info!(scheduler = %self.scheduler_name, "scheduler shutdown complete");
        Ok(())
    }

    fn init_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|n| !n.initialized) {
            let ctx = &mut registered.context;
            ctx.set_state(NodeState::Initializing);
            match registered.node.init(ctx) {
                Ok(()) => {
                    registered.initialized = true;
                    ctx.set_state(NodeState::Running);
                    tracing::debug!(node = registered.node.name(), "initialized node");
                }
                Err(e) => {
                    ctx.transition_to_error(format!("Initialization failed: {}", e));
                }
            }
        }
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|n| n.initialized) {
            let ctx = &mut registered.context;
            ctx.set_state(NodeState::Stopping);
            match registered.node.shutdown(ctx) {
                Ok(()) => ctx.set_state(NodeState::Stopped),
                Err(e) => ctx.transition_to_error(format!("Shutdown failed: {}", e)),
            }
            registered.initialized = false;
        }
    }
}

/// Handle to a scheduler running on its own thread
///
/// Dropping the handle stops and joins the thread.
pub struct SchedulerHandle {
    name: String,
    shutdown: Shutdown,
    thread: Option<JoinHandle<TeleopResult<()>>>,
}

impl SchedulerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shutdown_signal(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Whether the background thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }

    /// Request shutdown and block until the thread has exited
    pub fn stop(mut self) -> TeleopResult<()> {
        self.shutdown.trigger();
        self.join_thread()
    }

    /// Block until the thread exits on its own
    pub fn join(mut self) -> TeleopResult<()> {
        self.join_thread()
    }

    fn join_thread(&mut self) -> TeleopResult<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| {
                TeleopError::Internal(format!("Scheduler thread '{}' panicked", self.name))
            })?,
            None => Ok(()),
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown.trigger();
            if let Err(e) = self.join_thread() {
                tracing::error!("{}", e);
            }
        }
    }
}
