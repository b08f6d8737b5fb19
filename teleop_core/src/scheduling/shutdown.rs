use crate::error::{TeleopError, TeleopResult};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct ShutdownInner {
    triggered: Mutex<bool>,
    cond: Condvar,
}

/// One-shot stop request shared by the scheduler, its nodes and `main`
///
/// Cloning yields another handle to the same flag.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                triggered: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    /// Request shutdown and wake every waiter
    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        if !*triggered {
            *triggered = true;
            self.inner.cond.notify_all();
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Block until shutdown is requested
    pub fn wait(&self) {
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            self.inner.cond.wait(&mut triggered);
        }
    }

    /// Block until shutdown is requested or `timeout` elapses.
    /// Returns whether shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            if self.inner.cond.wait_until(&mut triggered, deadline).timed_out() {
                break;
            }
        }
        *triggered
    }

    /// Trigger this signal on SIGINT / SIGTERM
    ///
    /// Only one handler can be installed per process.
    pub fn install_ctrlc_handler(&self) -> TeleopResult<()> {
        let shutdown = self.clone();
        ctrlc::set_handler(move || {
            tracing::info!("Interrupt received, shutting down");
            shutdown.trigger();
        })
        .map_err(|e| TeleopError::Internal(format!("Failed to set signal handler: {}", e)))
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shutdown")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_is_shared_between_clones() {
        let shutdown = Shutdown::new();
        let other = shutdown.clone();
        assert!(!other.is_triggered());
        shutdown.trigger();
        assert!(other.is_triggered());
    }

    #[test]
    fn test_wait_wakes_on_trigger() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger.trigger();
        });
        shutdown.wait();
        assert!(shutdown.is_triggered());
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_timeout_expires() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.wait_timeout(Duration::from_millis(10)));
        shutdown.trigger();
        assert!(shutdown.wait_timeout(Duration::from_millis(10)));
    }
}
