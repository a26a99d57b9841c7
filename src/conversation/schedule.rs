//! Delayed side effects owned by the controller.
//!
//! Redirects, canned replies and auto-submits all run after a fixed delay.
//! Every one is tracked here so teardown can abort whatever has not fired.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ScheduledTasks {
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl ScheduledTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay` on the tokio runtime.
    pub fn schedule<F>(&mut self, label: &'static str, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.prune();
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;
        });
        debug!(task = label, delay_ms = delay.as_millis() as u64, "Scheduled");
        self.handles.push((label, handle));
    }

    /// Tasks that have not finished yet.
    pub fn pending(&mut self) -> usize {
        self.prune();
        self.handles.len()
    }

    /// Abort every task that has not fired. Returns how many were aborted.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for (label, handle) in self.handles.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                debug!(task = label, "Cancelled");
                cancelled += 1;
            }
        }
        cancelled
    }

    fn prune(&mut self) {
        self.handles.retain(|(_, h)| !h.is_finished());
    }
}

impl Drop for ScheduledTasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
