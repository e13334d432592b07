//! Cancelable scheduled callbacks.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// A callback that runs once after a delay, aborted when dropped.
pub struct ScheduledTask {
    label: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Schedule `callback` on `runtime` to run after `delay`.
    pub fn spawn<F>(runtime: &Handle, label: &'static str, delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });

        Self {
            label,
            handle: Some(handle),
        }
    }

    /// Cancel the callback if it has not run yet.
    pub fn cancel(mut self) {
        self.abort();
    }

    /// Let the task run to completion without holding a cancel handle.
    ///
    /// Used by the callback itself when it retires its own handle.
    pub fn detach(mut self) {
        self.handle.take();
    }

    /// Check if the callback has run or been aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!(task = self.label, "Scheduled task cancelled");
            }
            handle.abort();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.abort();
    }
}

/// At most one pending [`ScheduledTask`] of a kind.
///
/// Arming again replaces the pending task. Every arm or cancel bumps a
/// generation counter; a callback must pass its generation to
/// [`SingleFlightTimer::complete`], which refuses stale generations, so a
/// callback that fired just before being superseded never takes effect.
pub struct SingleFlightTimer {
    label: &'static str,
    runtime: Handle,
    pending: Option<ScheduledTask>,
    generation: u64,
}

impl SingleFlightTimer {
    /// Create an idle timer whose callbacks run on `runtime`.
    pub fn new(label: &'static str, runtime: Handle) -> Self {
        Self {
            label,
            runtime,
            pending: None,
            generation: 0,
        }
    }

    /// Arm the timer, replacing any pending callback.
    ///
    /// Returns true if a pending callback was superseded.
    pub fn arm<F>(&mut self, delay: Duration, callback: F) -> bool
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let superseded = self.pending.take().map(ScheduledTask::cancel).is_some();

        self.pending = Some(ScheduledTask::spawn(&self.runtime, self.label, delay, move || {
            callback(generation)
        }));

        superseded
    }

    /// Cancel the pending callback. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        self.pending.take().map(ScheduledTask::cancel).is_some()
    }

    /// Claim the timer for a firing callback.
    ///
    /// Returns false if `generation` was superseded or cancelled.
    pub fn complete(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.pending.take() {
            Some(task) => {
                task.detach();
                true
            }
            None => false,
        }
    }

    /// Check if a callback is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
