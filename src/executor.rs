//! Shadow task execution contexts
//!
//! The shadow path (new flow, diff, redaction, logging) always runs on an
//! execution context separate from the caller's thread, so the production
//! path's latency is a function of the current flow alone. Callers can plug
//! in their own context via [`ShadowExecutor`]; the default grows without
//! bound, one worker thread per sampled call.

use crate::error::ExecuteError;

/// A unit of shadow work
pub type ShadowTask = Box<dyn FnOnce() + Send + 'static>;

/// Execution context for shadow tasks
///
/// Implementations must not run the task on the calling thread unless that is
/// explicitly their point (see [`InlineExecutor`]): the shadow flow relies on
/// `execute` returning promptly. A rejected submission is reported through the
/// error; the shadow flow catches and logs it.
pub trait ShadowExecutor: Send + Sync {
    /// Submit a task for execution
    ///
    /// # Errors
    /// Returns [`ExecuteError`] if the context cannot accept the task.
    fn execute(&self, task: ShadowTask) -> Result<(), ExecuteError>;
}

/// Default execution context: one detached OS thread per sampled call
///
/// Unbounded and growable. Threads are fire-and-forget; if the process exits,
/// in-flight shadow tasks are abandoned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPerTaskExecutor;

impl ThreadPerTaskExecutor {
    /// Create the default executor
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ShadowExecutor for ThreadPerTaskExecutor {
    fn execute(&self, task: ShadowTask) -> Result<(), ExecuteError> {
        std::thread::Builder::new()
            .name("shadow-flow-worker".into())
            .spawn(task)
            .map(drop)
            .map_err(ExecuteError::from)
    }
}

/// Runs the task on the calling thread, before `execute` returns
///
/// Defeats the non-interference guarantee on purpose; intended for tests that
/// need the shadow comparison to have completed by the time `compare` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl InlineExecutor {
    /// Create an inline executor
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ShadowExecutor for InlineExecutor {
    fn execute(&self, task: ShadowTask) -> Result<(), ExecuteError> {
        task();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn thread_per_task_runs_off_the_calling_thread() {
        let (tx, rx) = mpsc::channel();
        let caller = std::thread::current().id();

        ThreadPerTaskExecutor::new()
            .execute(Box::new(move || {
                tx.send(std::thread::current().id()).unwrap();
            }))
            .unwrap();

        let worker = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_ne!(caller, worker);
    }

    #[test]
    fn inline_executor_completes_before_returning() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        InlineExecutor::new()
            .execute(Box::new(move || flag.store(true, Ordering::SeqCst)))
            .unwrap();

        assert!(ran.load(Ordering::SeqCst));
    }
}
