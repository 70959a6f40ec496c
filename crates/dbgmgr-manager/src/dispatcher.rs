//! The dispatcher contract (spec §4.1).
//!
//! A single-threaded serialization domain: jobs posted via [`Dispatcher::post`]
//! run in FIFO order, one at a time, on a dedicated tokio task. Every
//! state mutation and event emission in this crate originates from a job
//! run through this dispatcher.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type DispatchJob = Pin<Box<dyn Future<Output = ()> + Send>>;

tokio::task_local! {
    static ON_DISPATCHER: bool;
}

/// Handle for posting work onto the dispatcher's serialization domain.
///
/// Cloning shares the same underlying queue and background task.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<DispatchJob>,
}

impl Dispatcher {
    /// Spawn the background drain task and return a handle to it.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Self::drain(rx));
        (Self { tx }, handle)
    }

    async fn drain(mut rx: mpsc::UnboundedReceiver<DispatchJob>) {
        while let Some(job) = rx.recv().await {
            ON_DISPATCHER.scope(true, job).await;
        }
    }

    /// Post a unit of work. Runs after every previously-posted job has
    /// completed, and before any job posted after this call returns.
    ///
    /// A closed dispatcher (its task has exited) silently drops the job,
    /// matching spec §7's tolerance for the normal disconnect race: by
    /// the time a caller posts, the manager may already be shutting down.
    pub fn post<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let _ = self.tx.send(Box::pin(fut));
    }

    /// Asserts residency on the dispatcher thread (spec §4.1: "Every
    /// method whose name carries a DbgThread suffix asserts residency on
    /// that thread"). No-op in release builds; panics in debug builds
    /// when called from outside a dispatched job.
    pub fn verify_access() {
        let on_dispatcher = ON_DISPATCHER.try_with(|v| *v).unwrap_or(false);
        debug_assert!(on_dispatcher, "dbgThread-suffixed call made off the dispatcher thread");
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
