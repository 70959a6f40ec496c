//! The coalesced object close queue (spec §4.9).
//!
//! Closing an object can itself be asynchronous (tearing down
//! subordinate state, releasing native resources). Callers may request
//! many closes in a burst; this queue coalesces them into a single
//! drain job per burst instead of spawning one task per object.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[async_trait]
pub trait CloseableObject: Send + Sync {
    async fn close(&self);
}

#[derive(Default)]
struct Inner {
    pending: VecDeque<Arc<dyn CloseableObject>>,
    draining: bool,
}

/// A queue of objects awaiting close, drained one at a time on whatever
/// task posts the drain job.
///
/// `enqueue` posts a drain job to `post` only when the queue was
/// previously empty; a drain already in flight will pick up anything
/// enqueued after it started, since it re-checks the queue before
/// giving up the `draining` flag.
#[derive(Default)]
pub struct ObjectCloseQueue {
    inner: Mutex<Inner>,
}

impl ObjectCloseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `object` for closing. `post` receives a future to run
    /// (typically via a [`crate::dispatcher::Dispatcher`]) only when this
    /// call is the one that needs to kick off draining.
    pub fn enqueue<F>(self: &Arc<Self>, object: Arc<dyn CloseableObject>, post: F)
    where
        F: FnOnce(DrainJob),
    {
        let mut inner = self.inner.lock();
        inner.pending.push_back(object);
        if inner.draining {
            return;
        }
        inner.draining = true;
        drop(inner);
        post(DrainJob { queue: self.clone() });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let next = {
                let mut inner = self.inner.lock();
                match inner.pending.pop_front() {
                    Some(obj) => obj,
                    None => {
                        inner.draining = false;
                        return;
                    }
                }
            };
            next.close().await;
        }
    }
}

/// A pending drain, handed to whatever scheduling facility the caller
/// uses (the dispatcher, in production).
pub struct DrainJob {
    queue: Arc<ObjectCloseQueue>,
}

impl DrainJob {
    pub async fn run(self) {
        self.queue.drain().await;
    }
}

#[cfg(test)]
#[path = "close_queue_tests.rs"]
mod tests;
