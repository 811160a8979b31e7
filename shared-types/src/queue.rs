use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::Log;

struct QueueInner<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar
}

/// A thread-safe, blocking handoff queue.
///
/// Values are moved in by `send` and moved out by `receive`, in FIFO order. Consumers that
/// find the queue empty sleep on a condition variable rather than spinning; the lock is only
/// ever held for the push/pop itself and is released while a consumer is suspended.
///
/// Cloning a `Queue` is cheap and yields another handle to the same underlying queue, so the
/// producer and any number of consumers can each own one. Every sent value is delivered to
/// exactly one consumer; values are not broadcast.
pub struct Queue<T>(Arc<QueueInner<T>>);

impl<T> Queue<T> {
    /// Creates and returns a new, empty `Queue<T>`.
    pub fn new() -> Self {
        Self(Arc::new(QueueInner {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new()
        }))
    }

    // Every critical section here is a plain `VecDeque` operation that cannot leave the
    // deque half-modified, so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.0.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `value` to the back of the queue and wakes one waiting consumer.
    pub fn send(&self, value: T) {
        let mut items = self.lock();
        items.push_back(value);
        let pending = items.len();
        drop(items);

        self.0.available.notify_one();
        tracing::trace!(target: Log::Queue, pending, "Value sent");
    }

    /// Removes and returns the oldest value, blocking the calling thread until one exists.
    ///
    /// There is no timeout here: if nothing is ever sent, this never returns. Use
    /// `receive_timeout` when the caller needs a way out.
    pub fn receive(&self) -> T {
        let mut items = self.lock();

        loop {
            if let Some(value) = items.pop_front() {
                return value;
            }

            items = self.0.available.wait(items).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `receive`, but gives up once `timeout` has elapsed with nothing available.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        // A deadline past what `Instant` can represent is as good as no deadline at all.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.receive());
        };

        let mut items = self.lock();

        loop {
            if let Some(value) = items.pop_front() {
                return Some(value);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let (guard, _result) = self.0.available
                .wait_timeout(items, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);

            items = guard;
        }
    }

    /// Removes and returns the oldest value if there is one, without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Number of values currently waiting to be received.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every pending value.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("pending", &self.len())
            .finish()
    }
}
