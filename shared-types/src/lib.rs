//! This crate implements various thread-safe types and helpers that the traffic light
//! and any driver code need access to.

use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

mod queue;
pub use queue::Queue;

/// Tracing targets used across the workspace.
///
/// These are grouped on a type so that call sites read as `target: Log::TrafficLight`,
/// which makes it easy to filter output for a single concern via `RUST_LOG`.
#[derive(Debug)]
pub struct Log;

#[allow(non_upper_case_globals)]
impl Log {
    /// Background cycling loop and light lifecycle events.
    pub const TrafficLight: &'static str = "traffic_light";

    /// Handoff queue internals. Very chatty; only emitted at `trace`.
    pub const Queue: &'static str = "traffic_light::queue";
}

#[derive(Debug)]
struct FlagInner {
    value: Mutex<bool>,
    changed: Condvar
}

/// A thread-safe flag that other threads can block on.
///
/// Unlike a bare atomic boolean, a `Flag` can be waited on with a timeout: a background
/// loop can sleep until its next deadline and still be woken immediately when someone
/// raises the flag (e.g, to request shutdown). Clones share the same underlying flag.
#[derive(Clone, Debug)]
pub struct Flag(Arc<FlagInner>);

impl Flag {
    /// Initializes and returns a new `Flag`.
    pub fn new(val: bool) -> Self {
        Self(Arc::new(FlagInner {
            value: Mutex::new(val),
            changed: Condvar::new()
        }))
    }

    /// Sets the value of this `Flag`, waking every thread blocked in `wait_timeout`.
    pub fn set(&self, val: bool) {
        let mut value = self.0.value.lock().unwrap_or_else(PoisonError::into_inner);
        *value = val;
        drop(value);

        self.0.changed.notify_all();
    }

    /// Gets the raw boolean value of this `Flag`.
    pub fn get(&self) -> bool {
        *self.0.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the flag is raised or `timeout` has elapsed, whichever comes first.
    ///
    /// Returns the value of the flag at the point we stopped waiting; `false` therefore
    /// means the full timeout elapsed. Spurious wakeups are absorbed internally.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let value = self.0.value.lock().unwrap_or_else(PoisonError::into_inner);

        let (value, _result) = self.0.changed
            .wait_timeout_while(value, timeout, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);

        *value
    }
}

/// Types can implement this in order to be used with `AtomicState`.
pub trait AtomicStateTransform {
    /// Convert the value to an `i8` representation.
    fn to_i8(&self) -> i8;

    /// Map an `i8` to a value.
    ///
    /// Implementing types might consider using `std::unreachable!()` for
    /// match arms that can never be hit.
    fn from_i8(value: i8) -> Self;
}

/// A thread safe state marker that uses atomics rather than any form of mutex.
///
/// Internally, the held type must implement `AtomicStateTransform`; the values
/// must map cleanly to an `i8`. If you require a state that holds its own state,
/// then you probably want a mutex.
#[derive(Clone, Debug)]
pub struct AtomicState<T> {
    inner: Arc<AtomicI8>,
    marker: std::marker::PhantomData<T>
}

impl<T> AtomicState<T>
where
    T: AtomicStateTransform,
{
    /// Initializes a new `AtomicState`.
    pub fn new(state: T) -> Self {
        Self {
            inner: Arc::new(AtomicI8::new(state.to_i8())),
            marker: std::marker::PhantomData
        }
    }

    /// Sets the underlying value of this state.
    pub fn set(&self, state: T) {
        self.inner.store(state.to_i8(), Ordering::Release);
    }

    /// Gets the underlying value of this state.
    pub fn get(&self) -> T {
        let value = self.inner.load(Ordering::Acquire);
        T::from_i8(value)
    }
}
