//! A single traffic light that cycles between red and green on its own background thread,
//! and lets any number of other threads block until it turns green.
//!
//! The general flow can be thought of as the following:
//!
//! ```text
//! ------------------     -------------------------     -----------------------
//! | cycling thread | --> | Queue<Phase> (handoff) | --> | wait_for_green(...) |
//! ------------------     -------------------------     -----------------------
//! ```
//!
//! Every toggle is stored in a lock-free `AtomicState` (so `current_phase()` never blocks)
//! and then moved into the handoff queue, where a waiting thread picks it up.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use signal_shared_types::{AtomicState, Flag, Log, Queue};

mod cycle;

mod error;
pub use error::{Error, Result};

mod phase;
pub use phase::Phase;

mod timing;
pub use timing::CycleTiming;

/// A traffic light that toggles between `Phase::Red` and `Phase::Green` at randomized intervals.
///
/// The light starts out red and sits idle until `simulate()` is called, which spawns the
/// cycling thread. The thread runs until `stop()` is called or the light is dropped.
///
/// All methods take `&self`, so a light is typically shared behind an `Arc` between the
/// thread that drives it and the threads waiting on it.
#[derive(Debug)]
pub struct TrafficLight {
    phase: AtomicState<Phase>,
    queue: Queue<Phase>,
    stop: Flag,
    timing: CycleTiming,
    threads: Mutex<Vec<JoinHandle<()>>>
}

impl TrafficLight {
    /// Creates a red light that will cycle every 4-6 seconds once started.
    pub fn new() -> Self {
        Self::with_timing(CycleTiming::default())
    }

    /// Creates a red light that draws its cycle durations from `timing`.
    pub fn with_timing(timing: CycleTiming) -> Self {
        Self {
            phase: AtomicState::new(Phase::Red),
            queue: Queue::new(),
            stop: Flag::new(false),
            timing,
            threads: Mutex::new(Vec::new())
        }
    }

    pub fn timing(&self) -> CycleTiming {
        self.timing
    }

    /// Returns the phase the light is showing right now. Never blocks.
    pub fn current_phase(&self) -> Phase {
        self.phase.get()
    }

    /// Blocks the calling thread until the light hands out a green phase.
    ///
    /// Phases are consumed in the order the light produced them; any red phases that
    /// are pending (or arrive while waiting) are discarded. Each green is delivered to a
    /// single waiter, so concurrent waiters are released one per green cycle.
    ///
    /// This will block forever on a light that is never started.
    pub fn wait_for_green(&self) {
        while !self.queue.receive().is_green() {}
    }

    /// Like `wait_for_green`, but gives up after `timeout`.
    ///
    /// Returns `true` if a green phase was received, `false` if the timeout elapsed first.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_for_green();
            return true;
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());

            match self.queue.receive_timeout(remaining) {
                Some(phase) if phase.is_green() => return true,
                Some(_) => continue,
                None => return false
            }
        }
    }

    fn lock_threads(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether the cycling thread is currently alive.
    pub fn is_running(&self) -> bool {
        self.lock_threads().iter().any(|handle| !handle.is_finished())
    }

    /// Starts cycling through phases on a background thread and returns immediately.
    ///
    /// The light continues from whatever phase it is currently showing. Phases left in the
    /// queue from a previous run are discarded so that waiters only ever see fresh toggles.
    pub fn simulate(&self) -> Result<()> {
        let mut threads = self.lock_threads();

        // A cycling thread that already exited (e.g after a panic) doesn't count as running.
        threads.retain(|handle| !handle.is_finished());

        if !threads.is_empty() {
            return Err(Error::AlreadyRunning);
        }

        self.stop.set(false);
        self.queue.clear();

        let phase = self.phase.clone();
        let queue = self.queue.clone();
        let stop = self.stop.clone();
        let timing = self.timing;

        let handle = thread::Builder::new()
            .name("TrafficLightCycleThread".into())
            .spawn(move || {
                cycle::run(phase, queue, stop, timing);
            })
            .map_err(|error| {
                tracing::error!(target: Log::TrafficLight, ?error, "Failed to launch cycling thread");
                Error::Spawn(error)
            })?;

        threads.push(handle);
        Ok(())
    }

    /// Stops the cycling thread and waits for it to exit.
    ///
    /// The light keeps the phase it was showing and can be started again with `simulate()`.
    /// Stopping a light that isn't running does nothing.
    pub fn stop(&self) -> Result<()> {
        // The lock is held across the join so a concurrent `simulate()` can't slip a new
        // thread in before the stop flag is cleared again.
        let mut threads = self.lock_threads();

        if threads.is_empty() {
            return Ok(());
        }

        self.stop.set(true);

        let mut result = Ok(());

        for handle in threads.drain(..) {
            if let Err(error) = handle.join() {
                tracing::error!(target: Log::TrafficLight, ?error, "Cycling thread panicked");
                result = Err(Error::Panicked);
            }
        }

        self.stop.set(false);
        result
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            tracing::error!(target: Log::TrafficLight, ?error, "Failed to stop traffic light cleanly");
        }
    }
}
