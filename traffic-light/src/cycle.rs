use rand::SeedableRng;
use rand::rngs::StdRng;

use signal_shared_types::{AtomicState, Flag, Log, Queue};

use crate::{CycleTiming, Phase};

/// Body of the background cycling thread.
///
/// Holds the current phase for a randomly drawn duration, then flips it and hands the
/// new phase to the queue. The wait between toggles is a timed wait on `stop`, so a
/// shutdown request interrupts a cycle immediately instead of at the next deadline.
///
/// Returns once `stop` is raised.
pub(crate) fn run(phase: AtomicState<Phase>, queue: Queue<Phase>, stop: Flag, timing: CycleTiming) {
    let mut rng = StdRng::from_entropy();

    tracing::info!(
        target: Log::TrafficLight,
        min_ms = timing.min_ms,
        max_ms = timing.max_ms,
        "Cycling thread started"
    );

    loop {
        let cycle = timing.draw(&mut rng);

        if stop.wait_timeout(cycle) {
            break;
        }

        let next = phase.get().toggled();
        phase.set(next);
        queue.send(next);

        tracing::debug!(target: Log::TrafficLight, held = ?cycle, "Light is now {next}");
    }

    tracing::info!(target: Log::TrafficLight, "Cycling thread stopped");
}
