use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use traffic_light::{CycleTiming, Error, Phase, TrafficLight};

fn fast_light(min_ms: u64, max_ms: u64) -> Arc<TrafficLight> {
    Arc::new(TrafficLight::with_timing(CycleTiming::new(min_ms, max_ms).unwrap()))
}

/// Records the order in which a single observer sees phases by watching `current_phase()`
/// change. Polling can miss a toggle under heavy load, but never reorders them.
fn observe_phases(light: &TrafficLight, count: usize, window: Duration) -> Vec<Phase> {
    let started = Instant::now();
    let mut seen = vec![light.current_phase()];

    while seen.len() < count && started.elapsed() < window {
        let phase = light.current_phase();
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }

        thread::sleep(Duration::from_millis(1));
    }

    seen
}

#[test]
fn waiter_unblocks_on_green_with_default_timing() {
    let light = Arc::new(TrafficLight::new());
    assert_eq!(light.current_phase(), Phase::Red);

    let started = Instant::now();
    light.simulate().unwrap();

    let waiter = {
        let light = Arc::clone(&light);
        thread::spawn(move || {
            light.wait_for_green();
            (light.current_phase(), started.elapsed())
        })
    };

    let (phase, elapsed) = waiter.join().expect("waiter panicked");
    assert_eq!(phase, Phase::Green);
    assert!(elapsed >= Duration::from_millis(4000), "toggled early after {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(6100), "toggled late after {elapsed:?}");

    light.stop().unwrap();
}

#[test]
fn phases_strictly_alternate_from_red() {
    let light = fast_light(20, 30);
    light.simulate().unwrap();

    let seen = observe_phases(&light, 7, Duration::from_secs(10));
    light.stop().unwrap();

    assert_eq!(seen[0], Phase::Red);
    assert!(seen.len() >= 3, "light barely cycled: {seen:?}");
    for pair in seen.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn toggles_respect_the_configured_cycle_range() {
    const MIN_MS: u64 = 100;
    const MAX_MS: u64 = 150;

    let light = fast_light(MIN_MS, MAX_MS);
    let started = Instant::now();
    light.simulate().unwrap();

    let mut previous = started;
    for round in 0..4 {
        light.wait_for_green();
        let now = Instant::now();
        let held = now - previous;

        // The first green comes after one cycle, every later one after a red cycle too.
        // Upper slack covers thread scheduling; the lower slack only covers jitter between
        // when the waiter and the light are each scheduled.
        let cycles = if round == 0 { 1 } else { 2 };
        let lower = Duration::from_millis(MIN_MS * cycles - 20);
        let upper = Duration::from_millis(MAX_MS * cycles + 200);

        assert!(held >= lower && held <= upper, "green after {held:?} in round {round}");
        previous = now;
    }

    light.stop().unwrap();
}

#[test]
fn every_toggle_is_delivered_in_order() {
    let light = fast_light(30, 40);
    light.simulate().unwrap();

    // Waiting for green repeatedly only ever consumes green values, and the red in between
    // must already have been consumed, so each wait takes at least one full cycle.
    let started = Instant::now();
    for _ in 0..3 {
        assert!(light.wait_for_green_timeout(Duration::from_secs(5)));
    }

    assert!(started.elapsed() >= Duration::from_millis(30 * 5));
    light.stop().unwrap();
}

#[test]
fn waiter_times_out_while_light_stays_red() {
    let light = fast_light(60_000, 60_000);
    light.simulate().unwrap();

    let started = Instant::now();
    assert!(!light.wait_for_green_timeout(Duration::from_millis(200)));
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(light.current_phase(), Phase::Red);

    light.stop().unwrap();
}

#[test]
fn concurrent_waiters_are_all_released_eventually() {
    let light = fast_light(20, 40);
    light.simulate().unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let light = Arc::clone(&light);
            thread::spawn(move || light.wait_for_green_timeout(Duration::from_secs(10)))
        })
        .collect();

    for waiter in waiters {
        assert!(waiter.join().expect("waiter panicked"));
    }

    light.stop().unwrap();
}

#[test]
fn simulate_twice_is_rejected() {
    let light = fast_light(60_000, 60_000);
    light.simulate().unwrap();

    assert!(light.is_running());
    assert!(matches!(light.simulate(), Err(Error::AlreadyRunning)));

    light.stop().unwrap();
    assert!(!light.is_running());
}

#[test]
fn stop_interrupts_a_long_cycle_and_allows_restart() {
    let light = fast_light(60_000, 60_000);
    light.simulate().unwrap();

    let stopping = Instant::now();
    light.stop().unwrap();
    assert!(stopping.elapsed() < Duration::from_secs(5));
    assert_eq!(light.current_phase(), Phase::Red);

    light.simulate().unwrap();
    assert!(light.is_running());
    light.stop().unwrap();
}

#[test]
fn restarted_light_continues_from_its_current_phase() {
    let light = fast_light(20, 30);
    light.simulate().unwrap();
    light.wait_for_green();
    light.stop().unwrap();

    let stopped_on = light.current_phase();
    light.simulate().unwrap();
    let seen = observe_phases(&light, 2, Duration::from_secs(5));
    light.stop().unwrap();

    assert_eq!(seen[0], stopped_on);
    if let Some(next) = seen.get(1) {
        assert_eq!(*next, stopped_on.toggled());
    }
}

#[test]
fn dropping_a_running_light_joins_its_thread() {
    let light = TrafficLight::with_timing(CycleTiming::new(60_000, 60_000).unwrap());
    light.simulate().unwrap();

    let dropping = Instant::now();
    drop(light);
    assert!(dropping.elapsed() < Duration::from_secs(5));
}
