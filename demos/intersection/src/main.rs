use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use signal_shared_types::Log;
use traffic_light::{CycleTiming, TrafficLight};

const VEHICLES: usize = 3;

/// Loads cycle timing from the JSON file named by the first argument, if any.
fn load_timing() -> Result<CycleTiming, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            tracing::info!(target: Log::TrafficLight, "Loaded timing from {path}");
            Ok(CycleTiming::from_json(&json)?)
        },

        None => Ok(CycleTiming::default())
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    let timing = match load_timing() {
        Ok(timing) => timing,
        Err(error) => {
            tracing::error!(target: Log::TrafficLight, %error, "Invalid timing configuration");
            std::process::exit(1);
        }
    };

    let light = Arc::new(TrafficLight::with_timing(timing));

    if let Err(error) = light.simulate() {
        tracing::error!(target: Log::TrafficLight, %error, "Unable to start the light");
        std::process::exit(1);
    }

    let vehicles: Vec<_> = (0..VEHICLES)
        .map(|id| {
            let light = Arc::clone(&light);

            thread::spawn(move || {
                // Stagger arrivals so they don't all queue up on the same cycle.
                thread::sleep(Duration::from_millis(250 * id as u64));
                tracing::info!("Vehicle {id} waiting at a {} light", light.current_phase());

                light.wait_for_green();
                tracing::info!("Vehicle {id} crossing on {}", light.current_phase());
            })
        })
        .collect();

    for vehicle in vehicles {
        if vehicle.join().is_err() {
            tracing::error!("Vehicle thread panicked");
        }
    }

    if let Err(error) = light.stop() {
        tracing::error!(target: Log::TrafficLight, %error, "Light did not stop cleanly");
    }
}
