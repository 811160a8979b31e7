use thiserror::Error;

/// Any error that can occur while configuring, starting, or stopping a `TrafficLight`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Traffic light is already cycling")]
    AlreadyRunning,

    #[error("Failed to spawn the cycling thread")]
    Spawn(#[source] std::io::Error),

    #[error("Cycling thread panicked")]
    Panicked,

    #[error("Invalid cycle timing: {min_ms}ms..={max_ms}ms (need 1 <= min <= max)")]
    InvalidTiming {
        min_ms: u64,
        max_ms: u64
    },

    #[error(transparent)]
    Config(serde_json::Error)
}

pub type Result<T> = std::result::Result<T, Error>;
