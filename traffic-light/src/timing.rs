use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_MIN_MS: u64 = 4000;
const DEFAULT_MAX_MS: u64 = 6000;

/// Bounds for how long a light holds a phase before toggling.
///
/// Each cycle draws a fresh duration uniformly from `min_ms..=max_ms`. Both fields are
/// optional when deserializing and fall back to the 4-6 second default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleTiming {
    pub min_ms: u64,
    pub max_ms: u64
}

impl CycleTiming {
    /// Builds and validates a timing range.
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self> {
        let timing = Self { min_ms, max_ms };
        timing.validate()?;
        Ok(timing)
    }

    /// Parses and validates a timing range from JSON, e.g `{"min_ms": 200, "max_ms": 400}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let timing: Self = serde_json::from_str(json).map_err(Error::Config)?;
        timing.validate()?;
        Ok(timing)
    }

    /// A zero-length cycle would have the light toggling as fast as the CPU allows,
    /// so the lower bound must be at least one millisecond.
    pub fn validate(&self) -> Result<()> {
        if self.min_ms == 0 || self.min_ms > self.max_ms {
            return Err(Error::InvalidTiming {
                min_ms: self.min_ms,
                max_ms: self.max_ms
            });
        }

        Ok(())
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// Draws the duration of the next cycle.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            min_ms: DEFAULT_MIN_MS,
            max_ms: DEFAULT_MAX_MS
        }
    }
}
