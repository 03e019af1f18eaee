use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TICK_RATE_HZ: u32 = 60;
const MIN_TICK_INTERVAL: Duration = Duration::from_nanos(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// How many times per second the host loop ticks
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: u32,
}

fn default_tick_rate() -> u32 {
    DEFAULT_TICK_RATE_HZ
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

impl FrameConfig {
    /// Time between ticks. A zero rate falls back to the default, and the
    /// interval never drops below one nanosecond.
    pub fn tick_interval(&self) -> Duration {
        let hz = if self.tick_rate_hz == 0 {
            DEFAULT_TICK_RATE_HZ
        } else {
            self.tick_rate_hz
        };
        (Duration::from_secs(1) / hz).max(MIN_TICK_INTERVAL)
    }
}
