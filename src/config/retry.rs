use serde::{Deserialize, Serialize};

/// Retry schedule for proxied operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts per call, the first one included.
    /// TOML: `retry.max_attempts`. Default: `5`. Values below 1 are treated as 1.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay after the first failed attempt, in milliseconds.
    /// TOML: `retry.base_delay_ms`. Default: `1000`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Multiplier applied to the delay after each further failure.
    /// TOML: `retry.factor`. Default: `2.0`. Values below 1.0 are treated as 1.0.
    #[serde(default = "default_factor")]
    pub factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            factor: default_factor(),
        }
    }
}

fn default_max_attempts() -> usize {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_factor() -> f32 {
    2.0
}
