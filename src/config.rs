//! Driver configuration parameters
//!
//! All tunable parameters for the interferometer driver.  Gate thresholds
//! are fixed constants in [`crate::safety`]; only placement and timing are
//! configurable here.

use serde::{Deserialize, Serialize};

use crate::acquisition::SettleConfig;
use crate::error::ConfigError;
use crate::regmap;

/// Core driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    // --- Placement ---
    /// Base address of the register block.
    pub register_base: usize,

    // --- Settle wait ---
    /// Minimum settle delay after the beam-splitter is activated (µs)
    pub settle_min_us: u32,
    /// Poll interval while waiting for the device to report settled (µs)
    pub settle_poll_us: u32,
    /// Upper bound on the total settle wait (µs)
    pub settle_timeout_us: u32,

    // --- Service ---
    /// Extra `measure()` attempts per cycle after a retryable failure
    pub measure_retries: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            register_base: regmap::DEFAULT_BASE,

            settle_min_us: 1,
            settle_poll_us: 1,
            settle_timeout_us: 1_000,

            measure_retries: 2,
        }
    }
}

impl DriverConfig {
    /// Parse from JSON.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the settle wait unbounded or the
    /// register accesses misaligned.  Values are never silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.register_base == 0 {
            return Err(ConfigError::ValidationFailed("register_base must be non-zero"));
        }
        if self.register_base % regmap::BASE_ALIGN != 0 {
            return Err(ConfigError::ValidationFailed(
                "register_base must be 8-byte aligned",
            ));
        }
        if self.settle_poll_us == 0 {
            return Err(ConfigError::ValidationFailed("settle_poll_us must be > 0"));
        }
        if self.settle_timeout_us < self.settle_min_us {
            return Err(ConfigError::ValidationFailed(
                "settle_timeout_us must be >= settle_min_us",
            ));
        }
        Ok(())
    }

    pub fn settle(&self) -> SettleConfig {
        SettleConfig {
            min_us: self.settle_min_us,
            poll_us: self.settle_poll_us,
            timeout_us: self.settle_timeout_us,
        }
    }
}
