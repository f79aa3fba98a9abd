//! Harness configuration.

use std::time::Duration;

use crate::HarnessError;

/// Default paced-mode tick period in milliseconds.
pub const DEFAULT_CLOCK_SPEED_MS: u64 = 10;

/// How the scheduler drives execution steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Pacing {
    /// One step per timer tick on a background ticker.
    Paced {
        /// Tick period.
        interval: Duration,
    },
    /// Tight loop in the caller's thread until the core halts.
    FreeRunning,
}

/// Top-level configuration for a harness instance.
///
/// Every field is optional when deserialized; missing fields take the
/// [`Default`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct HarnessConfig {
    /// Emits disassembly, state dumps and port-access records to the diagnostic sink.
    pub debug: bool,
    /// Selects paced (`true`) or free-running (`false`) scheduling.
    pub paced: bool,
    /// Paced-mode tick period in milliseconds.
    pub clock_speed_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            debug: false,
            paced: true,
            clock_speed_ms: DEFAULT_CLOCK_SPEED_MS,
        }
    }
}

impl HarnessConfig {
    /// Returns the scheduling mode selected by this configuration.
    #[must_use]
    pub const fn pacing(&self) -> Pacing {
        if self.paced {
            Pacing::Paced {
                interval: Duration::from_millis(self.clock_speed_ms),
            }
        } else {
            Pacing::FreeRunning
        }
    }

    /// Checks the configuration for values the scheduler cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ZeroClockSpeed`] for paced scheduling with a
    /// zero tick period.
    pub const fn validate(&self) -> Result<(), HarnessError> {
        if self.paced && self.clock_speed_ms == 0 {
            Err(HarnessError::ZeroClockSpeed)
        } else {
            Ok(())
        }
    }
}
