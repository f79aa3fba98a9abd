//! Error taxonomy for building a harness.

use thiserror::Error;

/// Construction-time failures for a harness instance.
///
/// Runtime CPU faults never surface here; they are reported to the
/// diagnostic sink and latch the halted condition instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum HarnessError {
    /// Firmware image does not fit in the program region.
    #[error("firmware image is {len} bytes but the program region holds {capacity}")]
    FirmwareTooLarge {
        /// Length of the rejected image.
        len: usize,
        /// Program region capacity in bytes.
        capacity: usize,
    },
    /// Paced scheduling was configured with a zero tick period.
    #[error("paced clock speed must be at least 1 ms")]
    ZeroClockSpeed,
}

#[cfg(test)]
mod tests {
    use super::HarnessError;

    #[test]
    fn messages_name_the_offending_values() {
        let err = HarnessError::FirmwareTooLarge {
            len: 9000,
            capacity: 8191,
        };
        assert_eq!(
            err.to_string(),
            "firmware image is 9000 bytes but the program region holds 8191"
        );
        assert_eq!(
            HarnessError::ZeroClockSpeed.to_string(),
            "paced clock speed must be at least 1 ms"
        );
    }
}
