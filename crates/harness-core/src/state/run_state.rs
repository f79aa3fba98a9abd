use crate::Pacing;

/// Host-observable scheduler state.
///
/// `Idle --start--> Running --halt/stop--> Halted --reset--> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Constructed or reset; no driver attached.
    #[default]
    Idle,
    /// A driver is stepping the core in the given mode.
    Running(Pacing),
    /// Halt predicate held, a step faulted, or `stop` was called.
    Halted,
}

impl RunState {
    /// Returns `true` while a driver owns the core.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running(_))
    }

    /// Returns the active scheduling mode, if running.
    #[must_use]
    pub const fn pacing(self) -> Option<Pacing> {
        match self {
            Self::Running(pacing) => Some(pacing),
            Self::Idle | Self::Halted => None,
        }
    }
}
