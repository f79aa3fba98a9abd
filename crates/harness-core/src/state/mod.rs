//! Scheduler-visible execution state.

/// Scheduler run-state machine.
pub mod run_state;

pub use run_state::RunState;
