//! Diagnostic side channel: events and the sinks that consume them.
//!
//! The harness never branches on a debug logger directly. It hands every
//! diagnostic record to an injected [`DiagnosticSink`]; the default
//! [`LogSink`] forwards them to the `log` facade.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace};

use crate::CpuFault;

/// Diagnostic records emitted by the harness, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// Disassembly of the instruction about to execute (debug mode only).
    Disassembly {
        /// Disassembler text as reported by the core.
        text: String,
    },
    /// Full CPU state dump (debug mode only).
    StateDump {
        /// Core-formatted register/flag dump.
        text: String,
    },
    /// Port read issued by the core (debug mode only).
    PortRead {
        /// Port address.
        port: u16,
    },
    /// Port write issued by the core (debug mode only).
    PortWrite {
        /// Port address.
        port: u16,
        /// Value written.
        value: u16,
    },
    /// The core failed a step; always reported, regardless of debug mode.
    Fault {
        /// Failure reported by the core.
        fault: CpuFault,
    },
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disassembly { text } | Self::StateDump { text } => f.write_str(text),
            Self::PortRead { port } => write!(f, "port read {port:#06x}"),
            Self::PortWrite { port, value } => {
                write!(f, "port write {port:#06x} <- {value:#06x}")
            }
            Self::Fault { fault } => write!(f, "cpu fault: {fault}"),
        }
    }
}

/// Line-oriented consumer for diagnostic records.
///
/// Sinks cannot report failure back to the harness.
pub trait DiagnosticSink: Send {
    /// Records an event.
    fn on_event(&mut self, event: DiagnosticEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn on_event(&mut self, _event: DiagnosticEvent) {}
}

/// Sink that forwards events to the [`log`] facade.
///
/// Faults go out at `error` level, state dumps at `trace`, everything else
/// at `debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn on_event(&mut self, event: DiagnosticEvent) {
        match &event {
            DiagnosticEvent::Fault { .. } => error!("{event}"),
            DiagnosticEvent::StateDump { .. } => trace!("{event}"),
            DiagnosticEvent::Disassembly { .. }
            | DiagnosticEvent::PortRead { .. }
            | DiagnosticEvent::PortWrite { .. } => debug!("{event}"),
        }
    }
}

/// Cloneable sink handle that keeps every event in memory.
///
/// All clones share one event list, so a host can keep a handle while the
/// harness owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<DiagnosticEvent>>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.lock().clone()
    }

    /// Returns only the recorded faults, in order.
    #[must_use]
    pub fn faults(&self) -> Vec<CpuFault> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                DiagnosticEvent::Fault { fault } => Some(fault.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DiagnosticEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for RecordingSink {
    fn on_event(&mut self, event: DiagnosticEvent) {
        self.lock().push(event);
    }
}
