//! Host harness for running an 8-bit CPU core against a firmware-backed
//! memory bus and a port-addressed IO bus.

/// Memory bus: fixed region map and firmware/RAM address space.
pub mod memory;
pub use memory::{
    decode_memory_region, AddressSpace, MemoryBus, MemoryRegion, ADDRESS_SPACE_BYTES,
    PROGRAM_CAPACITY, PROGRAM_END, PROGRAM_START, UNMAPPED_READ_VALUE, WORKING_CAPACITY,
    WORKING_END, WORKING_START,
};

/// Port-addressed IO bus and the default no-device implementation.
pub mod io;
pub use io::{NullPortBus, PortBus, UNMAPPED_PORT_VALUE};

/// CPU core contract and the bus handed to it on every step.
pub mod cpu;
pub use cpu::{CpuCore, CpuFault, Disassembly, SystemBus, HALT_MNEMONIC};

/// Diagnostic events and sinks.
pub mod diag;
pub use diag::{DiagnosticEvent, DiagnosticSink, LogSink, NullSink, RecordingSink};

/// Harness configuration.
pub mod config;
pub use config::{HarnessConfig, Pacing, DEFAULT_CLOCK_SPEED_MS};

/// Construction error taxonomy.
pub mod error;
pub use error::HarnessError;

/// Scheduler run-state machine.
pub mod state;
pub use state::RunState;

/// Execution scheduler.
pub mod scheduler;
pub use scheduler::{Harness, StopHandle};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
