//! Contract for the CPU core hosted by the harness.
//!
//! The harness does not decode or execute instructions itself. A core
//! implements [`CpuCore`] and receives a [`SystemBus`] for every step, which
//! is how the address space, port device and diagnostic sink are injected.

use thiserror::Error;

use crate::diag::{DiagnosticEvent, DiagnosticSink};
use crate::io::PortBus;
use crate::memory::{AddressSpace, MemoryBus};

/// Disassembler text of the instruction that stops the scheduler.
pub const HALT_MNEMONIC: &str = "nop";

/// Failure reported by a core while executing one step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum CpuFault {
    /// The core has no implementation for the fetched opcode.
    #[error("unimplemented opcode {opcode:#04x} at {pc:#06x}")]
    UnimplementedOpcode {
        /// Offending opcode byte.
        opcode: u8,
        /// Address the opcode was fetched from.
        pc: u16,
    },
    /// Any other core-defined failure.
    #[error("{0}")]
    Core(String),
    /// The core panicked while stepping; carries the panic message.
    #[error("core panicked: {0}")]
    Panicked(String),
}

/// Disassembly of the instruction at the core's program counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Disassembly {
    /// Mnemonic and operands, as the core's disassembler renders them.
    pub text: String,
}

impl Disassembly {
    /// Wraps disassembler output.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns `true` when this instruction is the halt marker ([`HALT_MNEMONIC`]).
    #[must_use]
    pub fn is_halt_marker(&self) -> bool {
        self.text == HALT_MNEMONIC
    }
}

/// CPU core driven by the scheduler.
pub trait CpuCore {
    /// Executes exactly one instruction against `bus`.
    ///
    /// # Errors
    ///
    /// Returns a [`CpuFault`] when the instruction cannot be executed. The
    /// scheduler latches the halted flag and reports the fault; it is never
    /// propagated to the host.
    fn execute(&mut self, bus: &mut SystemBus<'_>) -> Result<(), CpuFault>;

    /// Disassembles the instruction at the current program counter without executing it.
    fn disassemble(&self, memory: &dyn MemoryBus) -> Disassembly;

    /// Restores register/flag defaults and clears the halted flag.
    fn reset(&mut self);

    /// Current halted flag.
    fn halted(&self) -> bool;

    /// Overwrites the halted flag.
    fn set_halted(&mut self, halted: bool);

    /// Human-readable register/flag dump for debug diagnostics.
    fn dump(&self) -> String;
}

/// Bus handed to [`CpuCore::execute`]: memory decoder, port device and diagnostics.
///
/// Port accesses are reported to the diagnostic sink when debug mode is on.
/// Memory accesses are never reported.
pub struct SystemBus<'a> {
    memory: &'a mut AddressSpace,
    ports: &'a mut dyn PortBus,
    sink: &'a mut dyn DiagnosticSink,
    debug: bool,
}

impl<'a> SystemBus<'a> {
    /// Assembles a bus view over borrowed machine components.
    #[must_use]
    pub fn new(
        memory: &'a mut AddressSpace,
        ports: &'a mut dyn PortBus,
        sink: &'a mut dyn DiagnosticSink,
        debug: bool,
    ) -> Self {
        Self {
            memory,
            ports,
            sink,
            debug,
        }
    }

    /// Whether the harness runs in debug mode.
    #[must_use]
    pub const fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// Read-only access to the underlying address space.
    #[must_use]
    pub fn memory(&self) -> &AddressSpace {
        &*self.memory
    }
}

impl MemoryBus for SystemBus<'_> {
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory.write(addr, value);
    }
}

impl PortBus for SystemBus<'_> {
    fn port_read(&mut self, port: u16) -> u16 {
        let value = self.ports.port_read(port);
        if self.debug {
            self.sink.on_event(DiagnosticEvent::PortRead { port });
        }
        value
    }

    fn port_write(&mut self, port: u16, value: u16) {
        if self.debug {
            self.sink.on_event(DiagnosticEvent::PortWrite { port, value });
        }
        self.ports.port_write(port, value);
    }
}
