//! Machine state shared between the host and the paced ticker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::cpu::{CpuCore, CpuFault, SystemBus};
use crate::diag::{DiagnosticEvent, DiagnosticSink, LogSink};
use crate::io::{NullPortBus, PortBus};
use crate::memory::AddressSpace;
use crate::RunState;

/// Everything a step touches. Only ever accessed under the machine lock.
pub(crate) struct Machine<C> {
    pub(crate) cpu: C,
    pub(crate) memory: AddressSpace,
    pub(crate) ports: Box<dyn PortBus>,
    pub(crate) sink: Box<dyn DiagnosticSink>,
    pub(crate) debug: bool,
    pub(crate) run_state: RunState,
    pub(crate) steps: u64,
}

pub(crate) type SharedMachine<C> = Arc<Mutex<Machine<C>>>;

/// Locks the machine, ignoring poison left behind by a contained panic.
pub(crate) fn lock<C>(machine: &Mutex<Machine<C>>) -> MutexGuard<'_, Machine<C>> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `step` under the lock, turning a panic into a halting fault.
///
/// Returns `None` when `step` panicked. The machine is then halted and the
/// panic message has been reported to the sink as [`CpuFault::Panicked`].
pub(crate) fn contain<C, R>(
    machine: &Mutex<Machine<C>>,
    step: impl FnOnce(&mut Machine<C>) -> R,
) -> Option<R>
where
    C: CpuCore,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| step(&mut *lock(machine))));
    match outcome {
        Ok(value) => Some(value),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let mut machine = lock(machine);
            machine.force_halt();
            machine.sink.on_event(DiagnosticEvent::Fault {
                fault: CpuFault::Panicked(message),
            });
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}

impl<C: CpuCore> Machine<C> {
    pub(crate) fn new(cpu: C, memory: AddressSpace, debug: bool) -> Self {
        Self {
            cpu,
            memory,
            ports: Box::new(NullPortBus),
            sink: Box::new(LogSink),
            debug,
            run_state: RunState::Idle,
            steps: 0,
        }
    }

    /// Executes one instruction. Faults halt the core and go to the sink only.
    pub(crate) fn cycle(&mut self) {
        if self.debug {
            let text = self.cpu.disassemble(&self.memory).text;
            self.sink.on_event(DiagnosticEvent::Disassembly { text });
        }

        let outcome = {
            let mut bus = SystemBus::new(
                &mut self.memory,
                &mut *self.ports,
                &mut *self.sink,
                self.debug,
            );
            self.cpu.execute(&mut bus)
        };
        self.steps = self.steps.saturating_add(1);

        match outcome {
            Ok(()) => self.dump_if_debug(),
            Err(fault) => {
                self.cpu.set_halted(true);
                self.sink.on_event(DiagnosticEvent::Fault { fault });
            }
        }
    }

    /// Halt predicate, evaluated before every driven step.
    ///
    /// Holds when the core is already halted or the upcoming instruction is
    /// the halt marker. The marker itself is never executed.
    pub(crate) fn halt_pending(&mut self) -> bool {
        if !self.cpu.halted() && self.cpu.disassemble(&self.memory).is_halt_marker() {
            self.cpu.set_halted(true);
        }
        self.cpu.halted()
    }

    /// One driver boundary: either halts the run or executes a single cycle.
    ///
    /// Returns `false` once the run has halted.
    pub(crate) fn advance(&mut self) -> bool {
        if self.halt_pending() {
            if self.run_state.is_running() {
                debug!("core halted after {} steps", self.steps);
            }
            self.run_state = RunState::Halted;
            return false;
        }

        self.cycle();
        true
    }

    pub(crate) fn force_halt(&mut self) {
        self.cpu.set_halted(true);
        self.run_state = RunState::Halted;
    }

    pub(crate) fn reset(&mut self) {
        self.memory.clear_working();
        self.cpu.reset();
        self.run_state = RunState::Idle;
        self.steps = 0;
    }

    pub(crate) fn dump_if_debug(&mut self) {
        if self.debug {
            let text = self.cpu.dump();
            self.sink.on_event(DiagnosticEvent::StateDump { text });
        }
    }
}
