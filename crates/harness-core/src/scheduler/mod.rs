//! Execution scheduler: start/stop/reset controls and halt detection.
//!
//! A [`Harness`] owns the CPU core, the address space, the port device and
//! the diagnostic sink behind one lock. Steps run either on a background
//! ticker ([`Pacing::Paced`]) or in a tight loop on the caller's thread
//! ([`Pacing::FreeRunning`]). Before every driven step the halt predicate is
//! checked: the run ends when the core is halted or the upcoming instruction
//! disassembles to [`HALT_MNEMONIC`](crate::HALT_MNEMONIC).

mod machine;
mod ticker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::cpu::CpuCore;
use crate::diag::DiagnosticSink;
use crate::io::PortBus;
use crate::memory::{AddressSpace, MemoryBus};
use crate::{HarnessConfig, HarnessError, Pacing, RunState};

use machine::{contain, lock, Machine, SharedMachine};
use ticker::PacedTicker;

/// Host harness driving a [`CpuCore`] against a firmware-backed bus.
pub struct Harness<C> {
    machine: SharedMachine<C>,
    stop_requested: Arc<AtomicBool>,
    config: HarnessConfig,
    ticker: Option<PacedTicker>,
}

impl<C> Harness<C>
where
    C: CpuCore + Send + 'static,
{
    /// Builds a harness with `firmware` loaded at the reset vector.
    ///
    /// The port bus defaults to [`NullPortBus`](crate::NullPortBus) and the
    /// diagnostic sink to [`LogSink`](crate::LogSink), so faults reach the
    /// `log` facade at `error` level even when debug mode is off.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FirmwareTooLarge`] when the image exceeds the
    /// program region and [`HarnessError::ZeroClockSpeed`] for a paced
    /// configuration without a tick period.
    pub fn new(cpu: C, firmware: &[u8], config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let memory = AddressSpace::with_firmware(firmware)?;

        Ok(Self {
            machine: Arc::new(Mutex::new(Machine::new(cpu, memory, config.debug))),
            stop_requested: Arc::new(AtomicBool::new(false)),
            config,
            ticker: None,
        })
    }

    /// Replaces the port device.
    #[must_use]
    pub fn with_port_bus(self, ports: impl PortBus + 'static) -> Self {
        lock(&self.machine).ports = Box::new(ports);
        self
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_sink(self, sink: impl DiagnosticSink + 'static) -> Self {
        lock(&self.machine).sink = Box::new(sink);
        self
    }

    /// Configuration this harness was built with.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Starts execution in the configured [`Pacing`] mode.
    ///
    /// # Panics
    ///
    /// Panics when the harness is already running.
    pub fn start(&mut self) {
        self.start_with(self.config.pacing());
    }

    /// Starts execution in an explicit [`Pacing`] mode.
    ///
    /// Paced runs return immediately and step on a background ticker.
    /// Free-running runs block until the core halts. A harness that is
    /// already halted ends the new run before executing anything; call
    /// [`Harness::reset`] to run again.
    ///
    /// # Panics
    ///
    /// Panics when the harness is already running or when `pacing` is
    /// [`Pacing::Paced`] with a zero interval. Both are caller bugs rather
    /// than runtime errors.
    pub fn start_with(&mut self, pacing: Pacing) {
        if let Pacing::Paced { interval } = pacing {
            assert!(!interval.is_zero(), "{}", HarnessError::ZeroClockSpeed);
        }

        {
            let mut machine = lock(&self.machine);
            assert!(!machine.run_state.is_running(), "CPU is already running.");
            machine.run_state = RunState::Running(pacing);
            machine.dump_if_debug();
        }

        // A previous ticker can only still exist if it halted on its own.
        if let Some(previous) = self.ticker.take() {
            previous.join();
        }

        debug!("starting {pacing:?} run");
        match pacing {
            Pacing::Paced { interval } => {
                self.ticker = Some(PacedTicker::spawn(Arc::clone(&self.machine), interval));
            }
            Pacing::FreeRunning => self.run_free(),
        }
    }

    /// Forces the halted condition and cancels any paced ticker.
    ///
    /// Memory is left untouched. Once this returns no further step executes.
    /// Calling it repeatedly or while idle is harmless.
    pub fn stop(&mut self) {
        self.stop_requested.store(true, Ordering::Release);
        lock(&self.machine).force_halt();
        self.cancel_ticker();
    }

    /// Cancels any run, zeroes working memory, resets the core and returns to [`RunState::Idle`].
    pub fn reset(&mut self) {
        self.cancel_ticker();
        lock(&self.machine).reset();
        self.stop_requested.store(false, Ordering::Release);
    }

    /// Executes a single step outside of any driver.
    ///
    /// Faults and core panics are handled exactly as in a driven run: the
    /// core halts and the fault goes to the diagnostic sink. The halt
    /// predicate is not checked.
    pub fn cycle(&self) {
        contain(&self.machine, |machine| {
            machine.cycle();
            if machine.cpu.halted() && !machine.run_state.is_running() {
                machine.run_state = RunState::Halted;
            }
        });
    }

    /// Blocks until a paced run halts on its own.
    ///
    /// Returns immediately when no paced run is active. Never returns for a
    /// program that never reaches the halt marker; use [`Harness::stop`] or a
    /// [`StopHandle`] for those.
    pub fn wait(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
        }
    }

    /// Returns a handle that can halt this harness from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle<C> {
        StopHandle {
            machine: Arc::clone(&self.machine),
            stop_requested: Arc::clone(&self.stop_requested),
        }
    }

    /// Current scheduler state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        lock(&self.machine).run_state
    }

    /// Current value of the core's halted flag.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        lock(&self.machine).cpu.halted()
    }

    /// Number of steps executed since construction or the last reset.
    #[must_use]
    pub fn steps(&self) -> u64 {
        lock(&self.machine).steps
    }

    /// Reads a byte through the bus decoder without involving the core.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        lock(&self.machine).memory.read(addr)
    }

    /// Runs `f` with shared access to the core, e.g. to inspect registers.
    pub fn with_cpu<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&lock(&self.machine).cpu)
    }

    /// Runs `f` with exclusive access to the core, serialized against stepping.
    pub fn with_cpu_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut lock(&self.machine).cpu)
    }
}

impl<C: CpuCore> Harness<C> {
    /// Tight loop taking the lock once per step.
    ///
    /// The stop flag is checked outside the lock so a [`StopHandle`] on
    /// another thread is never starved by the loop re-acquiring it.
    fn run_free(&self) {
        while !self.stop_requested.load(Ordering::Acquire) {
            if contain(&self.machine, Machine::advance) != Some(true) {
                return;
            }
        }
        lock(&self.machine).force_halt();
    }
}

impl<C> Harness<C> {
    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

impl<C> Drop for Harness<C> {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

/// Cloneable handle that halts a [`Harness`] from any thread.
///
/// Works for both pacing modes: a free-running loop or a paced ticker
/// observes the halted flag at the next step boundary.
pub struct StopHandle<C> {
    machine: SharedMachine<C>,
    stop_requested: Arc<AtomicBool>,
}

impl<C> Clone for StopHandle<C> {
    fn clone(&self) -> Self {
        Self {
            machine: Arc::clone(&self.machine),
            stop_requested: Arc::clone(&self.stop_requested),
        }
    }
}

impl<C: CpuCore> StopHandle<C> {
    /// Forces the halted condition. Idempotent.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        lock(&self.machine).force_halt();
    }
}
