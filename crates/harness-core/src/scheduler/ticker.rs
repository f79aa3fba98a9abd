//! Background periodic ticker for paced runs.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::error;

use crate::cpu::CpuCore;
use crate::scheduler::machine::{contain, lock, Machine, SharedMachine};

/// Handle to the single active ticker thread of a harness.
pub(crate) struct PacedTicker {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

impl PacedTicker {
    /// Starts ticking `machine` every `interval` until it halts or is cancelled.
    pub(crate) fn spawn<C>(machine: SharedMachine<C>, interval: Duration) -> Self
    where
        C: CpuCore + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let _halt_on_unwind = HaltOnUnwind(&machine);
            loop {
                match cancelled.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                if contain(&machine, Machine::advance) != Some(true) {
                    break;
                }
            }
        });

        Self { cancel, handle }
    }

    /// Cancels the ticker and waits for its thread to exit.
    ///
    /// Once this returns no further tick can execute a step.
    pub(crate) fn cancel(self) {
        // The receiver is gone when the ticker already halted on its own.
        let _ = self.cancel.send(());
        self.join();
    }

    /// Waits for the ticker to stop on its own.
    pub(crate) fn join(self) {
        if self.handle.join().is_err() {
            error!("paced ticker thread panicked");
        }
    }
}

/// Halts the machine if the ticker thread unwinds past step containment,
/// e.g. when the diagnostic sink itself panics.
struct HaltOnUnwind<'a, C: CpuCore>(&'a Mutex<Machine<C>>);

impl<C: CpuCore> Drop for HaltOnUnwind<'_, C> {
    fn drop(&mut self) {
        if thread::panicking() {
            lock(self.0).force_halt();
        }
    }
}
