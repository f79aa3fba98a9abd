//! Default diagnostic routing: without an explicit sink, faults still reach
//! the `log` facade and quiet runs stay quiet.
//!
//! Lives in its own test binary because it installs a process-wide logger.

#![allow(clippy::pedantic, clippy::nursery)]

mod common;

use std::sync::{Mutex, MutexGuard, PoisonError};

use common::{FaultingCore, ToyCore, INC_A, NOP};
use harness_core::{Harness, HarnessConfig};
use log::{Level, LevelFilter, Log, Metadata, Record};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static SERIAL: Mutex<()> = Mutex::new(());

struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        records().push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

fn records() -> MutexGuard<'static, Vec<(Level, String)>> {
    RECORDS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Installs the capturing logger once and serializes tests sharing it.
fn capture() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
    records().clear();
    guard
}

fn errors() -> Vec<String> {
    records()
        .iter()
        .filter(|(level, _)| *level == Level::Error)
        .map(|(_, message)| message.clone())
        .collect()
}

fn free_running() -> HarnessConfig {
    HarnessConfig {
        paced: false,
        ..HarnessConfig::default()
    }
}

#[test]
fn default_harness_logs_faults_at_error_level() {
    let _serial = capture();
    let mut harness =
        Harness::new(FaultingCore::default(), &[INC_A], free_running()).expect("valid harness");

    harness.start();

    assert!(harness.is_halted());
    assert_eq!(
        errors(),
        vec!["cpu fault: execution unit on fire".to_string()]
    );
}

#[test]
fn default_harness_logs_nothing_at_error_level_for_a_clean_run() {
    let _serial = capture();
    let mut harness = Harness::new(ToyCore::default(), &[INC_A, INC_A, NOP], free_running())
        .expect("valid harness");

    harness.start();

    assert_eq!(harness.steps(), 2);
    assert!(errors().is_empty());
}
