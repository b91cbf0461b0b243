//! Ctrl+C handling.
//!
//! The first Ctrl+C asks the sweep to stop after the current run so the
//! report still gets written; a second one exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Exit code used after an interrupt.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Install the Ctrl+C handler. Calling it again is a no-op.
pub fn install_handler() -> Result<(), ctrlc::Error> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    ctrlc::set_handler(|| {
        if SHUTDOWN_REQUESTED.swap(true, Ordering::SeqCst) {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        eprintln!("\nInterrupted, finishing the current run and writing the report...");
    })
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}
