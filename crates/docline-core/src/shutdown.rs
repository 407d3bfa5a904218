//! Graceful shutdown between chunks
//!
//! The driver checks the flag before starting each chunk, so an interrupted
//! run always stops on a part boundary.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag, set by the SIGINT/SIGTERM handler
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

/// Register SIGINT/SIGTERM handlers.
///
/// First signal: set the flag and let the current chunk finish.
/// Second signal: exit immediately with status 130.
pub fn install_signal_handlers() -> std::io::Result<()> {
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        // SAFETY: AtomicBool::swap and low_level::exit (_exit) are async-signal-safe
        unsafe {
            signal_hook::low_level::register(signal, || {
                if shutdown_flag().swap(true, Ordering::Relaxed) {
                    signal_hook::low_level::exit(130);
                }
            })?;
        }
    }
    Ok(())
}
