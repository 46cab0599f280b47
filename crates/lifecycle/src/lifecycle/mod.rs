//! Daemon lifecycle: PID file bookkeeping, OS process primitives,
//! detaching, the stop protocol, the controller, and logging.

#[cfg(unix)]
pub mod controller;
#[cfg(unix)]
pub mod daemon;
pub mod logging;
pub mod pid_file;
#[cfg(unix)]
pub mod process;
#[cfg(unix)]
pub mod stop;

#[cfg(all(test, unix))]
pub(crate) mod testing;
