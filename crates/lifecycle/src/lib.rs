//! Process lifecycle control for a single daemonized server: argument
//! classification, PID-file bookkeeping, detaching, and the stop protocol.

pub mod args;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod server;

pub use args::{Classified, ControlArgs, LifecycleIntent, classify};
pub use error::{ArgumentError, LifecycleError, PidFileError};
pub use server::{Server, ServerExit};
