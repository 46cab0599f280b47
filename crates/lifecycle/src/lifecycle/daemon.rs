//! Detach into the background by re-launching the current executable.
//!
//! The invoking process spawns a copy of itself with the same arguments and a
//! marker in its environment, then exits. The copy sees the marker, knows it
//! is the detached form, and carries on with session setup.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Environment variable marking the detached background process.
pub const DAEMON_MARKER: &str = "WARDEN_DAEMONIZED";

/// Which side of the detach the current process is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// The process the operator invoked.
    Original,
    /// The background process spawned by `spawn_detached`.
    Detached,
}

/// A background process that has been spawned but not waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildHandle {
    pub pid: u32,
}

pub trait Daemonize {
    fn state(&self) -> DaemonState;

    /// Launch the detached form with `args` (without the program name) and
    /// return without waiting for it to initialize.
    fn spawn_detached(&self, args: &[String]) -> io::Result<ChildHandle>;
}

/// `Daemonize` that re-executes the current binary.
#[derive(Debug, Clone)]
pub struct ReexecDaemonizer {
    program: PathBuf,
    state: DaemonState,
}

impl ReexecDaemonizer {
    /// Build from the running executable and the current environment.
    pub fn from_env() -> io::Result<Self> {
        let program = std::env::current_exe()?;
        Ok(Self::new(program, std::env::var_os(DAEMON_MARKER)))
    }

    pub fn new(program: PathBuf, marker: Option<OsString>) -> Self {
        let state = match marker {
            Some(v) if v == "1" => DaemonState::Detached,
            _ => DaemonState::Original,
        };
        Self { program, state }
    }
}

impl Daemonize for ReexecDaemonizer {
    fn state(&self) -> DaemonState {
        self.state
    }

    fn spawn_detached(&self, args: &[String]) -> io::Result<ChildHandle> {
        // stdout/stderr stay inherited so start-up failures still reach the
        // operator; the child releases them once its server is running.
        let child = Command::new(&self.program)
            .args(args)
            .env(DAEMON_MARKER, "1")
            .stdin(Stdio::null())
            .spawn()?;
        let pid = child.id();
        tracing::info!("Spawned background process, PID {pid}");
        Ok(ChildHandle { pid })
    }
}
