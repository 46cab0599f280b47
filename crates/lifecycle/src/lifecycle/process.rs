//! Thin access to the OS process primitives the controller needs.

use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Signals the stop protocol sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The mild request to shut down (SIGHUP).
    Hangup,
    /// Unconditional termination (SIGKILL).
    Kill,
}

impl Signal {
    pub fn as_raw(self) -> libc::c_int {
        match self {
            Self::Hangup => libc::SIGHUP,
            Self::Kill => libc::SIGKILL,
        }
    }
}

/// Process-level OS operations, behind a trait so the controller can be
/// driven without touching real processes.
pub trait ProcessControl {
    fn current_pid(&self) -> u32;

    /// Start a new session, dropping the controlling terminal.
    fn become_session_leader(&self) -> io::Result<()>;

    fn change_dir(&self, dir: &Path) -> io::Result<()>;

    fn send_signal(&self, pid: u32, signal: Signal) -> io::Result<()>;

    /// Point stdin, stdout and stderr at `/dev/null`.
    fn release_std_streams(&self) -> io::Result<()>;
}

/// `ProcessControl` backed by libc.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcess;

impl ProcessControl for SystemProcess {
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    fn become_session_leader(&self) -> io::Result<()> {
        let ret = unsafe { libc::setsid() };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn change_dir(&self, dir: &Path) -> io::Result<()> {
        std::env::set_current_dir(dir)
    }

    fn send_signal(&self, pid: u32, signal: Signal) -> io::Result<()> {
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))?;
        let ret = unsafe { libc::kill(pid, signal.as_raw()) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn release_std_streams(&self) -> io::Result<()> {
        // dup2 rather than close keeps descriptors 0-2 occupied, so later
        // opens cannot land on them.
        let null = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/null")?;
        for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            let ret = unsafe { libc::dup2(null.as_raw_fd(), fd) };
            if ret == -1 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

/// The standard streams inherited from the invoking terminal.
///
/// Once the server has been started the background process no longer needs
/// them; `release` detaches stdin, stdout and stderr so the original
/// terminal's descriptors are not held open. Until then they stay attached,
/// so a failure on the way up can still be reported where the operator
/// started the process.
pub struct InheritedStdio<'a, P: ProcessControl> {
    process: &'a P,
    released: bool,
}

impl<'a, P: ProcessControl> InheritedStdio<'a, P> {
    pub fn capture(process: &'a P) -> Self {
        Self {
            process,
            released: false,
        }
    }

    pub fn release(&mut self) -> io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.process.release_std_streams()
    }
}
