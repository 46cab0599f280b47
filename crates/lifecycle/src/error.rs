use std::path::PathBuf;

use crate::server::ServerExit;

/// Process exit status for a malformed control flag and other controller failures.
pub const EXIT_USAGE: u8 = 1;
/// Process exit status when a stop could not clear the PID file, even after SIGKILL.
pub const EXIT_STOP_FAILED: u8 = 2;
/// Process exit status when start is refused because an instance is on record.
pub const EXIT_ALREADY_RUNNING: u8 = 3;

/// Failure to classify the command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing argument for {flag}")]
    MissingValue { flag: &'static str },
}

/// Failure to read or maintain the PID file.
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("invalid PID in {}: {content:?}", path.display())]
    Parse { path: PathBuf, content: String },

    #[error("PID file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Unified error type for a single controller invocation.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    PidFile(#[from] PidFileError),

    #[error("already running as PID {pid} (recorded in {})", path.display())]
    AlreadyRunning { pid: u32, path: PathBuf },

    #[error("Stop failed, check if process {pid} is running and delete {}", path.display())]
    StopFailed { pid: u32, path: PathBuf },

    #[error("failed to detach into background: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to become session leader: {0}")]
    SessionLeader(#[source] std::io::Error),

    #[error("failed to change directory to {}: {source}", dir.display())]
    ChangeDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0:#}")]
    Server(anyhow::Error),
}

impl LifecycleError {
    /// Exit status the invoking process should terminate with.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StopFailed { .. } => EXIT_STOP_FAILED,
            Self::AlreadyRunning { .. } => EXIT_ALREADY_RUNNING,
            Self::Server(e) => e
                .downcast_ref::<ServerExit>()
                .map(|exit| exit.code)
                .unwrap_or(EXIT_USAGE),
            Self::Argument(_)
            | Self::PidFile(_)
            | Self::Spawn(_)
            | Self::SessionLeader(_)
            | Self::ChangeDir { .. } => EXIT_USAGE,
        }
    }
}
