//! The contract between the controller and the workload it daemonizes.

use std::fmt;

/// A long-running server managed by the controller.
///
/// The controller only ever calls `configure` once, then either `run` (in the
/// foreground) or `start` followed by `join` (when detached).
pub trait Server {
    /// Apply the passthrough arguments that the controller did not recognize.
    fn configure(&mut self, args: &[String]) -> anyhow::Result<()>;

    /// Start serving. Returns once the server is accepting work.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Block until the server shuts down.
    fn join(&mut self) -> anyhow::Result<()>;

    /// Start and block until shutdown.
    fn run(&mut self) -> anyhow::Result<()> {
        self.start()?;
        self.join()
    }

    /// Server-specific usage text, appended to the controller's own.
    fn usage(&self) -> String;

    /// Server-specific version line.
    fn version(&self) -> String;
}

/// An error carrying the exact process exit status a server wants reported.
#[derive(Debug)]
pub struct ServerExit {
    pub code: u8,
    pub message: String,
}

impl ServerExit {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ServerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.trim_end())
    }
}

impl std::error::Error for ServerExit {}
