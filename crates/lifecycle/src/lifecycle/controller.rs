//! The lifecycle controller: decides between running in the foreground,
//! starting in the background, stopping and restarting, and drives each.

use std::path::PathBuf;

use super::daemon::{DaemonState, Daemonize};
use super::pid_file::{PidFileGuard, PidFileStore};
use super::process::{InheritedStdio, ProcessControl};
use super::stop::{StopPolicy, stop_instance};
use crate::args::{ControlArgs, LifecycleIntent, classify};
use crate::error::LifecycleError;
use crate::server::Server;

/// What an invocation did, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Usage text was requested.
    Help,
    /// Version text was requested.
    Version,
    /// A stop-only invocation finished (including when nothing was running).
    Stopped,
    /// The background process was launched; the caller should exit.
    Spawned { pid: u32 },
    /// The server ran to completion in this process.
    Finished,
}

pub struct Controller<P, D> {
    process: P,
    daemonizer: D,
    stop_policy: StopPolicy,
}

impl<P: ProcessControl, D: Daemonize> Controller<P, D> {
    pub fn new(process: P, daemonizer: D) -> Self {
        Self {
            process,
            daemonizer,
            stop_policy: StopPolicy::default(),
        }
    }

    pub fn with_stop_policy(mut self, policy: StopPolicy) -> Self {
        self.stop_policy = policy;
        self
    }

    /// Handle one invocation. `argv` excludes the program name and is passed
    /// unchanged to the background process when detaching.
    pub fn run<S: Server>(
        &self,
        argv: &[String],
        server: &mut S,
    ) -> Result<Outcome, LifecycleError> {
        let classified = classify(argv)?;
        let control = &classified.control;
        let intent = control.intent();

        match intent {
            LifecycleIntent::Help => return Ok(Outcome::Help),
            LifecycleIntent::Version => return Ok(Outcome::Version),
            _ => {}
        }

        let store = PidFileStore::new(control.pid_file.clone());
        let mut recorded = store.read()?;

        if intent.stops() {
            match recorded.take() {
                Some(pid) => {
                    stop_instance(&self.process, &store, pid, &self.stop_policy)?;
                }
                None if store.path().is_none() => {
                    tracing::warn!("No PID file configured (--pid), nothing to stop");
                }
                None => tracing::info!("No running instance recorded, nothing to stop"),
            }
            if !intent.starts() {
                return Ok(Outcome::Stopped);
            }
        }

        if intent.starts()
            && let Some(pid) = recorded
        {
            return Err(LifecycleError::AlreadyRunning {
                pid,
                path: store.path().map(PathBuf::from).unwrap_or_default(),
            });
        }

        match self.daemonizer.state() {
            DaemonState::Detached => {
                self.run_detached(control, &classified.passthrough, store, server)
            }
            DaemonState::Original if intent.starts() => {
                let child = self
                    .daemonizer
                    .spawn_detached(argv)
                    .map_err(LifecycleError::Spawn)?;
                Ok(Outcome::Spawned { pid: child.pid })
            }
            DaemonState::Original => {
                server.configure(&classified.passthrough).map_err(LifecycleError::Server)?;
                server.run().map_err(LifecycleError::Server)?;
                Ok(Outcome::Finished)
            }
        }
    }

    /// Session setup and serving in the background process. The PID file
    /// exists from just after session setup until the server has stopped, on
    /// every exit path.
    fn run_detached<S: Server>(
        &self,
        control: &ControlArgs,
        passthrough: &[String],
        store: PidFileStore,
        server: &mut S,
    ) -> Result<Outcome, LifecycleError> {
        self.process
            .become_session_leader()
            .map_err(LifecycleError::SessionLeader)?;

        let pid = self.process.current_pid();
        let pid_file = PidFileGuard::acquire(store.into_absolute()?, pid)?;
        let mut stdio = InheritedStdio::capture(&self.process);

        // On failure stdio stays attached, so the caller's error report
        // still reaches the operator.
        let served = self.serve(control, passthrough, server, &mut stdio);
        if let Err(e) = &served {
            tracing::error!("Background server PID {pid} failed: {e}");
        }

        served?;
        pid_file.release()?;
        tracing::info!("Background server PID {pid} shut down");
        Ok(Outcome::Finished)
    }

    fn serve<S: Server>(
        &self,
        control: &ControlArgs,
        passthrough: &[String],
        server: &mut S,
        stdio: &mut InheritedStdio<'_, P>,
    ) -> Result<(), LifecycleError> {
        if let Some(dir) = &control.chdir {
            self.process
                .change_dir(dir)
                .map_err(|source| LifecycleError::ChangeDir {
                    dir: dir.clone(),
                    source,
                })?;
        }

        server.configure(passthrough).map_err(LifecycleError::Server)?;
        server.start().map_err(LifecycleError::Server)?;
        tracing::info!("Server started in background");

        if let Err(e) = stdio.release() {
            tracing::warn!("Failed to release inherited stdio: {e}");
        }

        server.join().map_err(LifecycleError::Server)
    }
}
