//! Stopping a recorded instance: ask politely, wait for its PID file to go,
//! then SIGKILL and clear the file ourselves.
//!
//! The PID file, not the process table, is the signal that the instance is
//! gone: a clean shutdown removes it on the way out.

use std::path::PathBuf;
use std::time::Duration;

use super::pid_file::PidFileStore;
use super::process::{ProcessControl, Signal};
use crate::error::LifecycleError;

/// How long and how often to wait for a graceful exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
    /// Log progress after every this many polls.
    pub progress_every: u32,
    /// Pause after escalation before checking the PID file one last time.
    pub settle: Duration,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_polls: 100,
            progress_every: 10,
            settle: Duration::from_millis(200),
        }
    }
}

impl StopPolicy {
    pub fn grace_period(&self) -> Duration {
        self.poll_interval * self.max_polls
    }
}

/// How a stop concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The instance removed its own PID file after the mild signal.
    Graceful,
    /// The grace period ran out; SIGKILL was sent and the file removed.
    Forced,
}

/// Stop the instance recorded as `pid` in `store`.
pub fn stop_instance<P: ProcessControl>(
    process: &P,
    store: &PidFileStore,
    pid: u32,
    policy: &StopPolicy,
) -> Result<StopOutcome, LifecycleError> {
    let path = store.path().map(PathBuf::from).unwrap_or_default();
    tracing::info!("Stopping PID {pid} (grace period {:?})", policy.grace_period());

    if let Err(e) = process.send_signal(pid, Signal::Hangup) {
        // Unreachable PID: no wait, no SIGKILL.
        tracing::warn!("Failed to signal PID {pid}: {e}");
        if store.exists() {
            return Err(LifecycleError::StopFailed { pid, path });
        }
        tracing::info!("PID file for {pid} already gone");
        return Ok(StopOutcome::Graceful);
    }

    if wait_until_removed(store, pid, policy) {
        tracing::info!("Stopped PID {pid}");
        return Ok(StopOutcome::Graceful);
    }

    tracing::warn!("PID {pid} did not exit within {:?}, sending SIGKILL", policy.grace_period());
    if let Err(e) = process.send_signal(pid, Signal::Kill) {
        tracing::warn!("Failed to SIGKILL PID {pid}: {e}");
    }
    store.remove()?;
    std::thread::sleep(policy.settle);

    if store.exists() {
        return Err(LifecycleError::StopFailed { pid, path });
    }

    tracing::info!("Stopped PID {pid} (forced)");
    Ok(StopOutcome::Forced)
}

/// Poll until the PID file is gone. Returns false if the policy's bound is hit.
fn wait_until_removed(store: &PidFileStore, pid: u32, policy: &StopPolicy) -> bool {
    for poll in 1..=policy.max_polls {
        std::thread::sleep(policy.poll_interval);
        if !store.exists() {
            return true;
        }
        if policy.progress_every > 0 && poll % policy.progress_every == 0 {
            tracing::info!(
                "Still waiting for PID {pid} ({:?} elapsed)",
                policy.poll_interval * poll
            );
        }
    }
    false
}
