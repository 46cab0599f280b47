//! Thin wrappers around sd-notify for the systemd readiness protocol.

/// Notify systemd that the service is ready.
pub fn sd_ready() {
    let _ = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]);
}

/// Notify systemd that the service is stopping.
pub fn sd_stopping() {
    let _ = sd_notify::notify(false, &[sd_notify::NotifyState::Stopping]);
}
