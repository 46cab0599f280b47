//! Server-side lifecycle: readiness notification and shutdown signals.

use std::ffi::OsStr;

pub mod notify;
#[cfg(unix)]
pub mod signal;

/// Trait for lifecycle event notification (foreground vs systemd).
pub trait Lifecycle: Send + Sync {
    /// Called when the server is ready to accept connections.
    fn on_ready(&self);
    /// Called when the server is about to stop.
    fn on_stopping(&self);
    /// Where readiness is reported, for logs.
    fn name(&self) -> &'static str;
}

/// Foreground lifecycle — logs events only.
pub struct ForegroundLifecycle;

impl Lifecycle for ForegroundLifecycle {
    fn on_ready(&self) {
        tracing::info!("Service ready");
    }

    fn on_stopping(&self) {
        tracing::info!("Service stopping...");
    }

    fn name(&self) -> &'static str {
        "foreground"
    }
}

/// Systemd lifecycle — sends sd-notify messages and logs.
pub struct SystemdLifecycle;

impl Lifecycle for SystemdLifecycle {
    fn on_ready(&self) {
        notify::sd_ready();
        tracing::info!("Service ready (notified systemd)");
    }

    fn on_stopping(&self) {
        notify::sd_stopping();
        tracing::info!("Service stopping (notified systemd)...");
    }

    fn name(&self) -> &'static str {
        "systemd"
    }
}

/// Returns `SystemdLifecycle` if `NOTIFY_SOCKET` is set, else `ForegroundLifecycle`.
pub fn detect_lifecycle() -> Box<dyn Lifecycle> {
    lifecycle_for(std::env::var_os("NOTIFY_SOCKET").as_deref())
}

fn lifecycle_for(notify_socket: Option<&OsStr>) -> Box<dyn Lifecycle> {
    match notify_socket {
        Some(socket) if !socket.is_empty() => Box::new(SystemdLifecycle),
        _ => Box::new(ForegroundLifecycle),
    }
}
