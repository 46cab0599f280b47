//! PID file persistence and the RAII guard the background process holds
//! while its server runs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PidFileError;

/// The single PID file an instance is tracked by. With no path configured
/// every operation is a no-op and `read` always reports no instance.
#[derive(Debug, Clone, Default)]
pub struct PidFileStore {
    path: Option<PathBuf>,
}

impl PidFileStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Anchor a relative path to the current directory, so the same file is
    /// addressed after a working directory change.
    pub fn into_absolute(self) -> Result<Self, PidFileError> {
        let Some(path) = self.path else {
            return Ok(self);
        };
        let absolute =
            std::path::absolute(&path).map_err(|source| PidFileError::Io { path, source })?;
        Ok(Self::new(Some(absolute)))
    }

    /// Read the recorded PID. `Ok(None)` means no file exists; a file that
    /// exists but does not hold a PID on its first line is an error.
    pub fn read(&self) -> Result<Option<u32>, PidFileError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PidFileError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let first = contents.lines().next().unwrap_or_default().trim();
        match first.parse::<u32>() {
            Ok(pid) if pid > 0 => Ok(Some(pid)),
            _ => Err(PidFileError::Parse {
                path: path.to_path_buf(),
                content: first.to_string(),
            }),
        }
    }

    /// Record `pid`, replacing any previous content.
    pub fn write(&self, pid: u32) -> Result<(), PidFileError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        fs::write(path, format!("{pid}\n")).map_err(|source| PidFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Wrote PID {pid} to {}", path.display());
        Ok(())
    }

    /// Delete the file. A file that is already gone is not an error.
    pub fn remove(&self) -> Result<(), PidFileError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PidFileError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }
}

/// RAII guard for a PID file: writes the PID on acquisition and removes the
/// file on drop, so every exit path of the serving process cleans up.
pub struct PidFileGuard {
    store: PidFileStore,
    armed: bool,
}

impl PidFileGuard {
    /// Write `pid` to the store and take responsibility for removing it.
    pub fn acquire(store: PidFileStore, pid: u32) -> Result<Self, PidFileError> {
        store.write(pid)?;
        Ok(Self { store, armed: true })
    }

    /// Remove the file now, reporting any failure.
    pub fn release(mut self) -> Result<(), PidFileError> {
        self.armed = false;
        self.store.remove()
    }
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.store.remove() {
            tracing::warn!("Failed to remove PID file on exit: {e}");
        }
    }
}
