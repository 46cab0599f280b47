//! In-memory stand-ins for the OS and the server, shared by the unit tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::daemon::{ChildHandle, DaemonState, Daemonize};
use super::pid_file::PidFileStore;
use super::process::{ProcessControl, Signal};
use crate::server::{Server, ServerExit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SessionLeader,
    ChangeDir(PathBuf),
    Signal(u32, Signal),
    ReleaseStdio,
    Spawn(Vec<String>),
    Configure(Vec<String>),
    /// Server started; carries what the PID file held at that moment.
    Start(Option<u32>),
    Join,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

/// How the fake target process reacts to signals.
#[derive(Debug, Clone)]
pub enum OnSignal {
    Ignore,
    /// Signal delivery itself fails (no such process).
    Fail,
    /// Remove the PID file shortly after the mild signal.
    RemoveAfter { path: PathBuf, delay: Duration },
    /// Write the PID file back shortly after SIGKILL.
    RecreateOnKill { path: PathBuf, delay: Duration },
}

pub struct FakeProcess {
    pub pid: u32,
    on_signal: OnSignal,
    fail_chdir: bool,
    journal: Journal,
}

impl FakeProcess {
    pub fn new(on_signal: OnSignal) -> Self {
        Self {
            pid: 4321,
            on_signal,
            fail_chdir: false,
            journal: Journal::default(),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn failing_chdir(mut self) -> Self {
        self.fail_chdir = true;
        self
    }

    pub fn signals(&self) -> Vec<(u32, Signal)> {
        self.journal
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Signal(pid, sig) => Some((pid, sig)),
                _ => None,
            })
            .collect()
    }
}

fn after(delay: Duration, f: impl FnOnce() + Send + 'static) {
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        f();
    });
}

impl ProcessControl for FakeProcess {
    fn current_pid(&self) -> u32 {
        self.pid
    }

    fn become_session_leader(&self) -> io::Result<()> {
        self.journal.push(Event::SessionLeader);
        Ok(())
    }

    fn change_dir(&self, dir: &Path) -> io::Result<()> {
        self.journal.push(Event::ChangeDir(dir.to_path_buf()));
        if self.fail_chdir {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(())
    }

    fn send_signal(&self, pid: u32, signal: Signal) -> io::Result<()> {
        self.journal.push(Event::Signal(pid, signal));
        match (&self.on_signal, signal) {
            (OnSignal::Fail, _) => return Err(io::Error::from_raw_os_error(libc::ESRCH)),
            (OnSignal::RemoveAfter { path, delay }, Signal::Hangup) => {
                let path = path.clone();
                after(*delay, move || {
                    let _ = std::fs::remove_file(path);
                });
            }
            (OnSignal::RecreateOnKill { path, delay }, Signal::Kill) => {
                let path = path.clone();
                after(*delay, move || {
                    let _ = std::fs::write(path, format!("{pid}\n"));
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn release_std_streams(&self) -> io::Result<()> {
        self.journal.push(Event::ReleaseStdio);
        Ok(())
    }
}

pub struct FakeDaemonizer {
    state: DaemonState,
    journal: Journal,
}

impl FakeDaemonizer {
    pub fn new(state: DaemonState, journal: Journal) -> Self {
        Self { state, journal }
    }
}

impl Daemonize for FakeDaemonizer {
    fn state(&self) -> DaemonState {
        self.state
    }

    fn spawn_detached(&self, args: &[String]) -> io::Result<ChildHandle> {
        self.journal.push(Event::Spawn(args.to_vec()));
        Ok(ChildHandle { pid: 9999 })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Failure {
    #[default]
    None,
    Configure,
    Start,
    Join,
    /// `join` fails with a specific exit status.
    Exit(u8),
}

pub struct FakeServer {
    journal: Journal,
    pid_file: PidFileStore,
    failure: Failure,
}

impl FakeServer {
    pub fn new(journal: Journal, pid_file: PidFileStore) -> Self {
        Self {
            journal,
            pid_file,
            failure: Failure::None,
        }
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }
}

impl Server for FakeServer {
    fn configure(&mut self, args: &[String]) -> anyhow::Result<()> {
        self.journal.push(Event::Configure(args.to_vec()));
        if self.failure == Failure::Configure {
            anyhow::bail!("bad server arguments");
        }
        Ok(())
    }

    fn start(&mut self) -> anyhow::Result<()> {
        let recorded = self.pid_file.read().ok().flatten();
        self.journal.push(Event::Start(recorded));
        if self.failure == Failure::Start {
            anyhow::bail!("address in use");
        }
        Ok(())
    }

    fn join(&mut self) -> anyhow::Result<()> {
        self.journal.push(Event::Join);
        match self.failure {
            Failure::Join => anyhow::bail!("server crashed"),
            Failure::Exit(code) => Err(ServerExit::new(code, "server exited").into()),
            _ => Ok(()),
        }
    }

    fn usage(&self) -> String {
        "Server opts:\n --port n".to_string()
    }

    fn version(&self) -> String {
        "fake-server 1.0".to_string()
    }
}
