//! Splits the command line into daemon-control flags and passthrough
//! arguments for the wrapped server.

use std::path::PathBuf;

use crate::error::ArgumentError;

/// Prefix shared by every control flag. A value may never start with it.
const FLAG_PREFIX: &str = "--";

const PID: &str = "--pid";
const CHDIR: &str = "--chdir";
const START: &str = "--start";
const STOP: &str = "--stop";
const RESTART: &str = "--restart";
const HELP: &str = "--help";
const VERSION: &str = "--version";

const VALUE_FLAGS: [&str; 2] = [PID, CHDIR];
const BOOL_FLAGS: [&str; 5] = [START, STOP, RESTART, HELP, VERSION];

/// The daemon-control options recognized on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlArgs {
    pub pid_file: Option<PathBuf>,
    pub chdir: Option<PathBuf>,
    pub start: bool,
    pub stop: bool,
    pub restart: bool,
    pub help: bool,
    pub version: bool,
}

/// What this invocation was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleIntent {
    RunForeground,
    Start,
    Stop,
    Restart,
    Help,
    Version,
}

impl LifecycleIntent {
    /// Whether a running instance should be stopped first.
    pub fn stops(self) -> bool {
        matches!(self, Self::Stop | Self::Restart)
    }

    /// Whether a background instance should be started.
    pub fn starts(self) -> bool {
        matches!(self, Self::Start | Self::Restart)
    }
}

impl ControlArgs {
    pub fn intent(&self) -> LifecycleIntent {
        if self.help {
            LifecycleIntent::Help
        } else if self.version {
            LifecycleIntent::Version
        } else if self.restart || (self.stop && self.start) {
            LifecycleIntent::Restart
        } else if self.stop {
            LifecycleIntent::Stop
        } else if self.start {
            LifecycleIntent::Start
        } else {
            LifecycleIntent::RunForeground
        }
    }
}

/// Result of classifying a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub control: ControlArgs,
    /// Unrecognized tokens, in their original order.
    pub passthrough: Vec<String>,
}

/// Classify `args` (without the program name).
///
/// A value-bearing flag consumes the next token. When that token is missing
/// or itself looks like a flag, classification fails rather than guessing.
/// For repeated value flags the first occurrence wins; all occurrences are
/// removed from the passthrough.
pub fn classify(args: &[String]) -> Result<Classified, ArgumentError> {
    let mut control = ControlArgs::default();
    let mut passthrough = Vec::with_capacity(args.len());
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        if let Some(flag) = VALUE_FLAGS.iter().copied().find(|f| *f == token.as_str()) {
            let value = match tokens.next() {
                Some(v) if !v.starts_with(FLAG_PREFIX) => PathBuf::from(v),
                _ => return Err(ArgumentError::MissingValue { flag }),
            };
            let slot = match flag {
                PID => &mut control.pid_file,
                _ => &mut control.chdir,
            };
            slot.get_or_insert(value);
            continue;
        }

        match BOOL_FLAGS.iter().copied().find(|f| *f == token.as_str()) {
            Some(START) => control.start = true,
            Some(STOP) => control.stop = true,
            Some(RESTART) => control.restart = true,
            Some(HELP) => control.help = true,
            Some(VERSION) => control.version = true,
            _ => passthrough.push(token.clone()),
        }
    }

    Ok(Classified {
        control,
        passthrough,
    })
}
