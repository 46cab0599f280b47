//! Command-line plumbing around the controller: argument capture and the
//! help/version text.

use std::ffi::OsString;

use warden_lifecycle::Server;

const DAEMON_USAGE: &str = "\
Daemon options:
 --start             detach from the terminal and run in the background
 --stop              stop the running server recorded in the PID file
 --restart           stop the running server, then start a new one
 --pid <file>        PID file
 --chdir <dir>       working directory for the background server
 --help              print this help
 --version           print version information
";

/// The arguments after the program name. Non-UTF-8 arguments are rejected
/// rather than mangled, since they are re-executed verbatim when detaching.
pub fn collect_args(raw: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, OsString> {
    raw.into_iter().skip(1).map(OsString::into_string).collect()
}

pub fn help(server: &impl Server) -> String {
    format!("{DAEMON_USAGE}\n{}", server.usage())
}

pub fn version(server: &impl Server) -> String {
    format!("warden {}\n{}", env!("CARGO_PKG_VERSION"), server.version())
}
