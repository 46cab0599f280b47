mod cli;

use std::process::ExitCode;

#[cfg(unix)]
fn main() -> ExitCode {
    use warden_lifecycle::config::RuntimeConfig;
    use warden_lifecycle::error::EXIT_USAGE;
    use warden_lifecycle::lifecycle::controller::{Controller, Outcome};
    use warden_lifecycle::lifecycle::daemon::{DaemonState, Daemonize, ReexecDaemonizer};
    use warden_lifecycle::lifecycle::logging::init_logging;
    use warden_lifecycle::lifecycle::process::SystemProcess;
    use warden_server::HttpServer;

    dotenvy::dotenv().ok();
    let config = RuntimeConfig::from_env();

    let daemonizer = match ReexecDaemonizer::from_env() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERROR: cannot locate own executable: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    // The background process logs to file when a log dir is configured,
    // since its stderr is released once the server is up.
    let detached = daemonizer.state() == DaemonState::Detached;
    let _guard = init_logging(&config, detached);

    let argv = match cli::collect_args(std::env::args_os()) {
        Ok(argv) => argv,
        Err(bad) => {
            eprintln!("ERROR: argument is not valid UTF-8: {}", bad.to_string_lossy());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let mut server = HttpServer::new();
    let controller = Controller::new(SystemProcess, daemonizer);

    match controller.run(&argv, &mut server) {
        Ok(Outcome::Help) => {
            print!("{}", cli::help(&server));
            ExitCode::SUCCESS
        }
        Ok(Outcome::Version) => {
            println!("{}", cli::version(&server));
            ExitCode::SUCCESS
        }
        Ok(Outcome::Spawned { pid }) => {
            tracing::info!("Started in background as PID {pid}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Stopped | Outcome::Finished) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(not(unix))]
fn main() -> ExitCode {
    eprintln!("ERROR: warden is only supported on Unix systems");
    ExitCode::FAILURE
}
