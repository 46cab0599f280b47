//! The HTTP server as a `Server` collaborator: it owns its tokio runtime so
//! the controller can stay synchronous and daemonize before any threads exist.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use warden_lifecycle::{Server, ServerExit};

use crate::lifecycle::{self, Lifecycle};
use crate::{AppState, build_router};

/// Options the server takes from the passthrough arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "warden-server",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ServerArgs {
    /// Listen host
    #[arg(long, default_value = "127.0.0.1", env = "WARDEN_HOST")]
    pub host: String,

    /// Listen port (0 picks a free port)
    #[arg(long, default_value_t = 8080, env = "WARDEN_PORT")]
    pub port: u16,

    /// Seconds to let open connections drain after a shutdown request
    #[arg(long, default_value_t = 5, env = "WARDEN_SHUTDOWN_GRACE")]
    pub shutdown_grace: u64,
}

impl Default for ServerArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            shutdown_grace: 5,
        }
    }
}

struct Running {
    runtime: Runtime,
    task: JoinHandle<anyhow::Result<()>>,
}

pub struct HttpServer {
    args: ServerArgs,
    lifecycle: Arc<dyn Lifecycle>,
    shutdown_tx: watch::Sender<bool>,
    local_addr: Option<SocketAddr>,
    running: Option<Running>,
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpServer {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            args: ServerArgs::default(),
            lifecycle: Arc::from(lifecycle::detect_lifecycle()),
            shutdown_tx,
            local_addr: None,
            running: None,
        }
    }

    pub fn args(&self) -> &ServerArgs {
        &self.args
    }

    /// Address actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Ask a started server to shut down, as a stop signal would.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Server for HttpServer {
    fn configure(&mut self, args: &[String]) -> anyhow::Result<()> {
        self.args = ServerArgs::try_parse_from(args).map_err(|e| {
            let code = u8::try_from(e.exit_code()).unwrap_or(2);
            ServerExit::new(code, e.render().to_string())
        })?;
        Ok(())
    }

    fn start(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(self.running.is_none(), "server already started");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let addr = format!("{}:{}", self.args.host, self.args.port);
        let grace = Duration::from_secs(self.args.shutdown_grace);
        let lifecycle = self.lifecycle.clone();
        let shutdown_tx = self.shutdown_tx.clone();

        let (task, local_addr) = runtime.block_on(async move {
            // Held before the signal handler runs: it stops listening once
            // every receiver is gone.
            let shutdown_rx = shutdown_tx.subscribe();

            #[cfg(unix)]
            {
                let handler = crate::lifecycle::signal::SignalHandler::install(shutdown_tx.clone())
                    .context("failed to install signal handlers")?;
                tokio::spawn(handler.run());
            }

            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            let local_addr = listener.local_addr()?;
            tracing::info!("Starting HTTP server on {local_addr} ({})", lifecycle.name());
            lifecycle.on_ready();

            let task = tokio::spawn(serve_http(listener, shutdown_rx, lifecycle, grace));
            Ok::<_, anyhow::Error>((task, local_addr))
        })?;

        self.local_addr = Some(local_addr);
        self.running = Some(Running { runtime, task });
        Ok(())
    }

    fn join(&mut self) -> anyhow::Result<()> {
        let Running { runtime, task } = self.running.take().context("server not started")?;
        runtime.block_on(task).context("server task panicked")?
    }

    fn usage(&self) -> String {
        ServerArgs::command()
            .override_usage("warden [daemon opts] [server opts]")
            .render_help()
            .to_string()
    }

    fn version(&self) -> String {
        format!("warden-server {}", env!("CARGO_PKG_VERSION"))
    }
}

async fn serve_http(
    listener: TcpListener,
    shutdown_rx: watch::Receiver<bool>,
    lifecycle: Arc<dyn Lifecycle>,
    grace: Duration,
) -> anyhow::Result<()> {
    let app_router = build_router(AppState::new());

    let mut requested = shutdown_rx.clone();
    let stopping = lifecycle.clone();
    let shutdown = async move {
        let _ = requested.wait_for(|v| *v).await;
        stopping.on_stopping();
    };

    let mut deadline_rx = shutdown_rx;
    let drain_deadline = async move {
        if deadline_rx.wait_for(|v| *v).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    let serve = axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown)
        .into_future();

    tokio::select! {
        result = serve => result?,
        _ = drain_deadline => {
            tracing::warn!("Connections still open after {grace:?}, closing them");
        }
    }

    tracing::info!("Server shut down.");
    Ok(())
}
