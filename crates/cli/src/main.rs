//! farabi-relay entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: read flags / environment variables into
//!    [`args::Args`] and validate them into a [`relay::RelayConfig`].
//! 2. **Wire observability**: install a `tracing-subscriber` with a JSON (or
//!    pretty) layer and, optionally, an OpenTelemetry OTLP exporter. All
//!    `tracing` spans and events emitted by every crate in the workspace flow
//!    through this subscriber.
//! 3. **Construct infrastructure**: create the [`github::GithubDispatchClient`]
//!    and inject it, with the config, into the [`listener`] router.
//! 4. **Serve**: bind the listen address and serve until Ctrl-C or SIGTERM,
//!    letting in-flight requests finish.

mod args;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use github::GithubDispatchClient;
use listener::AppState;

use crate::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let telemetry = telemetry::init(args.log_format, args.otlp_endpoint.as_deref())?;

    let result = run(&args).await;
    if let Err(e) = &result {
        let message = format!("{e:#}");
        error!(error = %message, "farabi-relay stopped with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.relay_config().context("invalid relay configuration")?;
    info!(
        owner = %config.owner(),
        repository = %config.repository(),
        workflow = %config.workflow_file(),
        branch = %config.branch(),
        "starting farabi-relay"
    );

    let dispatcher = GithubDispatchClient::new().context("failed to build GitHub HTTP client")?;
    let state = AppState::new(config, Arc::new(dispatcher));

    let tcp = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    listener::serve(tcp, state, shutdown_signal())
        .await
        .context("server error")?;

    info!("farabi-relay shut down");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, draining in-flight requests");
}
