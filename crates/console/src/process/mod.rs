mod utils;

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use service::{ServiceConfig, ServiceState};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Install the global subscriber: compact stdout, plus daily files under
/// `log_dir` when one is given. Keep the guards alive until exit.
pub fn init_tracing(log_level: tracing::Level, log_dir: Option<&Path>) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(guard);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    let file_layer = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "signoff-console.log");
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        let env_filter = EnvFilter::builder()
            .with_default_directive(log_level.into())
            .from_env_lossy();
        tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(false)
            .with_writer(file_writer)
            .with_filter(env_filter)
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guards
}

/// Run the console until SIGINT or SIGTERM.
pub async fn spawn_service(service_config: &ServiceConfig) {
    utils::register_panic_logger();
    utils::report_build_info();

    let (graceful_waiter, shutdown_rx) = match utils::graceful_shutdown_blocker() {
        Ok(blocker) => blocker,
        Err(e) => {
            tracing::error!("failed to install signal handlers: {}", e);
            std::process::exit(2);
        }
    };

    let (state, action_receiver) = match ServiceState::from_config(service_config) {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(3);
        }
    };

    let mut handles = Vec::new();

    // Effect worker
    let worker_store = state.snapshots().clone();
    let worker_rx = shutdown_rx.clone();
    let effect_delay = service_config.effect_delay;
    handles.push(tokio::spawn(async move {
        service::run_worker(
            worker_store,
            action_receiver.into_async(),
            effect_delay,
            worker_rx,
        )
        .await;
    }));

    // HTML server
    let html_listen_addr: SocketAddr = service_config.listen_addr;
    let html_config = service_config.clone();
    let html_rx = shutdown_rx.clone();
    handles.push(tokio::spawn(async move {
        tracing::info!("Starting HTML server on {}", html_listen_addr);
        if let Err(e) = service::http::run_html(html_config, state, html_rx).await {
            tracing::error!("HTML server error: {}", e);
        }
    }));

    let _ = graceful_waiter.await;

    if timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(handles))
        .await
        .is_err()
    {
        tracing::error!(
            "Failed to shut down within {} seconds",
            FINAL_SHUTDOWN_TIMEOUT.as_secs()
        );
        std::process::exit(4);
    }
}
