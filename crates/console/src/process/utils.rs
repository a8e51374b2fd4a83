use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use common::prelude::build_info;

/// How long in-flight requests get after SIGTERM before shutdown starts.
const REQUEST_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Resolves on SIGINT right away, or on SIGTERM after the grace period,
/// once every receiver has been told to stop.
pub fn graceful_shutdown_blocker() -> std::io::Result<(JoinHandle<()>, watch::Receiver<()>)> {
    shutdown_blocker(REQUEST_GRACE_PERIOD)
}

fn shutdown_blocker(grace: Duration) -> std::io::Result<(JoinHandle<()>, watch::Receiver<()>)> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!(grace_secs = grace.as_secs(), "Received SIGTERM, shutting down after grace period");
                tokio::time::sleep(grace).await;
            }
        }
        let _ = shutdown_tx.send(());
    });

    Ok((handle, shutdown_rx))
}

pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| {
        tracing::error!("process panicked: {}", panic);
    }));
}

pub fn report_build_info() {
    let info = build_info();
    tracing::info!(
        version = info.package_version,
        repo_version = info.repo_version,
        profile = info.build_profile,
        target = info.build_target,
        built_at = info.build_timestamp,
        rustc = info.rust_version,
        "starting signoff console"
    );
}
