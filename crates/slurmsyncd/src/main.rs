//! slurmsyncd - Slurm node registry sync controller.
//!
//! Watches slurmd pods in a Kubernetes namespace and keeps the Slurm node
//! registry in sync: a full diff at startup, then incremental reconciliation
//! driven by the pod watch stream.

use anyhow::Context;
use clap::Parser;
use slurmsync_observe::PodObserver;
use slurmsync_registry::{NodeRegistry, Scontrol};
use slurmsyncd::config::Config;
use slurmsyncd::reconcile::Reconciler;
use slurmsyncd::watch::EventLoop;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("slurmsyncd=info".parse()?)
                .add_directive("slurmsync_registry=info".parse()?)
                .add_directive("slurmsync_observe=info".parse()?),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!(
        namespace = %config.namespace,
        selector = %config.label_selector,
        "starting slurmsync controller"
    );

    let observer = PodObserver::connect(&config.namespace, &config.label_selector)
        .await
        .context("failed to establish cluster client session")?;

    let registry = NodeRegistry::new(Scontrol::with_path(&config.scontrol_path));
    let reconciler = Reconciler::new(registry);

    // A failed initial sync is not fatal: the registry state is unknown for
    // this cycle and the event loop re-evaluates as events arrive.
    if let Err(e) = reconciler.full_sync(&observer).await {
        error!(error = %e, "initial sync failed");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut event_loop = EventLoop::new(
        reconciler,
        observer,
        config.reconnect_delay(),
        config.resync_interval(),
        shutdown_rx,
    );
    event_loop.run().await?;

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
