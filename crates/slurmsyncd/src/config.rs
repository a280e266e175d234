//! Controller configuration.
//!
//! The configuration surface is environment-driven: every flag has a
//! `SLURMSYNC_*` variable, so the controller runs unchanged as a cluster
//! workload where flags are awkward to plumb through.

use std::time::Duration;

use clap::Parser;

use crate::error::SyncError;

/// Configuration for the sync controller.
#[derive(Debug, Clone, Parser)]
#[command(name = "slurmsyncd")]
#[command(about = "Keeps the Slurm node registry in sync with slurmd pods")]
#[command(version)]
pub struct Config {
    /// Namespace to watch for slurmd pods.
    #[arg(long, env = "SLURMSYNC_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Label selector identifying slurmd pods.
    #[arg(
        long,
        env = "SLURMSYNC_LABEL_SELECTOR",
        default_value = "app.kubernetes.io/component=slurmd"
    )]
    pub label_selector: String,

    /// Seconds to wait before reopening a terminated watch stream.
    #[arg(long, env = "SLURMSYNC_RECONNECT_DELAY_SECS", default_value_t = 5)]
    pub reconnect_delay_secs: u64,

    /// Interval in seconds between periodic full resyncs; 0 disables them.
    #[arg(long, env = "SLURMSYNC_RESYNC_INTERVAL_SECS", default_value_t = 0)]
    pub resync_interval_secs: u64,

    /// Path to the scontrol binary.
    #[arg(long, env = "SLURMSYNC_SCONTROL_PATH", default_value = "scontrol")]
    pub scontrol_path: String,
}

impl Config {
    /// Validate the configuration before startup proceeds.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.namespace.is_empty() {
            return Err(SyncError::Config("namespace cannot be empty".to_string()));
        }

        if self.label_selector.is_empty() {
            return Err(SyncError::Config(
                "label selector cannot be empty".to_string(),
            ));
        }

        if self.reconnect_delay_secs == 0 {
            return Err(SyncError::Config(
                "reconnect delay must be at least one second".to_string(),
            ));
        }

        if self.scontrol_path.is_empty() {
            return Err(SyncError::Config(
                "scontrol path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Backoff delay before reopening a watch stream.
    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Periodic resync interval, if enabled.
    #[must_use]
    pub const fn resync_interval(&self) -> Option<Duration> {
        match self.resync_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
