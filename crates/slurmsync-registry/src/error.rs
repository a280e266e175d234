//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur while talking to the Slurm registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The scontrol binary could not be executed at all.
    #[error("failed to run {command}: {source}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// scontrol ran but reported failure.
    #[error("{command} failed ({status}): {stderr}")]
    CommandFailed {
        /// The command line that was attempted.
        command: String,
        /// Exit status reported by the process.
        status: String,
        /// Trimmed stderr output.
        stderr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_display() {
        let err = RegistryError::Spawn {
            command: "scontrol show nodes -o".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "failed to run scontrol show nodes -o: no such file"
        );
    }

    #[test]
    fn command_failed_display() {
        let err = RegistryError::CommandFailed {
            command: "scontrol delete nodename=worker-0".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "slurm_delete_node error: Invalid node name specified".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("scontrol delete nodename=worker-0"));
        assert!(msg.contains("exit status: 1"));
        assert!(msg.contains("Invalid node name"));
    }
}
