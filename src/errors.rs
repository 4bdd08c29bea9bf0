use std::process::ExitStatus;
use thiserror::Error;

/// Failures of the external tool invocations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("executable `{name}` not found: {source}")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while reading command output: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}", describe_exit(.status, .stderr))]
    Command { status: ExitStatus, stderr: String },
}

fn describe_exit(status: &ExitStatus, stderr: &str) -> String {
    if stderr.is_empty() {
        format!("command exited with {}", status)
    } else {
        format!("command exited with {}: {}", status, stderr)
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
