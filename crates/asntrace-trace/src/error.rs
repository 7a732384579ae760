use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to launch {binary}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing {0} pipe from probe process")]
    MissingPipe(&'static str),
    #[error("probe process exited with {status} before reporting any hop: {stderr}")]
    Exited { status: ExitStatus, stderr: String },
    #[error("failed to wait for probe process")]
    Wait(#[source] std::io::Error),
}
