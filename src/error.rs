// error.rs

use std::ffi::NulError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the on-disk history log. Any of these leaves the log disabled
/// or skips the affected row; none of them reaches the host terminal.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("cannot create history directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history path {} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot open history file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write history row: {0}")]
    Write(#[source] io::Error),
    #[error("failed to truncate history file: {0}")]
    Truncate(#[source] io::Error),
}

/// Failures while starting or waiting for the viewer.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("viewer command contains a NUL byte")]
    InvalidCommand(#[from] NulError),
    #[error("failed to fork viewer process: {0}")]
    Fork(#[source] nix::Error),
    #[error("failed to wait for viewer process: {0}")]
    Wait(#[source] nix::Error),
    #[error("failed to start viewer worker: {0}")]
    Worker(#[source] io::Error),
}
