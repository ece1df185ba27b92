use std::io;
use std::path::PathBuf;

use flexi_logger::FlexiLoggerError;
use thiserror::Error;

/// Errors raised while bringing up the service logger.
#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// Rotation limits or the prune interval cannot be used.
    #[error("invalid log configuration: {0}")]
    InvalidConfig(&'static str),

    /// This crate already installed the process logger.
    #[error("a service logger is already installed in this process")]
    AlreadyInstalled,

    #[error("log initialization cancelled before it started")]
    Cancelled,

    /// The log directory could not be verified or created.
    #[error("failed to create directory for log files {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// flexi_logger rejected the sink configuration, or a logger is already
    /// installed in this process.
    #[error("failed to initialize rotating log sink: {0}")]
    Sink(#[from] FlexiLoggerError),

    #[error("failed to start expired log sweeper: {0}")]
    Sweeper(#[source] io::Error),

    #[error("failed to prune expired log files in {}: {source}", path.display())]
    Prune {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while releasing a [`ServiceLogHandle`](crate::ServiceLogHandle).
#[derive(Debug, Error)]
pub enum LogCloseError {
    #[error("expired log sweeper panicked")]
    SweeperPanicked,

    #[error("final prune pass failed: {0}")]
    Prune(#[source] LogInitError),
}
