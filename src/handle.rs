use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use flexi_logger::{LogSpecification, LoggerHandle};
use log::{info, warn};

use crate::error::{LogCloseError, LogInitError};
use crate::rotation::prune_expired;

/// Owns the running logger of one service. Dropping it closes it.
pub struct ServiceLogHandle {
    service_name: String,
    log_dir: PathBuf,
    log_file: PathBuf,
    max_age: Duration,
    logger: Option<LoggerHandle>,
    sweeper: Option<Sweeper>,
}

impl ServiceLogHandle {
    pub(crate) fn new(
        service_name: String,
        log_dir: PathBuf,
        log_file: PathBuf,
        max_age: Duration,
        logger: LoggerHandle,
        sweeper: Sweeper,
    ) -> Self {
        ServiceLogHandle {
            service_name,
            log_dir,
            log_file,
            max_age,
            logger: Some(logger),
            sweeper: Some(sweeper),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path of the live log file, `<dir>/<service>.log`.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn is_closed(&self) -> bool {
        self.logger.is_none()
    }

    /// Pushes buffered lines to both sinks.
    pub fn flush(&self) {
        if let Some(logger) = &self.logger {
            logger.flush();
        }
    }

    /// Closes the handle. Never fails: problems go to stderr.
    ///
    /// Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Err(e) = self.try_close() {
            eprintln!("close log of {} error: {}", self.service_name, e);
        }
    }

    /// Like [`close`](Self::close) but hands the failure to the caller.
    ///
    /// Records logged after this returns are discarded.
    pub fn try_close(&mut self) -> Result<(), LogCloseError> {
        let Some(logger) = self.logger.take() else {
            return Ok(());
        };
        let stopped = match self.sweeper.take() {
            Some(sweeper) => sweeper.stop(),
            None => Ok(()),
        };
        let pruned = prune_expired(&self.log_dir, &self.service_name, self.max_age)
            .map_err(|source| LogInitError::Prune {
                path: self.log_dir.clone(),
                source,
            });
        info!("closing log of {}", self.service_name);
        logger.flush();
        logger.set_new_spec(LogSpecification::off());
        logger.shutdown();
        stopped?;
        pruned.map(|_| ()).map_err(LogCloseError::Prune)
    }
}

impl Drop for ServiceLogHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Background thread deleting expired rotated files on a fixed interval.
pub(crate) struct Sweeper {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl Sweeper {
    pub(crate) fn spawn(
        log_dir: PathBuf,
        basename: String,
        max_age: Duration,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name(format!("{basename}-log-sweeper"))
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(e) = prune_expired(&log_dir, &basename, max_age) {
                            warn!("prune expired logs in {} error: {}", log_dir.display(), e);
                        }
                    }
                    // stop requested or handle gone
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        Ok(Sweeper { stop_tx, thread })
    }

    fn stop(self) -> Result<(), LogCloseError> {
        let _ = self.stop_tx.send(());
        self.thread.join().map_err(|_| LogCloseError::SweeperPanicked)
    }
}
