use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use flexi_logger::{Duplicate, FileSpec, Logger};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::caller;
use crate::config::{LogConfig, LOG_SUFFIX};
use crate::dir::ensure_log_dir;
use crate::error::LogInitError;
use crate::format::{console_format, json_format};
use crate::handle::{ServiceLogHandle, Sweeper};
use crate::rotation::prune_expired;

/// Minimum severity of both sinks.
const LOG_SPEC: &str = "info";

/// Set once this crate owns the process logger; the `log` facade accepts a single logger.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// What a service needs from its log bootstrap.
pub trait LogSetup {
    /// Creates the log directory, attaches the rotating JSON file sink and
    /// the console sink, and installs them as the process logger.
    ///
    /// Only one call per process can succeed. Later calls fail with
    /// [`LogInitError::AlreadyInstalled`] before touching the filesystem. If
    /// some other crate installed a `log` logger first, the directory and the
    /// live file are created before the call fails with [`LogInitError::Sink`].
    fn initialize(
        &self,
        service_name: &str,
        cancel: &CancellationToken,
    ) -> Result<ServiceLogHandle, LogInitError>;

    fn ensure_directory(&self, path: &Path) -> io::Result<()> {
        ensure_log_dir(path)
    }

    fn format_caller_path<'a>(&self, full_path: &'a str) -> &'a str {
        caller::format_caller_path(full_path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogInitializer {
    config: LogConfig,
}

impl LogInitializer {
    pub fn new(config: LogConfig) -> Self {
        LogInitializer { config }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}

impl LogSetup for LogInitializer {
    fn initialize(
        &self,
        service_name: &str,
        cancel: &CancellationToken,
    ) -> Result<ServiceLogHandle, LogInitError> {
        if service_name.is_empty() {
            return Err(LogInitError::EmptyServiceName);
        }
        // only honored before anything touches the filesystem
        if cancel.is_cancelled() {
            return Err(LogInitError::Cancelled);
        }
        self.config.validate()?;
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(LogInitError::AlreadyInstalled);
        }
        let installed = install(&self.config, service_name);
        if installed.is_err() {
            INSTALLED.store(false, Ordering::SeqCst);
        }
        installed
    }
}

fn install(config: &LogConfig, service_name: &str) -> Result<ServiceLogHandle, LogInitError> {
    let log_dir = config.log_dir(service_name);
    ensure_log_dir(&log_dir).map_err(|source| LogInitError::Directory {
        path: log_dir.clone(),
        source,
    })?;
    let log_file = config.log_file(service_name);
    let policy = config.rotation;

    let logger = Logger::try_with_str(LOG_SPEC)?
        .log_to_file(
            FileSpec::default()
                .directory(&log_dir)
                .basename(service_name)
                .suffix(LOG_SUFFIX)
                .use_timestamp(false),
        )
        .duplicate_to_stdout(Duplicate::Info)
        .format_for_files(json_format)
        .format_for_stdout(console_format)
        .rotate(policy.criterion(), policy.naming(), policy.cleanup())
        .append()
        .write_mode(config.write_strategy.write_mode())
        .error_channel(config.error_channel());
    // the live file is <service>_rCURRENT.log, the link gives it the stable name
    #[cfg(unix)]
    let logger = logger.create_symlink(&log_file);
    let logger = logger.start()?;

    let sweeper = Sweeper::spawn(
        log_dir.clone(),
        service_name.to_string(),
        policy.max_age,
        config.prune_interval,
    )
    .map_err(LogInitError::Sweeper);
    let sweeper = match sweeper {
        Ok(sweeper) => sweeper,
        Err(e) => {
            logger.shutdown();
            return Err(e);
        }
    };

    info!("log is output to {}", log_file.display());
    match prune_expired(&log_dir, service_name, policy.max_age) {
        Ok(0) => {}
        Ok(n) => info!("pruned {} log files older than {:?}", n, policy.max_age),
        Err(e) => warn!("prune expired logs in {} error: {}", log_dir.display(), e),
    }

    Ok(ServiceLogHandle::new(
        service_name.to_string(),
        log_dir,
        log_file,
        policy.max_age,
        logger,
        sweeper,
    ))
}
