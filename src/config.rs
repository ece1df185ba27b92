use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use flexi_logger::{ErrorChannel, WriteMode};

use crate::error::LogInitError;
use crate::rotation::RotationPolicy;
use crate::DynError;

const LOG_SUBDIR: &str = "log";
const LOGFILES_SUBDIR: &str = "logfiles";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
pub const LOG_SUFFIX: &str = "log";

/// Sets up a rotating file log plus console output for one service and emits sample records.
#[derive(Parser, Debug)]
#[command(author, version=None, about, long_about = None)]
pub struct Param {
    #[arg(long, value_name = "SERVICE_NAME", default_value = "service")]
    pub service_name: String,
    #[arg(
        long,
        value_name = "LOG_ROOT",
        default_value = "..",
        help = "logs are written to <LOG_ROOT>/log/logfiles/<SERVICE_NAME>/<SERVICE_NAME>.log"
    )]
    pub log_root: PathBuf,
    #[arg(long, value_name = "MB", default_value = "100")]
    pub max_size_mb: u64,
    #[arg(long, value_name = "COUNT", default_value = "50")]
    pub max_backups: usize,
    #[arg(long, value_name = "DAYS", default_value = "14")]
    pub max_age_days: u64,
    #[arg(long, help = "write log lines from a background thread")]
    pub async_write: bool,
    #[arg(
        long,
        value_name = "FILE_PATH",
        help = "where internal logger errors go, stderr if absent"
    )]
    pub error_log: Option<PathBuf>,
    #[arg(long, value_name = "SECONDS", default_value = "3600")]
    pub prune_interval_secs: u64,
    #[arg(long, value_name = "N", default_value = "2")]
    pub workers: usize,
    #[arg(long, value_name = "N", default_value = "5")]
    pub records: usize,
}

/// How lines reach the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteStrategy {
    /// Every record is written before the log call returns.
    #[default]
    Direct,
    /// Records are handed to a background writer thread; flushed on close.
    Async,
}

impl WriteStrategy {
    pub(crate) fn write_mode(self) -> WriteMode {
        match self {
            WriteStrategy::Direct => WriteMode::Direct,
            WriteStrategy::Async => WriteMode::Async,
        }
    }
}

/// Everything the initializer needs besides the service name.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_root: PathBuf,
    pub rotation: RotationPolicy,
    pub write_strategy: WriteStrategy,
    pub error_log: Option<PathBuf>,
    pub prune_interval: Duration,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_root: PathBuf::from(".."),
            rotation: RotationPolicy::default(),
            write_strategy: WriteStrategy::Direct,
            error_log: None,
            prune_interval: Duration::from_secs(60 * 60),
        }
    }
}

impl LogConfig {
    pub fn with_log_root(mut self, log_root: impl Into<PathBuf>) -> Self {
        self.log_root = log_root.into();
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_write_strategy(mut self, write_strategy: WriteStrategy) -> Self {
        self.write_strategy = write_strategy;
        self
    }

    pub fn with_error_log(mut self, error_log: impl Into<PathBuf>) -> Self {
        self.error_log = Some(error_log.into());
        self
    }

    pub fn with_prune_interval(mut self, prune_interval: Duration) -> Self {
        self.prune_interval = prune_interval;
        self
    }

    /// Checks the rotation limits and the prune interval.
    pub fn validate(&self) -> Result<(), LogInitError> {
        self.rotation.validate().map_err(LogInitError::InvalidConfig)?;
        if self.prune_interval.is_zero() {
            return Err(LogInitError::InvalidConfig(
                "prune_interval must be greater than 0",
            ));
        }
        Ok(())
    }

    /// `<log_root>/log/logfiles/<service_name>`
    pub fn log_dir(&self, service_name: &str) -> PathBuf {
        self.log_root
            .join(LOG_SUBDIR)
            .join(LOGFILES_SUBDIR)
            .join(service_name)
    }

    /// `<log_root>/log/logfiles/<service_name>/<service_name>.log`
    pub fn log_file(&self, service_name: &str) -> PathBuf {
        log_file_in(&self.log_dir(service_name), service_name)
    }

    pub(crate) fn error_channel(&self) -> ErrorChannel {
        match &self.error_log {
            Some(path) => ErrorChannel::File(path.clone()),
            None => ErrorChannel::StdErr,
        }
    }
}

pub(crate) fn log_file_in(dir: &Path, service_name: &str) -> PathBuf {
    dir.join(format!("{service_name}.{LOG_SUFFIX}"))
}

impl TryFrom<&Param> for LogConfig {
    type Error = DynError;
    fn try_from(param: &Param) -> Result<Self, Self::Error> {
        let max_age_secs = param
            .max_age_days
            .checked_mul(SECONDS_PER_DAY)
            .ok_or("max_age_days is too large")?;
        let rotation = RotationPolicy {
            max_size_mb: param.max_size_mb,
            max_backups: param.max_backups,
            max_age: Duration::from_secs(max_age_secs),
        };
        let mut config = LogConfig::default()
            .with_log_root(&param.log_root)
            .with_rotation(rotation)
            .with_prune_interval(Duration::from_secs(param.prune_interval_secs));
        if param.async_write {
            config = config.with_write_strategy(WriteStrategy::Async);
        }
        if let Some(error_log) = &param.error_log {
            config = config.with_error_log(error_log);
        }
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}
