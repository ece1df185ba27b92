#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
//! Log bootstrap for a single service.
//!
//! [`LogInitializer::initialize`] makes sure `<log_root>/log/logfiles/<service>`
//! exists, then installs a process logger with two sinks:
//!
//! - a size-rotated file, `<service>.log`, one JSON object per record;
//! - the console, one human readable line per record.
//!
//! Both accept `info` and above. Callers log through the `log` macros and may
//! attach structured data, which lands under the `data` key of the file record:
//!
//! ```rust,no_run
//! use service_log::{LogConfig, LogInitializer, LogSetup};
//! use tokio_util::sync::CancellationToken;
//!
//! let initializer = LogInitializer::new(LogConfig::default().with_log_root("/tmp/testlog"));
//! let mut handle = initializer
//!     .initialize("auth-service", &CancellationToken::new())
//!     .unwrap_or_else(|e| {
//!         eprintln!("init log error: {e}");
//!         std::process::exit(1);
//!     });
//! log::info!(user = "alice"; "login ok");
//! handle.close();
//! ```

pub mod caller;
pub mod config;
pub mod dir;
pub mod error;
pub mod format;
mod handle;
mod initializer;
pub mod rotation;

pub use caller::format_caller_path;
pub use config::{LogConfig, Param, WriteStrategy};
pub use dir::ensure_log_dir;
pub use error::{LogCloseError, LogInitError};
pub use handle::ServiceLogHandle;
pub use initializer::{LogInitializer, LogSetup};
pub use rotation::RotationPolicy;

pub type DynError = Box<dyn std::error::Error + Send + Sync>; // wrapper for dyn Error
