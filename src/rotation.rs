use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use flexi_logger::{Cleanup, Criterion, Naming};
use log::{info, warn};

const MB: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Infix flexi_logger puts between the basename and the rotation timestamp.
const ROTATED_INFIX: &str = "_r";
/// Marker of the live file while rotation is enabled.
const CURRENT_MARKER: &str = "CURRENT";

/// Limits applied to the rotating file sink. Fixed once the logger starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_size_mb: u64,
    pub max_backups: usize,
    pub max_age: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        RotationPolicy {
            max_size_mb: 100,
            max_backups: 50,
            max_age: 14 * DAY,
        }
    }
}

impl RotationPolicy {
    /// `None` when the size in bytes does not fit in a `u64`.
    pub fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_mb.checked_mul(MB)
    }

    /// Rejects limits flexi_logger cannot honor.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_size_mb == 0 {
            return Err("max_size_mb must be greater than 0");
        }
        if self.max_size_bytes().is_none() {
            return Err("max_size_mb is too large");
        }
        if self.max_backups == 0 {
            return Err("max_backups must be greater than 0");
        }
        Ok(())
    }

    pub(crate) fn criterion(&self) -> Criterion {
        Criterion::Size(self.max_size_bytes().unwrap_or(u64::MAX))
    }

    pub(crate) fn naming(&self) -> Naming {
        Naming::Timestamps
    }

    pub(crate) fn cleanup(&self) -> Cleanup {
        Cleanup::KeepLogFiles(self.max_backups)
    }
}

/// Deletes rotated files of `basename` in `dir` that are older than `max_age`.
///
/// Returns how many files were removed.
pub fn prune_expired(dir: &Path, basename: &str, max_age: Duration) -> io::Result<usize> {
    prune_expired_at(dir, basename, max_age, SystemTime::now())
}

pub(crate) fn prune_expired_at(
    dir: &Path,
    basename: &str,
    max_age: Duration,
    now: SystemTime,
) -> io::Result<usize> {
    let Some(deadline) = now.checked_sub(max_age) else {
        return Ok(0);
    };
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if is_rotated_file(name, basename) && prune_entry(&entry, deadline)? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Removes `entry` if it was last written before `deadline`.
///
/// A file that disappears meanwhile counts as not removed.
fn prune_entry(entry: &DirEntry, deadline: SystemTime) -> io::Result<bool> {
    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        // another sweeper or the rotation cleanup got there first
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if !metadata.is_file() {
        return Ok(false);
    }
    let modified = metadata.modified()?;
    if modified >= deadline {
        return Ok(false);
    }
    match fs::remove_file(entry.path()) {
        Ok(()) => {
            let written: DateTime<Local> = modified.into();
            info!(
                "pruned expired log file {} (last written {})",
                entry.path().display(),
                written.format("%Y-%m-%d %H:%M:%S")
            );
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            warn!("cannot prune {}: {}", entry.path().display(), e);
            Err(e)
        }
    }
}

fn is_rotated_file(name: &str, basename: &str) -> bool {
    match name
        .strip_prefix(basename)
        .and_then(|rest| rest.strip_prefix(ROTATED_INFIX))
    {
        Some(rest) => !rest.starts_with(CURRENT_MARKER),
        None => false,
    }
}
