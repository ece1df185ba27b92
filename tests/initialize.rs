//! End to end: one logger per process, so everything that needs it lives in one test.

use std::fs;
use std::path::Path;

use serde_json::Value;
use service_log::{LogConfig, LogInitError, LogInitializer, LogSetup};
use tokio_util::sync::CancellationToken;

fn read_records(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_initialize_log_and_close() {
    let root = tempfile::tempdir().unwrap();
    let initializer = LogInitializer::new(LogConfig::default().with_log_root(root.path()));
    let mut handle = initializer
        .initialize("auth-service", &CancellationToken::new())
        .unwrap();

    let log_dir = root.path().join("log/logfiles/auth-service");
    assert!(log_dir.is_dir());
    assert_eq!(handle.log_dir(), log_dir);
    assert_eq!(handle.log_file(), log_dir.join("auth-service.log"));
    assert_eq!(handle.service_name(), "auth-service");

    let line = line!() + 1;
    log::info!(user = "alice", attempts = 2; "login ok");
    log::debug!("below the threshold");
    handle.flush();

    let live_file = log_dir.join("auth-service_rCURRENT.log");
    assert!(live_file.exists());
    #[cfg(unix)]
    assert!(handle.log_file().exists());

    let records = read_records(&live_file);
    let login: Vec<&Value> = records.iter().filter(|r| r["msg"] == "login ok").collect();
    assert_eq!(login.len(), 1);
    let login = login[0];
    assert_eq!(login["level"], "info");
    assert_eq!(login["func"], module_path!());
    assert_eq!(login["file"], format!("initialize.rs:{line}"));
    assert_eq!(login["data"]["user"], "alice");
    assert_eq!(login["data"]["attempts"], 2);
    assert!(records.iter().all(|r| r["msg"] != "below the threshold"));

    // the process logger is taken, and the refusal leaves no trace on disk
    let second = initializer.initialize("billing", &CancellationToken::new());
    assert!(matches!(second, Err(LogInitError::AlreadyInstalled)));
    assert!(!root.path().join("log/logfiles/billing").exists());

    handle.close();
    assert!(handle.is_closed());
    handle.close();
    assert!(handle.try_close().is_ok());

    log::info!("after close");
    let records = read_records(&live_file);
    assert!(records.iter().all(|r| r["msg"] != "after close"));
    assert!(records.iter().any(|r| r["msg"] == "closing log of auth-service"));
}
