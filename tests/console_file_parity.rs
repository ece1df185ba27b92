//! Runs the binary and checks that every record shows up once on the console and once in the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

const SERVICE: &str = "parity-svc";

/// Console line without its timestamp: `[LEVEL] [func] [file:line] msg k=v ...`
fn console_key(line: &str) -> String {
    match line.split_once(' ') {
        Some((_ts, rest)) => rest.to_string(),
        None => line.to_string(),
    }
}

/// The same shape rebuilt from a JSON file record.
fn file_key(record: &Value) -> String {
    let mut key = format!(
        "[{}] [{}] [{}] {}",
        record["level"].as_str().unwrap().to_ascii_uppercase(),
        record["func"].as_str().unwrap(),
        record["file"].as_str().unwrap(),
        record["msg"].as_str().unwrap(),
    );
    if let Some(data) = record["data"].as_object() {
        let data: BTreeMap<_, _> = data.iter().collect();
        for (k, v) in data {
            match v {
                Value::String(s) => key.push_str(&format!(" {k}={s}")),
                other => key.push_str(&format!(" {k}={other}")),
            }
        }
    }
    key
}

fn read_file_records(log_dir: &Path) -> Vec<Value> {
    let mut records = Vec::new();
    for entry in fs::read_dir(log_dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        // rotated and live files; the stable-name symlink would double count
        if !name.starts_with(&format!("{SERVICE}_r")) {
            continue;
        }
        for line in fs::read_to_string(entry.path()).unwrap().lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line).unwrap());
            }
        }
    }
    records
}

#[test]
fn test_each_record_reaches_console_and_file_once() {
    let root = tempfile::tempdir().unwrap();
    // a directory left by an earlier run
    let log_dir = root.path().join("log/logfiles").join(SERVICE);
    fs::create_dir_all(&log_dir).unwrap();
    let marker = log_dir.join("keep.txt");
    fs::write(&marker, "earlier run").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_service_log"))
        .arg("--service-name")
        .arg(SERVICE)
        .arg("--log-root")
        .arg(root.path())
        .args(["--workers", "2", "--records", "3"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "binary failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(marker.exists());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut console: Vec<String> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(console_key)
        .collect();
    let mut file: Vec<String> = read_file_records(&log_dir).iter().map(file_key).collect();

    let samples = file.iter().filter(|key| key.contains(" sample record ")).count();
    assert_eq!(samples, 6);
    assert!(file.iter().all(|key| !key.contains("[<unnamed>:0]")));

    console.sort();
    file.sort();
    assert_eq!(console, file);
}
