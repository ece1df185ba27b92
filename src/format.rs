use std::io::{self, Write};

use flexi_logger::DeferredNow;
use log::kv::{self, Key, Value, VisitSource};
use log::Record;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::caller::{caller_function, caller_location};

/// RFC 3339 with milliseconds and the local offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Key under which the structured payload of a record is written in the file sink.
pub const DATA_KEY: &str = "data";

/// Human readable line for the console sink.
pub fn console_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), io::Error> {
    write!(
        w,
        "{} [{}] [{}] [{}] {}",
        now.format(TIMESTAMP_FORMAT),
        record.level(),
        caller_function(record),
        caller_location(record),
        record.args()
    )?;
    for (key, value) in collect_data(record) {
        match value {
            JsonValue::String(s) => write!(w, " {key}={s}")?,
            other => write!(w, " {key}={other}")?,
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct FileRecord<'a> {
    time: String,
    level: String,
    msg: String,
    func: &'a str,
    file: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    data: Map<String, JsonValue>,
}

/// One JSON object per record for the rotating file sink.
pub fn json_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), io::Error> {
    let line = FileRecord {
        time: now.format(TIMESTAMP_FORMAT).to_string(),
        level: record.level().as_str().to_ascii_lowercase(),
        msg: record.args().to_string(),
        func: caller_function(record),
        file: caller_location(record),
        data: collect_data(record),
    };
    serde_json::to_writer(&mut *w, &line).map_err(io::Error::from)
}

struct DataCollector(Map<String, JsonValue>);

impl<'kvs> VisitSource<'kvs> for DataCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        let json = serde_json::to_value(&value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
        self.0.insert(key.as_str().to_owned(), json);
        Ok(())
    }
}

fn collect_data(record: &Record) -> Map<String, JsonValue> {
    let mut collector = DataCollector(Map::new());
    // the collector never fails
    let _ = record.key_values().visit(&mut collector);
    collector.0
}
