//! Line-oriented JSON logging for the report binaries.
//!
//! One JSON object per line on stdout, timestamped, filtered by the
//! `LOG_LEVEL` env var. The analytics core itself never logs; it is pure
//! and signals errors to the caller.

use chrono::Utc;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("debug") => Level::Debug,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Emit one structured record at the given level.
pub fn log_at(level: Level, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() {
        return;
    }
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(Utc::now().to_rfc3339()));
    entry.insert("lvl".to_string(), json!(level.as_str()));
    entry.insert("event".to_string(), json!(event));
    for (k, v) in fields {
        entry.insert(k, v);
    }
    println!("{}", Value::Object(entry));
}

/// Info-level record; the common case.
pub fn json_log(event: &str, fields: Map<String, Value>) {
    log_at(Level::Info, event, fields);
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Level::Info.as_str(), "info");
    }

    #[test]
    fn test_obj_builds_field_map() {
        let fields = obj(&[("runs", v_num(12.0)), ("symbol", v_str("EURUSD"))]);
        assert_eq!(fields["runs"], json!(12.0));
        assert_eq!(fields["symbol"], json!("EURUSD"));
    }
}
