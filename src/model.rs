//! Data model for backtest runs and equity curves.
//!
//! Shapes mirror the research backend's JSON artifacts: a flat list of
//! completed test runs and per-run equity-curve samples. Everything here is
//! read-only once loaded; the views in `edges` and `drawdown` allocate their
//! own output.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// One scalar from a run's open-ended parameter bag. Only display and
/// equality are ever needed, so the variant set stays closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One completed backtest: identity, categorical dimensions, date range,
/// and scalar outcomes as reported by the backend.
///
/// `win_rate` is kept exactly as received; the source data mixes 0-1
/// fractions with 0-100 percentages, so consumers go through
/// [`canonical_win_rate`] before comparing or averaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub test_id: String,
    pub strategy: String,
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub return_pct: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_trades: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl RunRecord {
    /// Calendar year the run started in.
    pub fn start_year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Timestamp as it arrives on the wire: either Unix seconds or a date-like
/// string. Both normalize through [`RawTime::to_utc`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Unix(f64),
    Text(String),
}

impl RawTime {
    /// Normalize to a UTC instant. Numeric values are Unix seconds
    /// (fractional seconds allowed); strings accept RFC 3339 and the
    /// common ISO date / datetime layouts the backend emits.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, String> {
        match self {
            RawTime::Unix(secs) => {
                if !secs.is_finite() {
                    return Err(format!("non-finite unix time {}", secs));
                }
                let millis = (secs * 1000.0).round();
                if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
                    return Err(format!("unix time {} out of range", secs));
                }
                DateTime::<Utc>::from_timestamp_millis(millis as i64)
                    .ok_or_else(|| format!("unix time {} out of range", secs))
            }
            RawTime::Text(s) => parse_date_text(s),
        }
    }
}

fn parse_date_text(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("unparseable time '{}'", s))
}

/// One equity-curve sample as served by the backend. No invariant guarantees
/// monotonic equity; ordering by time is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySample {
    pub time: RawTime,
    pub equity: f64,
}

/// Bring a raw win rate onto the canonical 0-100 scale.
///
/// The backend inconsistently reports win rate as a 0-1 fraction or an
/// already-scaled percentage; the `> 1` heuristic matches how every consumer
/// of the original data disambiguated. Normalization happens once, here,
/// so mixed scales can never meet inside one average.
pub fn canonical_win_rate(raw: f64) -> Result<f64, AnalyticsError> {
    if !raw.is_finite() || raw < 0.0 {
        return Err(AnalyticsError::InconsistentScale { value: raw });
    }
    let pct = if raw > 1.0 { raw } else { raw * 100.0 };
    if pct > 100.0 {
        return Err(AnalyticsError::InconsistentScale { value: raw });
    }
    Ok(pct)
}

/// Display label for a run's covered years: "2020" or "2020-2021".
pub fn year_label(start: NaiveDate, end: Option<NaiveDate>) -> String {
    match end {
        Some(end) if end.year() != start.year() => {
            format!("{}-{}", start.year(), end.year())
        }
        _ => start.year().to_string(),
    }
}

/// Load a saved runs artifact (the backend's `/api/runs` response).
pub fn load_runs(path: &Path) -> Result<Vec<RunRecord>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let runs = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid runs JSON in {}", path.display()))?;
    Ok(runs)
}

/// Load a saved equity-curve artifact (the `equity_curve` array of a
/// run-details or composite response).
pub fn load_curve(path: &Path) -> Result<Vec<EquitySample>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let curve = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid equity curve JSON in {}", path.display()))?;
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_record_deserializes_backend_shape() {
        let json = r#"{
            "test_id": "donchian_EURUSD_1h_2020",
            "strategy": "donchian",
            "symbol": "EURUSD",
            "timeframe": "1h",
            "start_date": "2020-01-01",
            "end_date": "2020-12-31",
            "return_pct": 12.5,
            "max_drawdown": 8.3,
            "win_rate": 0.54,
            "total_trades": 87,
            "parameters": {"channel_len": 20, "use_atr": true, "mode": "breakout"}
        }"#;
        let run: RunRecord = serde_json::from_str(json).unwrap();
        assert_eq!(run.strategy, "donchian");
        assert_eq!(run.start_year(), 2020);
        assert_eq!(run.parameters["channel_len"], ParamValue::Number(20.0));
        assert_eq!(run.parameters["use_atr"], ParamValue::Bool(true));
        assert_eq!(run.parameters["mode"], ParamValue::Text("breakout".into()));
    }

    #[test]
    fn test_run_record_tolerates_missing_optional_fields() {
        let json = r#"{
            "test_id": "t1",
            "strategy": "sma_cross",
            "symbol": "GBPUSD",
            "timeframe": "4h",
            "start_date": "2021-01-01",
            "return_pct": -3.0,
            "max_drawdown": 11.0,
            "win_rate": 44.0,
            "total_trades": 30
        }"#;
        let run: RunRecord = serde_json::from_str(json).unwrap();
        assert!(run.end_date.is_none());
        assert!(run.parameters.is_empty());
    }

    #[test]
    fn test_raw_time_unix_seconds() {
        let t = RawTime::Unix(1_600_000_000.0).to_utc().unwrap();
        assert_eq!(t.timestamp_millis(), 1_600_000_000_000);
    }

    #[test]
    fn test_raw_time_text_layouts() {
        for s in [
            "2020-03-01",
            "2020-03-01T12:30:00",
            "2020-03-01 12:30:00",
            "2020-03-01T12:30:00Z",
        ] {
            let parsed = RawTime::Text(s.to_string()).to_utc();
            assert!(parsed.is_ok(), "failed to parse '{}'", s);
        }
    }

    #[test]
    fn test_raw_time_rejects_garbage() {
        assert!(RawTime::Text("not-a-date".into()).to_utc().is_err());
        assert!(RawTime::Unix(f64::NAN).to_utc().is_err());
    }

    #[test]
    fn test_canonical_win_rate_both_scales() {
        assert_eq!(canonical_win_rate(0.54).unwrap(), 54.0);
        assert_eq!(canonical_win_rate(54.0).unwrap(), 54.0);
        assert_eq!(canonical_win_rate(1.0).unwrap(), 100.0);
        assert_eq!(canonical_win_rate(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_canonical_win_rate_rejects_out_of_range() {
        assert!(canonical_win_rate(-0.1).is_err());
        assert!(canonical_win_rate(150.0).is_err());
        assert!(canonical_win_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_year_label() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let same = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let next = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        assert_eq!(year_label(start, Some(same)), "2020");
        assert_eq!(year_label(start, Some(next)), "2020-2021");
        assert_eq!(year_label(start, None), "2020");
    }
}
