//! Equity-curve to underwater-curve transform.
//!
//! Single pass over a chronological equity series with a running peak:
//!
//! ```text
//! peak       = max(peak, equity_i)
//! drawdown_i = (equity_i - peak) / peak   (0 when peak <= 0)
//! ```
//!
//! Input must already be sorted by time; the transform preserves count and
//! order one-to-one and holds O(1) auxiliary state, so multi-year sub-daily
//! curves go through in one allocation.

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::model::EquitySample;

/// Trading days per year, used when estimating annualized return from a
/// daily-sampled curve.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// One point of the derived underwater series. `drawdown` is a fraction,
/// zero at a new peak and negative while underwater (-0.15 = 15% down).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    /// Display-ready date for a chart axis.
    pub date: String,
    /// Millisecond timestamp, sortable and joinable.
    pub timestamp_ms: i64,
    pub equity: f64,
    pub drawdown: f64,
}

/// Aggregate stats over a whole curve, matching what the backend reports
/// alongside a composite equity curve. Both values are percentages; the
/// drawdown is a positive magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveStats {
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
}

/// Transform an ordered equity series into its underwater series.
///
/// Rejects the whole series on the first malformed sample (unparseable time
/// or non-finite equity) rather than letting it poison the running peak.
/// Empty input yields empty output.
pub fn equity_drawdown(samples: &[EquitySample]) -> Result<Vec<DrawdownPoint>, AnalyticsError> {
    let mut out = Vec::with_capacity(samples.len());
    let mut peak = f64::NEG_INFINITY;

    for (index, sample) in samples.iter().enumerate() {
        if !sample.equity.is_finite() {
            return Err(AnalyticsError::MalformedSample {
                index,
                reason: format!("non-finite equity {}", sample.equity),
            });
        }
        let instant = sample
            .time
            .to_utc()
            .map_err(|reason| AnalyticsError::MalformedSample { index, reason })?;

        if sample.equity > peak {
            peak = sample.equity;
        }
        // Guard against zero or negative peaks: a curve that starts at or
        // below zero reports drawdown 0 until equity turns positive.
        let drawdown = if peak > 0.0 {
            (sample.equity - peak) / peak
        } else {
            0.0
        };

        out.push(DrawdownPoint {
            date: instant.format("%Y-%m-%d").to_string(),
            timestamp_ms: instant.timestamp_millis(),
            equity: sample.equity,
            drawdown,
        });
    }

    Ok(out)
}

/// Total return and max drawdown over an already-transformed curve.
/// `None` for an empty curve or one starting at zero equity, where neither
/// ratio is defined.
pub fn curve_stats(points: &[DrawdownPoint]) -> Option<CurveStats> {
    let first = points.first()?;
    let last = points.last()?;
    if first.equity == 0.0 {
        return None;
    }
    let total_return_pct = (last.equity - first.equity) / first.equity * 100.0;
    let max_drawdown_pct = points
        .iter()
        .map(|p| -p.drawdown)
        .fold(0.0, f64::max)
        * 100.0;
    Some(CurveStats {
        total_return_pct,
        max_drawdown_pct,
    })
}

/// Stride-downsample a curve to roughly `target` points for chart rendering.
/// The backend serves at most ~2000 points per curve; this reproduces its
/// `step = len / target` rule. Curves at or under the target pass through.
pub fn downsample(points: &[DrawdownPoint], target: usize) -> Vec<DrawdownPoint> {
    if target == 0 || points.len() <= target {
        return points.to_vec();
    }
    let step = points.len() / target;
    points.iter().step_by(step.max(1)).cloned().collect()
}

/// Rough annualized return given a run's total return and the number of
/// daily samples in its curve. `None` when the curve is empty.
pub fn estimated_annual_return(return_pct: f64, daily_samples: usize) -> Option<f64> {
    if daily_samples == 0 {
        return None;
    }
    Some(return_pct / (daily_samples as f64 / TRADING_DAYS_PER_YEAR))
}
