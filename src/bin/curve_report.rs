//! Curve Report - underwater analysis of a saved equity-curve artifact.
//!
//! Usage: curve_report <curve.json>
//!
//! Prints total return, max drawdown, and a chart-sized underwater series.
//! POINTS overrides the downsample target (default 2000, the same cap the
//! backend applies before serving a curve).

use std::path::Path;

use anyhow::{anyhow, Result};

use edgelab::drawdown::{curve_stats, downsample, equity_drawdown};
use edgelab::logging::{json_log, obj, v_num, v_str};
use edgelab::model::load_curve;

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: curve_report <curve.json>"))?;
    let target: usize = std::env::var("POINTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2000);

    let samples = load_curve(Path::new(&path))?;
    let points = equity_drawdown(&samples)?;
    json_log(
        "curve_transformed",
        obj(&[("path", v_str(&path)), ("points", v_num(points.len() as f64))]),
    );

    match curve_stats(&points) {
        Some(stats) => println!(
            "curve return={:.2}% max_dd={:.2}% samples={}",
            stats.total_return_pct,
            stats.max_drawdown_pct,
            points.len()
        ),
        None => println!("curve empty or starts at zero equity, no stats"),
    }

    for point in downsample(&points, target) {
        println!(
            "point date={} equity={:.2} drawdown={:.4}",
            point.date, point.equity, point.drawdown
        );
    }
    Ok(())
}
