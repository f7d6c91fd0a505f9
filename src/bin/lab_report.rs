//! Lab Report - offline matrix and edges report over a saved runs artifact.
//!
//! Usage: lab_report <runs.json>
//!
//! Filters come from the environment, mirroring the dashboard's controls:
//!   STRATEGY, SYMBOL, TIMEFRAME, YEAR  - restrict the matrix view
//!   SORT=return                        - rank by return instead of date

use std::path::Path;

use anyhow::{anyhow, Result};

use edgelab::edges::{filter_runs, proven_edges, FilterOptions, RunFilter, SortMode};
use edgelab::logging::{json_log, obj, v_num, v_str};
use edgelab::model::{canonical_win_rate, load_runs, year_label};

fn filter_from_env() -> Result<RunFilter> {
    let year = match std::env::var("YEAR") {
        Ok(y) => Some(y.parse().map_err(|_| anyhow!("YEAR must be a number, got '{}'", y))?),
        Err(_) => None,
    };
    Ok(RunFilter {
        strategy: std::env::var("STRATEGY").ok(),
        symbol: std::env::var("SYMBOL").ok(),
        timeframe: std::env::var("TIMEFRAME").ok(),
        year,
    })
}

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: lab_report <runs.json>"))?;
    let runs = load_runs(Path::new(&path))?;
    json_log(
        "runs_loaded",
        obj(&[("path", v_str(&path)), ("count", v_num(runs.len() as f64))]),
    );

    let options = FilterOptions::from_runs(&runs);
    println!(
        "options strategies={} symbols={} timeframes={} years={}",
        options.strategies.join(","),
        options.symbols.join(","),
        options.timeframes.join(","),
        options
            .years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );

    let filter = filter_from_env()?;
    let sort = match std::env::var("SORT").as_deref() {
        Ok("return") => SortMode::ReturnDesc,
        _ => SortMode::Chronological,
    };
    let matrix = filter_runs(&runs, &filter, sort);
    json_log("matrix_built", obj(&[("rows", v_num(matrix.len() as f64))]));
    for run in &matrix {
        println!(
            "run id={} strategy={} symbol={} tf={} year={} return={:.2}% dd={:.2}% trades={} win_rate={:.1}%",
            run.test_id,
            run.strategy,
            run.symbol,
            run.timeframe,
            year_label(run.start_date, run.end_date),
            run.return_pct,
            run.max_drawdown,
            run.total_trades,
            canonical_win_rate(run.win_rate)?,
        );
    }

    let edges = proven_edges(&runs)?;
    json_log("edges_built", obj(&[("count", v_num(edges.len() as f64))]));
    for edge in &edges {
        println!(
            "edge strategy={} symbol={} tf={} avg_return={:.2}% avg_win_rate={:.1}% profitable={}/{}",
            edge.strategy,
            edge.symbol,
            edge.timeframe,
            edge.avg_annual_return,
            edge.avg_win_rate,
            edge.profitable_years,
            edge.years_tested
        );
        for member in &edge.members {
            println!(
                "  year={} return={:.1}% dd={:.1}% win_rate={:.0}%",
                member.start_year(),
                member.return_pct,
                member.max_drawdown,
                canonical_win_rate(member.win_rate)?,
            );
        }
    }
    Ok(())
}
