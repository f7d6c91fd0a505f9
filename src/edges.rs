//! Filtering, sorting, and aggregation over the run collection.
//!
//! Two views feed the dashboard: the matrix (filter + sort over raw runs)
//! and the edges board (per strategy/symbol/timeframe aggregates across
//! yearly runs). Both are pure over their input slice.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AnalyticsError;
use crate::model::{canonical_win_rate, RunRecord};

/// Filter selection for the matrix view. `None` means "no filter" on that
/// dimension. `year` matches the calendar year of a run's start date.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub strategy: Option<String>,
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub year: Option<i32>,
}

impl RunFilter {
    pub fn matches(&self, run: &RunRecord) -> bool {
        self.strategy.as_deref().map_or(true, |s| run.strategy == s)
            && self.symbol.as_deref().map_or(true, |s| run.symbol == s)
            && self.timeframe.as_deref().map_or(true, |t| run.timeframe == t)
            && self.year.map_or(true, |y| run.start_year() == y)
    }
}

/// Ordering for the matrix view. Chronological is the default "sequential"
/// ordering on start date; ReturnDesc puts the best run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Chronological,
    ReturnDesc,
}

/// Filtered, sorted copy of the run collection for the matrix view.
/// The input is never mutated; ties keep their input order (stable sort).
pub fn filter_runs(runs: &[RunRecord], filter: &RunFilter, sort: SortMode) -> Vec<RunRecord> {
    let mut out: Vec<RunRecord> = runs.iter().filter(|r| filter.matches(r)).cloned().collect();
    match sort {
        SortMode::Chronological => out.sort_by(|a, b| a.start_date.cmp(&b.start_date)),
        SortMode::ReturnDesc => out.sort_by(|a, b| b.return_pct.total_cmp(&a.return_pct)),
    }
    out
}

/// Distinct values per filterable dimension, sorted, for filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub strategies: Vec<String>,
    pub symbols: Vec<String>,
    pub timeframes: Vec<String>,
    pub years: Vec<i32>,
}

impl FilterOptions {
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        let mut options = FilterOptions::default();
        for run in runs {
            options.strategies.push(run.strategy.clone());
            options.symbols.push(run.symbol.clone());
            options.timeframes.push(run.timeframe.clone());
            options.years.push(run.start_year());
        }
        options.strategies.sort();
        options.strategies.dedup();
        options.symbols.sort();
        options.symbols.dedup();
        options.timeframes.sort();
        options.timeframes.dedup();
        options.years.sort_unstable();
        options.years.dedup();
        options
    }
}

/// Aggregate statistics for one (strategy, symbol, timeframe) group across
/// its constituent yearly runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSummary {
    pub strategy: String,
    pub symbol: String,
    pub timeframe: String,
    /// Mean of member `return_pct`.
    pub avg_annual_return: f64,
    /// Mean of member win rates on the canonical 0-100 scale.
    pub avg_win_rate: f64,
    /// Members with `return_pct > 0`.
    pub profitable_years: usize,
    /// Total member count; never zero (groups only exist for seen records).
    pub years_tested: usize,
    /// Member runs, most recent start date first, for drill-down display.
    pub members: Vec<RunRecord>,
}

/// Partition the run collection by (strategy, symbol, timeframe) and compute
/// each group's aggregates. Win rates are normalized to 0-100 before
/// averaging; a member that cannot be normalized fails the whole pass.
///
/// Empty input yields an empty vec. Output is ordered by group key so
/// repeated passes over the same data are deterministic.
pub fn aggregate_edges(runs: &[RunRecord]) -> Result<Vec<EdgeSummary>, AnalyticsError> {
    let mut groups: BTreeMap<(String, String, String), Vec<RunRecord>> = BTreeMap::new();
    for run in runs {
        groups
            .entry((run.strategy.clone(), run.symbol.clone(), run.timeframe.clone()))
            .or_default()
            .push(run.clone());
    }

    let mut summaries = Vec::with_capacity(groups.len());
    for ((strategy, symbol, timeframe), mut members) in groups {
        let n = members.len() as f64;
        let mut return_sum = 0.0;
        let mut win_rate_sum = 0.0;
        let mut profitable_years = 0;
        for member in &members {
            return_sum += member.return_pct;
            win_rate_sum += canonical_win_rate(member.win_rate)?;
            if member.return_pct > 0.0 {
                profitable_years += 1;
            }
        }
        members.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        summaries.push(EdgeSummary {
            strategy,
            symbol,
            timeframe,
            avg_annual_return: return_sum / n,
            avg_win_rate: win_rate_sum / n,
            profitable_years,
            years_tested: members.len(),
            members,
        });
    }
    Ok(summaries)
}

/// The "proven edges" board: for each (strategy, symbol) keep only the best
/// timeframe by average annual return, drop combinations that lose money on
/// average, and rank the rest best-first.
pub fn proven_edges(runs: &[RunRecord]) -> Result<Vec<EdgeSummary>, AnalyticsError> {
    let mut best: BTreeMap<(String, String), EdgeSummary> = BTreeMap::new();
    for summary in aggregate_edges(runs)? {
        let key = (summary.strategy.clone(), summary.symbol.clone());
        match best.get(&key) {
            Some(current) if current.avg_annual_return >= summary.avg_annual_return => {}
            _ => {
                best.insert(key, summary);
            }
        }
    }
    let mut edges: Vec<EdgeSummary> = best
        .into_values()
        .filter(|e| e.avg_annual_return > 0.0)
        .collect();
    edges.sort_by(|a, b| b.avg_annual_return.total_cmp(&a.avg_annual_return));
    Ok(edges)
}
