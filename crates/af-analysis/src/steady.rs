//! Steady-state detection for per-node, per-variable series.
//!
//! Two measures are computed: the `t95` settling index, and the relative slope
//! of a regression over the tail of the series. The relative slope is then
//! classified against fixed thresholds.

use af_core::{AfResult, Tolerances, ensure_same_len};
use af_results::{ModelType, NodeId, ResultData, plottable_variables};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::stats::{linear_regression_slope, median};

/// Settling band for `t95`, as a fraction of the total initial-to-final change.
pub const T95_BAND: f64 = 0.05;

/// `|relative slope|` below this is stable.
pub const STABLE_REL_SLOPE: f64 = 0.01;

/// `|relative slope|` below this (and not stable) is approaching.
pub const APPROACHING_REL_SLOPE: f64 = 0.05;

/// Fraction of points used for the tail regression.
pub const DEFAULT_TAIL_RATIO: f64 = 0.2;

/// Earliest index from which `series` stays within [`T95_BAND`] of the total
/// change around its final value.
///
/// `None` for fewer than two points or a non-finite endpoint. A series whose
/// net change is within float noise has settled from index `0`. Non-finite samples count as outside
/// the band.
pub fn t95_index(series: &[f64]) -> Option<usize> {
    if series.len() < 2 {
        return None;
    }
    let initial = series[0];
    let last = series[series.len() - 1];
    let total = (last - initial).abs();
    if !total.is_finite() {
        return None;
    }
    if Tolerances::SAMPLE.close(last, initial) {
        return Some(0);
    }

    // The last sample is always inside its own band, so this is in range.
    let band = T95_BAND * total;
    let settled = series
        .iter()
        .rposition(|y| {
            let deviation = (y - last).abs();
            deviation.is_nan() || deviation > band
        })
        .map_or(0, |i| i + 1);
    Some(settled)
}

/// Tail regression summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteadyCheck {
    pub slope: f64,
    pub rel_slope: f64,
    pub start_index: usize,
    pub n: usize,
}

fn tail_start(len: usize, tail_ratio: f64) -> usize {
    let start = ((1.0 - tail_ratio) * len as f64).floor();
    let start = if start.is_finite() {
        start.clamp(0.0, len as f64) as usize
    } else {
        0
    };
    // Keep at least two points in the tail whenever the series has them.
    start.min(len.saturating_sub(2))
}

/// Regress the final `tail_ratio` fraction of `series` against `time`.
///
/// The tail starts at `floor((1 - tail_ratio) * n)`, pulled back so that it
/// holds at least two points. A series shorter than two points gets NaN slope
/// and relative slope. The relative slope is the slope
/// over the median magnitude of the tail, or `0` when that median is `0`.
pub fn steady_check(time: &[f64], series: &[f64], tail_ratio: f64) -> AfResult<SteadyCheck> {
    ensure_same_len(time.len(), series.len(), "time/series")?;

    let start = tail_start(series.len(), tail_ratio);
    let t = &time[start..];
    let v = &series[start..];

    if t.len() < 2 {
        return Ok(SteadyCheck {
            slope: f64::NAN,
            rel_slope: f64::NAN,
            start_index: start,
            n: t.len(),
        });
    }

    let slope = linear_regression_slope(t, v);
    let magnitudes: Vec<f64> = v.iter().map(|x| x.abs()).collect();
    let med = median(&magnitudes);
    let rel_slope = if med == 0.0 { 0.0 } else { slope / med };

    Ok(SteadyCheck {
        slope,
        rel_slope,
        start_index: start,
        n: t.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SteadyStatus {
    Stable,
    Approaching,
    Unstable,
}

impl SteadyStatus {
    /// Classify `|rel|`; `None` for non-finite input.
    pub fn from_relative_slope(rel: f64) -> Option<Self> {
        if !rel.is_finite() {
            return None;
        }
        let magnitude = rel.abs();
        Some(if magnitude < STABLE_REL_SLOPE {
            SteadyStatus::Stable
        } else if magnitude < APPROACHING_REL_SLOPE {
            SteadyStatus::Approaching
        } else {
            SteadyStatus::Unstable
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SteadyStatus::Stable => "stable",
            SteadyStatus::Approaching => "approaching",
            SteadyStatus::Unstable => "unstable",
        }
    }
}

impl fmt::Display for SteadyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one (node, variable) series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteadyVerdict {
    pub variable: String,
    pub t95: Option<usize>,
    pub t95_time: Option<f64>,
    pub slope: f64,
    pub relative_slope: f64,
    pub status: Option<SteadyStatus>,
}

pub fn assess_series(
    variable: &str,
    time: &[f64],
    series: &[f64],
    tail_ratio: f64,
) -> AfResult<SteadyVerdict> {
    let check = steady_check(time, series, tail_ratio)?;
    let t95 = t95_index(series);
    Ok(SteadyVerdict {
        variable: variable.to_string(),
        t95,
        t95_time: t95.and_then(|i| time.get(i).copied()),
        slope: check.slope,
        relative_slope: check.rel_slope,
        status: SteadyStatus::from_relative_slope(check.rel_slope),
    })
}

/// Verdicts for the requested variables a node carries, in request order.
///
/// Variables the node lacks are skipped; an unknown node yields no verdicts.
pub fn assess_node(
    result: &ResultData,
    node_id: &str,
    variables: &[String],
    tail_ratio: f64,
) -> AfResult<Vec<SteadyVerdict>> {
    let Some(node) = result.node(node_id) else {
        tracing::debug!(node = %node_id, "steady check on unknown node");
        return Ok(Vec::new());
    };

    let mut verdicts = Vec::with_capacity(variables.len());
    for variable in variables {
        let Some(series) = node.series(variable) else {
            tracing::debug!(node = %node_id, variable = %variable, "variable missing on node");
            continue;
        };
        verdicts.push(assess_series(variable, &result.timestamps, series, tail_ratio)?);
    }
    Ok(verdicts)
}

/// Verdicts for every node over the model's plottable variables.
pub fn assess_all(
    result: &ResultData,
    model: ModelType,
    tail_ratio: f64,
) -> AfResult<BTreeMap<NodeId, Vec<SteadyVerdict>>> {
    let variables: Vec<String> = plottable_variables(result, model)
        .into_iter()
        .map(|v| v.name)
        .collect();

    let mut out = BTreeMap::new();
    for node_id in result.node_data.keys() {
        out.insert(
            node_id.clone(),
            assess_node(result, node_id, &variables, tail_ratio)?,
        );
    }
    Ok(out)
}
