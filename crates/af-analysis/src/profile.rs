//! Spatial profiles across nodes, effluent selection and derived ratios.

use af_core::Tolerances;
use af_results::{NodeId, NodeRecord, ResultData};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::stats::{last_of, series_stats};

/// Labels tried, in order, before the effluent fallbacks.
const CLARIFIER_LABELS: [&str; 2] = ["沉淀池", "Clarifier"];

const EFFLUENT_CANDIDATES: [&str; 6] = ["出水端", "Effluent", "Outfall", "O3", "O2", "O1"];

/// Find a node by display label: exact (trimmed) match first, then substring.
///
/// An empty query matches nothing.
pub fn pick_node_by_label<'r>(
    result: &'r ResultData,
    label: &str,
) -> Option<(&'r NodeId, &'r NodeRecord)> {
    let wanted = label.trim();
    if wanted.is_empty() {
        return None;
    }
    result
        .node_data
        .iter()
        .find(|(_, n)| n.label.trim() == wanted)
        .or_else(|| result.node_data.iter().find(|(_, n)| n.label.contains(wanted)))
}

/// One node's values in a profile, keyed by variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRow {
    pub node: String,
    pub values: BTreeMap<String, Option<f64>>,
}

fn profile_with(
    result: &ResultData,
    labels: &[String],
    vars: &[String],
    value: impl Fn(&NodeRecord, &str) -> Option<f64>,
) -> Vec<ProfileRow> {
    labels
        .iter()
        .filter_map(|label| {
            let (_, node) = pick_node_by_label(result, label)?;
            let values = vars
                .iter()
                .map(|v| (v.clone(), value(node, v.as_str())))
                .collect();
            Some(ProfileRow {
                node: label.clone(),
                values,
            })
        })
        .collect()
}

/// Values at `time_index` for each resolvable label, `0` where a series is short or missing.
pub fn profile_at_time(
    result: &ResultData,
    labels: &[String],
    vars: &[String],
    time_index: usize,
) -> Vec<ProfileRow> {
    profile_with(result, labels, vars, |node, v| {
        Some(node.value_at(v, time_index).unwrap_or(0.0))
    })
}

/// Final values for each resolvable label; `None` for missing or empty series.
pub fn profile_at_end(result: &ResultData, labels: &[String], vars: &[String]) -> Vec<ProfileRow> {
    profile_with(result, labels, vars, |node, v| last_of(node.series(v)))
}

/// The node treated as the plant outlet.
pub fn effluent_node(result: &ResultData) -> Option<(&NodeId, &NodeRecord)> {
    CLARIFIER_LABELS
        .iter()
        .chain(EFFLUENT_CANDIDATES.iter())
        .find_map(|label| pick_node_by_label(result, label))
        .or_else(|| result.node_data.iter().next_back())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffluentSeries {
    pub node_id: Option<NodeId>,
    pub time: Vec<f64>,
    pub series: BTreeMap<String, Vec<f64>>,
}

/// Effluent series for `vars`. Variables missing on the node are NaN-filled.
pub fn effluent_series(result: &ResultData, vars: &[String]) -> EffluentSeries {
    let Some((node_id, node)) = effluent_node(result) else {
        return EffluentSeries {
            node_id: None,
            time: result.timestamps.clone(),
            series: BTreeMap::new(),
        };
    };

    let series = vars
        .iter()
        .map(|v| {
            let values = node
                .series(v)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| vec![f64::NAN; result.len()]);
            (v.clone(), values)
        })
        .collect();

    EffluentSeries {
        node_id: Some(node_id.clone()),
        time: result.timestamps.clone(),
        series,
    }
}

/// Removal efficiency in percent. Concentrations within float noise of zero
/// count as zero.
pub fn percent_removal(inlet: Option<f64>, effluent: Option<f64>) -> Option<f64> {
    let (inlet, effluent) = (inlet?, effluent?);
    let tol = Tolerances::SAMPLE;
    if tol.is_zero(inlet) {
        return Some(if tol.is_zero(effluent) { 100.0 } else { 0.0 });
    }
    Some((1.0 - effluent / inlet) * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub last: Option<f64>,
}

/// Pointwise `numerator / denominator`, `0` where the denominator is not positive
/// or missing. Min, max and mean cover finite ratios only.
pub fn ratio_stats(numerator: &[f64], denominator: &[f64]) -> RatioStats {
    let ratios: Vec<f64> = numerator
        .iter()
        .enumerate()
        .map(|(i, &num)| match denominator.get(i) {
            Some(&den) if den > 0.0 => num / den,
            _ => 0.0,
        })
        .collect();
    let stats = series_stats(&ratios);
    RatioStats {
        mean: stats.mean,
        min: stats.min,
        max: stats.max,
        last: ratios.last().copied(),
    }
}

/// Storage products over heterotrophic biomass (`X_STO / X_H`), for ASM3 nodes.
pub fn storage_ratio(node: &NodeRecord) -> Option<RatioStats> {
    Some(ratio_stats(node.series("X_STO")?, node.series("X_H")?))
}

/// Carbon to nitrogen ratio (`S_S / S_NH`).
pub fn carbon_nitrogen_ratio(node: &NodeRecord) -> Option<RatioStats> {
    Some(ratio_stats(node.series("S_S")?, node.series("S_NH")?))
}
