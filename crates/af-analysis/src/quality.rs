//! Data quality checks over one result payload.
//!
//! The checks report human-readable issue strings and never fail. Each check
//! runs independently; one finding never suppresses another.

use af_results::{ModelType, NodeId, ResultData, non_negative_columns};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::profile::storage_ratio;

/// Values below this count as negative; smaller excursions are float noise.
pub const NEGATIVE_TOLERANCE: f64 = -1e-9;

/// Upper bound for the ASM3 `X_STO / X_H` ratio before it is flagged.
pub const MAX_STORAGE_RATIO: f64 = 2.0;

fn node_name<'a>(id: &'a str, label: &'a str) -> &'a str {
    if label.is_empty() { id } else { label }
}

/// The basic checks: time-axis monotonicity, negative values on the model's
/// non-negative columns, and a non-positive final total volume.
pub fn basic_quality(result: &ResultData, model: ModelType) -> Vec<String> {
    let mut issues = Vec::new();

    let t = &result.timestamps;
    let increasing = |i: usize| t[i].partial_cmp(&t[i - 1]) == Some(Ordering::Greater);
    if let Some(i) = (1..t.len()).find(|&i| !increasing(i)) {
        issues.push(format!("Time axis is not strictly increasing at index {i}"));
    }

    let columns = non_negative_columns(model);
    for (id, node) in &result.node_data {
        for &column in columns {
            let Some(series) = node.series(column) else {
                continue;
            };
            if series.iter().any(|v| v.is_finite() && *v < NEGATIVE_TOLERANCE) {
                issues.push(format!(
                    "Node {} column {column} has negative values",
                    node_name(id, &node.label)
                ));
            }
        }
    }

    if let Some(volume) = result.summary.as_ref().and_then(|s| s.final_total_volume)
        && volume <= 0.0
    {
        issues.push(format!("final_total_volume is not positive ({volume})"));
    }

    issues
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SeriesQuality {
    pub has_nan: bool,
    pub has_infinite: bool,
    /// NaN or infinite.
    pub has_non_finite: bool,
    pub negative_count: usize,
    pub len: usize,
}

pub fn inspect_series(values: &[f64]) -> SeriesQuality {
    let mut q = SeriesQuality {
        len: values.len(),
        ..Default::default()
    };
    for &v in values {
        if v.is_nan() {
            q.has_nan = true;
        } else if v.is_infinite() {
            q.has_infinite = true;
        } else if v < NEGATIVE_TOLERANCE {
            q.negative_count += 1;
        }
    }
    q.has_non_finite = q.has_nan || q.has_infinite;
    q
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeQuality {
    pub label: String,
    pub variables: BTreeMap<String, SeriesQuality>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub model: ModelType,
    pub total_nodes: usize,
    pub time_points: usize,
    pub nodes: BTreeMap<NodeId, NodeQuality>,
    /// Every node issue, in node order.
    pub issues: Vec<String>,
    pub basic_issues: Vec<String>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.basic_issues.is_empty()
    }
}

/// Per-node, per-column inspection of the model's non-negative columns.
pub fn quality_report(result: &ResultData, model: ModelType) -> QualityReport {
    let columns = non_negative_columns(model);
    let mut nodes = BTreeMap::new();
    let mut all_issues = Vec::new();

    for (id, node) in &result.node_data {
        let mut variables = BTreeMap::new();
        let mut issues = Vec::new();

        for &column in columns {
            let Some(series) = node.series(column) else {
                continue;
            };
            let q = inspect_series(series);
            if q.has_nan {
                issues.push(format!("{column} contains NaN values"));
            }
            if q.has_infinite {
                issues.push(format!("{column} contains infinite values"));
            }
            if q.negative_count > 0 {
                issues.push(format!(
                    "{column} contains negative values ({} points)",
                    q.negative_count
                ));
            }
            variables.insert(column.to_string(), q);
        }

        if model == ModelType::Asm3
            && let Some(ratio) = storage_ratio(node)
            && ratio.max > MAX_STORAGE_RATIO
        {
            issues.push(format!(
                "X_STO/X_H ratio peaks at {:.3}, above {MAX_STORAGE_RATIO}",
                ratio.max
            ));
        }

        all_issues.extend(
            issues
                .iter()
                .map(|issue| format!("{}: {issue}", node_name(id, &node.label))),
        );
        nodes.insert(
            id.clone(),
            NodeQuality {
                label: node.label.clone(),
                variables,
                issues,
            },
        );
    }

    QualityReport {
        model,
        total_nodes: result.node_data.len(),
        time_points: result.len(),
        nodes,
        issues: all_issues,
        basic_issues: basic_quality(result, model),
    }
}
