//! Edge concentration propagation.
//!
//! An edge reports, per variable, its source node's value passed through a
//! linear transform `a * x + b`. The flow-rate channel is different: it is read
//! from the edge's own `flow_rate` series and never transformed.
//!
//! Edges are enumerated from an explicit list (the live diagram graph) when one
//! is supplied, otherwise from the payload's `edge_data`. Edges whose source
//! node has no record are skipped.

use af_core::{IndexRange, TimeSlider};
use af_results::{EdgeId, EdgeRef, FLOW_RATE, NodeRecord, ResultData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linear transform coefficients for one (edge, variable) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParam {
    pub a: f64,
    pub b: f64,
}

impl EdgeParam {
    pub const IDENTITY: EdgeParam = EdgeParam { a: 1.0, b: 0.0 };

    pub fn apply(&self, x: f64) -> f64 {
        x * self.a + self.b
    }
}

impl Default for EdgeParam {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Edge id -> variable -> transform.
pub type EdgeParams = BTreeMap<EdgeId, BTreeMap<String, EdgeParam>>;

/// What to propagate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeQuery<'a> {
    pub variables: &'a [String],
    /// Authoritative edge list. `None` or empty falls back to `edge_data`.
    pub edges: Option<&'a [EdgeRef]>,
    /// Restricts output to these edge ids; empty means all.
    pub selected_edges: &'a [String],
}

/// One edge's values at a single time index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRow {
    pub edge_label: String,
    pub edge_id: EdgeId,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// One edge's values over a range of time indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSeries {
    pub edge_id: EdgeId,
    pub edge_label: String,
    pub times: Vec<f64>,
    pub values: BTreeMap<String, Vec<f64>>,
}

/// An edge whose source node resolved.
struct ResolvedEdge<'r> {
    id: EdgeId,
    label: String,
    source: &'r NodeRecord,
    params: Option<&'r BTreeMap<String, EdgeParam>>,
    flow: Option<&'r [f64]>,
}

impl ResolvedEdge<'_> {
    fn value(&self, variable: &str, index: usize) -> f64 {
        if variable == FLOW_RATE {
            return self.flow_value(index);
        }
        let x = self
            .source
            .value_at(variable, index)
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0);
        let param = self
            .params
            .and_then(|p| p.get(variable))
            .copied()
            .unwrap_or_default();
        param.apply(x)
    }

    /// `flow[index]`, else `flow[0]`, else `0`. NaN counts as unavailable.
    fn flow_value(&self, index: usize) -> f64 {
        let Some(flow) = self.flow else {
            return 0.0;
        };
        let available = |i: usize| flow.get(i).copied().filter(|v| !v.is_nan());
        available(index).or_else(|| available(0)).unwrap_or(0.0)
    }
}

fn node_label<'a>(result: &'a ResultData, id: &'a str) -> &'a str {
    match result.node(id) {
        Some(node) if !node.label.is_empty() => &node.label,
        _ => id,
    }
}

fn resolve_edges<'r>(
    result: &'r ResultData,
    params: &'r EdgeParams,
    query: &EdgeQuery<'_>,
) -> Vec<ResolvedEdge<'r>> {
    let edges = match query.edges {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => result.payload_edges(),
    };

    edges
        .into_iter()
        .filter(|e| query.selected_edges.is_empty() || query.selected_edges.contains(&e.id))
        .filter_map(|e| {
            let Some(source) = result.node(&e.source) else {
                tracing::debug!(
                    edge = %e.id,
                    source = %e.source,
                    "edge source has no node record, skipping"
                );
                return None;
            };
            let label = format!(
                "{} → {}",
                node_label(result, &e.source),
                node_label(result, &e.target)
            );
            Some(ResolvedEdge {
                params: params.get(&e.id),
                flow: result.edge(&e.id).and_then(|rec| rec.flow_rate.as_deref()),
                id: e.id,
                label,
                source,
            })
        })
        .collect()
}

/// Values of every enumerated edge at `time_index`, one row per edge.
///
/// Never fails: a missing variable reads as `0`, a missing transform as the
/// identity, a missing flow series as `0`.
pub fn edge_concentrations(
    result: &ResultData,
    params: &EdgeParams,
    query: &EdgeQuery<'_>,
    time_index: usize,
) -> Vec<EdgeRow> {
    resolve_edges(result, params, query)
        .into_iter()
        .map(|edge| {
            let values = query
                .variables
                .iter()
                .map(|var| (var.clone(), edge.value(var, time_index)))
                .collect();
            EdgeRow {
                edge_label: edge.label,
                edge_id: edge.id,
                values,
            }
        })
        .collect()
}

/// Pointwise propagation over a time-index range.
///
/// `range` is normalized against the payload's last index, keeping
/// `min_separation` where the series allows it, so any input is accepted. An
/// empty payload yields empty series.
pub fn edge_time_series(
    result: &ResultData,
    params: &EdgeParams,
    query: &EdgeQuery<'_>,
    range: (f64, f64),
    min_separation: usize,
) -> Vec<EdgeSeries> {
    let indices: Vec<usize> = if result.is_empty() {
        Vec::new()
    } else {
        let slider = TimeSlider::for_len(result.len()).with_min_separation(min_separation);
        let (start, end): IndexRange = slider.range(range);
        (start..=end).collect()
    };
    let times: Vec<f64> = indices.iter().map(|&i| result.timestamps[i]).collect();

    resolve_edges(result, params, query)
        .into_iter()
        .map(|edge| {
            let values = query
                .variables
                .iter()
                .map(|var| {
                    let series = indices.iter().map(|&i| edge.value(var, i)).collect();
                    (var.clone(), series)
                })
                .collect();
            EdgeSeries {
                edge_id: edge.id,
                edge_label: edge.label,
                times: times.clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_results::EdgeRecord;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> ResultData {
        let mut rd = ResultData {
            timestamps: vec![0.0, 1.0, 2.0],
            ..Default::default()
        };
        rd.node_data.insert(
            "n1".into(),
            NodeRecord::new("Anoxic").with_series("S_NH", vec![10.0, 20.0, 30.0]),
        );
        rd.node_data.insert(
            "n2".into(),
            NodeRecord::new("").with_series("S_NH", vec![1.0, 2.0, 3.0]),
        );
        let mut edges = BTreeMap::new();
        edges.insert(
            "e1".into(),
            EdgeRecord {
                source: "n1".into(),
                target: "n2".into(),
                flow_rate: Some(vec![100.0, f64::NAN]),
            },
        );
        rd.edge_data = Some(edges);
        rd
    }

    #[test]
    fn identity_by_default() {
        let rd = sample();
        let variables = vars(&["S_NH"]);
        let query = EdgeQuery {
            variables: &variables,
            ..Default::default()
        };
        let rows = edge_concentrations(&rd, &EdgeParams::new(), &query, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].edge_id, "e1");
        assert_eq!(rows[0].edge_label, "Anoxic → n2");
        assert_eq!(rows[0].values["S_NH"], 20.0);
    }

    #[test]
    fn linear_transform_applies_to_node_channel() {
        let rd = sample();
        let variables = vars(&["S_NH", "S_O"]);
        let mut params = EdgeParams::new();
        params
            .entry("e1".into())
            .or_default()
            .insert("S_NH".into(), EdgeParam { a: 0.5, b: 2.0 });
        let query = EdgeQuery {
            variables: &variables,
            ..Default::default()
        };
        let row = &edge_concentrations(&rd, &params, &query, 2)[0];
        assert_eq!(row.values["S_NH"], 17.0);
        // missing on the source node
        assert_eq!(row.values["S_O"], 0.0);
    }

    #[test]
    fn flow_reads_edge_series_with_fallbacks() {
        let rd = sample();
        let variables = vars(&[FLOW_RATE]);
        let query = EdgeQuery {
            variables: &variables,
            ..Default::default()
        };
        let at = |t| edge_concentrations(&rd, &EdgeParams::new(), &query, t)[0].values[FLOW_RATE];
        assert_eq!(at(0), 100.0);
        // NaN at 1, out of range at 2: both fall back to the first sample
        assert_eq!(at(1), 100.0);
        assert_eq!(at(2), 100.0);
    }

    #[test]
    fn flow_without_series_is_zero() {
        let rd = sample();
        let variables = vars(&[FLOW_RATE]);
        let live = [EdgeRef::new("live-1", "n2", "n1")];
        let query = EdgeQuery {
            variables: &variables,
            edges: Some(&live),
            ..Default::default()
        };
        let rows = edge_concentrations(&rd, &EdgeParams::new(), &query, 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].edge_label, "n2 → Anoxic");
        assert_eq!(rows[0].values[FLOW_RATE], 0.0);
    }

    #[test]
    fn explicit_edges_take_precedence() {
        let rd = sample();
        let variables = vars(&["S_NH"]);
        let live = [EdgeRef::new("live-1", "n2", "n1")];
        let query = EdgeQuery {
            variables: &variables,
            edges: Some(&live),
            ..Default::default()
        };
        let rows = edge_concentrations(&rd, &EdgeParams::new(), &query, 0);
        let ids: Vec<&str> = rows.iter().map(|r| r.edge_id.as_str()).collect();
        assert_eq!(ids, ["live-1"]);

        let empty: [EdgeRef; 0] = [];
        let query = EdgeQuery {
            edges: Some(&empty),
            ..query
        };
        let rows = edge_concentrations(&rd, &EdgeParams::new(), &query, 0);
        assert_eq!(rows[0].edge_id, "e1");
    }

    #[test]
    fn selected_edges_filter() {
        let rd = sample();
        let variables = vars(&["S_NH"]);
        let selected = vars(&["other"]);
        let query = EdgeQuery {
            variables: &variables,
            edges: None,
            selected_edges: &selected,
        };
        assert!(edge_concentrations(&rd, &EdgeParams::new(), &query, 0).is_empty());
    }

    #[test]
    fn missing_source_skips_edge() {
        let rd = sample();
        let variables = vars(&["S_NH"]);
        let live = [EdgeRef::new("ghost", "gone", "n1")];
        let query = EdgeQuery {
            variables: &variables,
            edges: Some(&live),
            ..Default::default()
        };
        assert!(edge_concentrations(&rd, &EdgeParams::new(), &query, 0).is_empty());
    }

    #[test]
    fn time_series_over_normalized_range() {
        let rd = sample();
        let variables = vars(&["S_NH"]);
        let query = EdgeQuery {
            variables: &variables,
            ..Default::default()
        };
        // reversed and out of range
        let series = edge_time_series(&rd, &EdgeParams::new(), &query, (9.0, -3.0), 2);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].times, vec![0.0, 1.0, 2.0]);
        assert_eq!(series[0].values["S_NH"], vec![10.0, 20.0, 30.0]);

        let narrow = edge_time_series(&rd, &EdgeParams::new(), &query, (2.0, 2.0), 2);
        assert_eq!(narrow[0].times, vec![0.0, 1.0, 2.0]);

        let single = edge_time_series(&rd, &EdgeParams::new(), &query, (1.0, 1.0), 0);
        assert_eq!(single[0].times, vec![1.0]);
        assert_eq!(single[0].values["S_NH"], vec![20.0]);
    }

    #[test]
    fn time_series_of_empty_payload() {
        let rd = ResultData::default();
        let variables = vars(&["S_NH"]);
        let query = EdgeQuery {
            variables: &variables,
            ..Default::default()
        };
        assert!(edge_time_series(&rd, &EdgeParams::new(), &query, (0.0, 5.0), 2).is_empty());
    }
}
