//! Canonical result data types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type NodeId = String;
pub type EdgeId = String;

/// A named numeric series, aligned index-for-index with `ResultData::timestamps`.
pub type Series = Vec<f64>;

/// One simulation job's result, normalized to the shape the analysis engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResultData {
    pub timestamps: Series,
    pub node_data: BTreeMap<NodeId, NodeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_data: Option<BTreeMap<EdgeId, EdgeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

impl ResultData {
    /// Number of time points.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Last valid time index (0 for an empty result).
    pub fn last_index(&self) -> usize {
        self.timestamps.len().saturating_sub(1)
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.node_data.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeRecord> {
        self.edge_data.as_ref()?.get(id)
    }

    /// Edges recorded in the payload itself, as plain references.
    pub fn payload_edges(&self) -> Vec<EdgeRef> {
        self.edge_data
            .iter()
            .flatten()
            .map(|(id, edge)| EdgeRef {
                id: id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect()
    }

    /// `(node id, variable)` for every node series whose length differs from
    /// the time axis.
    pub fn misaligned_series(&self) -> Vec<(&NodeId, &str)> {
        let len = self.timestamps.len();
        self.node_data
            .iter()
            .flat_map(|(id, node)| {
                node.variables
                    .iter()
                    .filter(move |(_, series)| series.len() != len)
                    .map(move |(name, _)| (id, name.as_str()))
            })
            .collect()
    }
}

/// A process unit's record: a display label plus an open set of named series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodeRecord {
    pub label: String,
    #[serde(flatten)]
    pub variables: BTreeMap<String, Series>,
}

impl NodeRecord {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for fixtures.
    pub fn with_series(mut self, name: impl Into<String>, values: Series) -> Self {
        self.variables.insert(name.into(), values);
        self
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at `index`, if both exist.
    pub fn value_at(&self, name: &str, index: usize) -> Option<f64> {
        self.series(name)?.get(index).copied()
    }
}

/// A directed connection as recorded in a result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<Series>,
}

/// A directed connection as supplied by the live diagram graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeRef {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Whole-run diagnostics. Unknown keys are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_total_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_mass_balance_error: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
