//! Result adapters: validate raw payloads and normalize them into [`ResultData`].
//!
//! Each model family gets one adapter function, selected by [`ModelType`]. All
//! families share the canonical shape; most adapters are the identity
//! normalization on top of the shared validation.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{
    EdgeRecord, ModelType, NodeRecord, ResultData, ResultsError, ResultsResult, RunSummary, Series,
};

/// Converts a raw payload into the canonical shape, or reports it malformed.
pub type AdapterFn = fn(&Value) -> ResultsResult<ResultData>;

impl ModelType {
    pub fn adapter(self) -> AdapterFn {
        match self {
            ModelType::Asm1 => adapt_asm1,
            ModelType::Asm1Slim => adapt_asm1slim,
            ModelType::Asm3 => adapt_asm3,
            ModelType::Udm => adapt_udm,
        }
    }
}

/// Validate and normalize `payload` with the adapter for `model`.
pub fn adapt(model: ModelType, payload: &Value) -> ResultsResult<ResultData> {
    (model.adapter())(payload)
}

/// Whether `payload` passes minimal validation.
pub fn is_valid(payload: &Value) -> bool {
    validate_payload(payload).is_ok()
}

/// Minimal well-formedness check shared by every model family.
///
/// The payload must be an object whose `timestamps` is an array and whose
/// `node_data` is an object of node objects, each with a string `label`.
pub fn validate_payload(payload: &Value) -> ResultsResult<()> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ResultsError::malformed("payload is not an object"))?;

    if !obj.get("timestamps").is_some_and(Value::is_array) {
        return Err(ResultsError::malformed("`timestamps` is not an array"));
    }

    let nodes = obj
        .get("node_data")
        .and_then(Value::as_object)
        .ok_or_else(|| ResultsError::malformed("`node_data` is not an object"))?;

    for (node_id, node) in nodes {
        let node = node.as_object().ok_or_else(|| {
            ResultsError::malformed(format!("node `{node_id}` is not an object"))
        })?;
        if !node.get("label").is_some_and(Value::is_string) {
            return Err(ResultsError::malformed(format!(
                "node `{node_id}` has no string `label`"
            )));
        }
    }

    Ok(())
}

fn adapt_asm1(payload: &Value) -> ResultsResult<ResultData> {
    validate_payload(payload)?;
    Ok(parse_canonical(payload))
}

/// ASM1Slim payloads may carry empty labels; those fall back to the node id.
fn adapt_asm1slim(payload: &Value) -> ResultsResult<ResultData> {
    validate_payload(payload)?;
    let mut rd = parse_canonical(payload);
    for (node_id, node) in rd.node_data.iter_mut() {
        if node.label.is_empty() {
            node.label = node_id.clone();
        }
    }
    Ok(rd)
}

fn adapt_asm3(payload: &Value) -> ResultsResult<ResultData> {
    validate_payload(payload)?;
    Ok(parse_canonical(payload))
}

fn adapt_udm(payload: &Value) -> ResultsResult<ResultData> {
    validate_payload(payload)?;
    Ok(parse_canonical(payload))
}

/// Build the canonical record from an already validated payload.
fn parse_canonical(payload: &Value) -> ResultData {
    let empty = Map::new();
    let obj = payload.as_object().unwrap_or(&empty);

    let timestamps = obj
        .get("timestamps")
        .and_then(Value::as_array)
        .map(|arr| parse_series("timestamps", arr))
        .unwrap_or_default();

    let node_data = obj
        .get("node_data")
        .and_then(Value::as_object)
        .map(parse_nodes)
        .unwrap_or_default();

    let edge_data = match obj.get("edge_data") {
        None | Some(Value::Null) => None,
        Some(Value::Object(edges)) => Some(parse_edges(edges)),
        Some(_) => {
            tracing::warn!("ignoring non-object `edge_data`");
            None
        }
    };

    let summary = match obj.get("summary") {
        None | Some(Value::Null) => None,
        Some(Value::Object(summary)) => Some(parse_summary(summary)),
        Some(_) => {
            tracing::warn!("ignoring non-object `summary`");
            None
        }
    };

    let rd = ResultData {
        timestamps,
        node_data,
        edge_data,
        summary,
    };
    // Kept as given; analyses that need aligned series reject them later.
    for (node_id, variable) in rd.misaligned_series() {
        tracing::warn!(
            node = %node_id,
            variable,
            "series length differs from the time axis"
        );
    }
    rd
}

fn parse_nodes(nodes: &Map<String, Value>) -> BTreeMap<String, NodeRecord> {
    let mut out = BTreeMap::new();
    for (node_id, node) in nodes {
        let Some(fields) = node.as_object() else {
            continue;
        };
        let label = fields
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut record = NodeRecord::new(label);
        for (key, value) in fields {
            if key == "label" {
                continue;
            }
            match value {
                Value::Array(arr) => {
                    record.variables.insert(key.clone(), parse_series(key, arr));
                }
                _ => tracing::debug!(node = %node_id, field = %key, "skipping non-series field"),
            }
        }
        out.insert(node_id.clone(), record);
    }
    out
}

fn parse_edges(edges: &Map<String, Value>) -> BTreeMap<String, EdgeRecord> {
    let mut out = BTreeMap::new();
    for (edge_id, edge) in edges {
        let fields = edge.as_object();
        let endpoint = |name: &str| {
            fields
                .and_then(|f| f.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let (Some(source), Some(target)) = (endpoint("source"), endpoint("target")) else {
            tracing::warn!(edge = %edge_id, "skipping edge record without string source/target");
            continue;
        };
        let flow_rate = fields
            .and_then(|f| f.get("flow_rate"))
            .and_then(Value::as_array)
            .map(|arr| parse_series("flow_rate", arr));

        out.insert(
            edge_id.clone(),
            EdgeRecord {
                source,
                target,
                flow_rate,
            },
        );
    }
    out
}

fn parse_summary(summary: &Map<String, Value>) -> RunSummary {
    let mut out = RunSummary::default();
    for (key, value) in summary {
        match key.as_str() {
            "total_steps" if value.is_u64() => out.total_steps = value.as_u64(),
            "convergence_status" if value.is_string() => {
                out.convergence_status = value.as_str().map(str::to_string)
            }
            "final_total_volume" if value.is_number() => out.final_total_volume = value.as_f64(),
            "final_mass_balance_error" if value.is_number() => {
                out.final_mass_balance_error = value.as_f64()
            }
            _ => {
                out.extra.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

/// Numbers pass through, `null` becomes NaN, numeric strings are parsed.
/// Anything else becomes NaN and is reported once per series.
fn parse_series(name: &str, values: &[Value]) -> Series {
    let mut rejected = 0usize;
    let series = values
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::Null => f64::NAN,
            Value::String(s) => s.trim().parse::<f64>().unwrap_or_else(|_| {
                rejected += 1;
                f64::NAN
            }),
            _ => {
                rejected += 1;
                f64::NAN
            }
        })
        .collect();
    if rejected > 0 {
        tracing::warn!(series = %name, rejected, "non-numeric series entries replaced with NaN");
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payload() {
        let err = validate_payload(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ResultsError::Malformed { .. }));
    }

    #[test]
    fn rejects_missing_timestamps() {
        let payload = json!({ "node_data": {} });
        assert!(!is_valid(&payload));
    }

    #[test]
    fn rejects_array_node_data() {
        let payload = json!({ "timestamps": [], "node_data": [] });
        assert!(!is_valid(&payload));
    }

    #[test]
    fn rejects_node_without_label() {
        let payload = json!({ "timestamps": [0], "node_data": { "n1": { "S_O": [1.0] } } });
        let err = validate_payload(&payload).unwrap_err();
        assert!(err.to_string().contains("n1"));
    }

    #[test]
    fn empty_payload_is_valid_not_malformed() {
        let payload = json!({ "timestamps": [], "node_data": {} });
        let rd = adapt(ModelType::Asm1, &payload).unwrap();
        assert!(rd.is_empty());
        assert!(rd.node_data.is_empty());
    }

    #[test]
    fn misaligned_series_are_kept_and_listed() {
        let payload = json!({
            "timestamps": [0, 1, 2, 3],
            "node_data": {
                "a": { "label": "A", "S_NH": [1, 2, 3, 4] },
                "b": { "label": "B", "S_NH": [1, 2], "S_O": [1, 1, 1, 1] }
            }
        });
        let rd = adapt(ModelType::Asm1, &payload).unwrap();
        assert_eq!(rd.node("b").unwrap().series("S_NH").unwrap(), &[1.0, 2.0][..]);
        let misaligned = rd.misaligned_series();
        assert_eq!(misaligned.len(), 1);
        assert_eq!(misaligned[0].0, "b");
        assert_eq!(misaligned[0].1, "S_NH");
    }

    #[test]
    fn parses_series_with_nulls_and_strings() {
        let payload = json!({
            "timestamps": [0, 1, 2],
            "node_data": { "n1": { "label": "R1", "S_O": [1.0, null, "2.5"], "kind": "cstr" } }
        });
        let rd = adapt(ModelType::Asm1, &payload).unwrap();
        let s = rd.node("n1").unwrap().series("S_O").unwrap();
        assert_eq!(s[0], 1.0);
        assert!(s[1].is_nan());
        assert_eq!(s[2], 2.5);
        assert!(rd.node("n1").unwrap().series("kind").is_none());
    }

    #[test]
    fn edges_without_endpoints_are_dropped() {
        let payload = json!({
            "timestamps": [0],
            "node_data": {},
            "edge_data": {
                "e1": { "source": "a", "target": "b", "flow_rate": [5.0] },
                "e2": { "source": "a" }
            }
        });
        let rd = adapt(ModelType::Udm, &payload).unwrap();
        let edges = rd.edge_data.as_ref().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges["e1"].flow_rate.as_deref(), Some(&[5.0][..]));
    }

    #[test]
    fn summary_keeps_typed_and_extra_fields() {
        let payload = json!({
            "timestamps": [0],
            "node_data": {},
            "summary": {
                "final_total_volume": 1200.0,
                "convergence_status": "converged",
                "solver": "rk4",
                "total_steps": "n/a"
            }
        });
        let rd = adapt(ModelType::Asm3, &payload).unwrap();
        let summary = rd.summary.unwrap();
        assert_eq!(summary.final_total_volume, Some(1200.0));
        assert_eq!(summary.convergence_status.as_deref(), Some("converged"));
        assert!(summary.total_steps.is_none());
        assert_eq!(summary.extra["solver"], "rk4");
        assert_eq!(summary.extra["total_steps"], "n/a");
    }

    #[test]
    fn asm1slim_fills_empty_labels_with_node_id() {
        let payload = json!({
            "timestamps": [0],
            "node_data": { "tank-1": { "label": "", "cod": [40.0] } }
        });
        let rd = adapt(ModelType::Asm1Slim, &payload).unwrap();
        assert_eq!(rd.node("tank-1").unwrap().label, "tank-1");

        let rd = adapt(ModelType::Asm1, &payload).unwrap();
        assert_eq!(rd.node("tank-1").unwrap().label, "");
    }
}
