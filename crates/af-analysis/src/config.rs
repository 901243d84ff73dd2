//! Analysis configuration file (YAML or JSON).

use af_core::{DEFAULT_MIN_SEPARATION, ensure_finite};
use af_results::{EdgeRef, ModelType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::edges::{EdgeParams, EdgeQuery};
use crate::steady::DEFAULT_TAIL_RATIO;
use crate::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub model: ModelType,
    pub tail_ratio: f64,
    pub min_separation: usize,
    /// Live-graph edge list; takes precedence over the payload's `edge_data`.
    pub edges: Vec<EdgeRef>,
    pub edge_params: EdgeParams,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: ModelType::default(),
            tail_ratio: DEFAULT_TAIL_RATIO,
            min_separation: DEFAULT_MIN_SEPARATION,
            edges: Vec::new(),
            edge_params: EdgeParams::new(),
        }
    }
}

fn invalid(what: String) -> AnalysisError {
    AnalysisError::Config { what }
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        ensure_finite(self.tail_ratio, "tail_ratio")?;
        if self.tail_ratio <= 0.0 || self.tail_ratio > 1.0 {
            return Err(invalid(format!(
                "tail_ratio = {} (must be in (0, 1])",
                self.tail_ratio
            )));
        }

        let mut ids = HashSet::new();
        for edge in &self.edges {
            if !ids.insert(&edge.id) {
                return Err(invalid(format!("duplicate edge id '{}'", edge.id)));
            }
        }

        for (edge_id, vars) in &self.edge_params {
            for (var, param) in vars {
                if !param.a.is_finite() || !param.b.is_finite() {
                    return Err(invalid(format!(
                        "edge_params '{edge_id}' '{var}' = {{a: {}, b: {}}} (must be finite)",
                        param.a, param.b
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> AnalysisResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn load_json(path: &Path) -> AnalysisResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load by extension: `.json` as JSON, anything else as YAML.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::load_json(path),
            _ => Self::load_yaml(path),
        }
    }

    /// Query over this config's edge list for `variables`.
    pub fn edge_query<'a>(
        &'a self,
        variables: &'a [String],
        selected_edges: &'a [String],
    ) -> EdgeQuery<'a> {
        EdgeQuery {
            variables,
            edges: (!self.edges.is_empty()).then_some(self.edges.as_slice()),
            selected_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::EdgeParam;
    use af_core::AfError;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AnalysisConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.tail_ratio, 0.2);
        assert_eq!(config.min_separation, 2);
        assert_eq!(config.model, ModelType::Asm1);
    }

    #[test]
    fn parses_full_yaml() {
        let yaml = r#"
model: asm3
tail_ratio: 0.3
min_separation: 4
edges:
  - { id: e1, source: n1, target: n2 }
edge_params:
  e1:
    S_NH: { a: 0.9, b: 0.1 }
    S_O: { b: 2.0 }
"#;
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.model, ModelType::Asm3);
        assert_eq!(config.edges, vec![EdgeRef::new("e1", "n1", "n2")]);
        assert_eq!(config.edge_params["e1"]["S_NH"], EdgeParam { a: 0.9, b: 0.1 });
        // missing coefficient keeps its identity value
        assert_eq!(config.edge_params["e1"]["S_O"], EdgeParam { a: 1.0, b: 2.0 });
    }

    #[test]
    fn rejects_out_of_range_tail_ratio() {
        for bad in ["tail_ratio: 0", "tail_ratio: 1.5", "tail_ratio: -0.1"] {
            let err = AnalysisConfig::from_yaml_str(bad).unwrap_err();
            assert!(matches!(err, AnalysisError::Config { .. }), "{bad}");
        }
        assert!(matches!(
            AnalysisConfig::from_yaml_str("tail_ratio: .nan"),
            Err(AnalysisError::Core(AfError::NonFinite { what: "tail_ratio", .. }))
        ));
        assert!(AnalysisConfig::from_yaml_str("tail_ratio: 1.0").is_ok());
    }

    #[test]
    fn rejects_duplicate_edges() {
        let yaml = "edges:\n  - { id: e1, source: a, target: b }\n  - { id: e1, source: b, target: c }\n";
        let err = AnalysisConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate edge id 'e1'"));
    }

    #[test]
    fn rejects_non_finite_params() {
        let yaml = "edge_params:\n  e1:\n    S_NH: { a: .inf, b: 0 }\n";
        assert!(matches!(
            AnalysisConfig::from_yaml_str(yaml),
            Err(AnalysisError::Config { .. })
        ));
    }

    #[test]
    fn unknown_model_is_a_parse_error() {
        assert!(matches!(
            AnalysisConfig::from_yaml_str("model: asm2d"),
            Err(AnalysisError::Yaml(_))
        ));
    }

    #[test]
    fn json_config() {
        let config = AnalysisConfig::from_json_str(r#"{ "model": "udm", "tail_ratio": 0.5 }"#).unwrap();
        assert_eq!(config.model, ModelType::Udm);
        assert_eq!(config.tail_ratio, 0.5);
    }

    #[test]
    fn load_by_extension() {
        let temp_dir = std::env::temp_dir().join("af_analysis_config_test");
        let _ = std::fs::remove_dir_all(&temp_dir);
        std::fs::create_dir_all(&temp_dir).unwrap();

        let yaml_path = temp_dir.join("analysis.yaml");
        std::fs::write(&yaml_path, "model: asm1slim\n").unwrap();
        let json_path = temp_dir.join("analysis.json");
        std::fs::write(&json_path, r#"{ "model": "asm3" }"#).unwrap();

        assert_eq!(AnalysisConfig::load(&yaml_path).unwrap().model, ModelType::Asm1Slim);
        assert_eq!(AnalysisConfig::load(&json_path).unwrap().model, ModelType::Asm3);

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn edge_query_without_edges_falls_back() {
        let config = AnalysisConfig::default();
        let vars = vec!["S_NH".to_string()];
        assert!(config.edge_query(&vars, &[]).edges.is_none());
    }
}
