//! Reading simulation job files.
//!
//! A job file is either a job envelope `{ "job_info": {...}, "result_data": {...} }`
//! as returned by the job service, or a bare result payload.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::{ModelType, ResultData, ResultsResult, adapt};

/// A normalized job result plus whatever job metadata accompanied it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedJob {
    pub model: ModelType,
    pub job_info: Option<Value>,
    pub result: ResultData,
}

pub fn load_job_str(json: &str, model: ModelType) -> ResultsResult<LoadedJob> {
    let root: Value = serde_json::from_str(json)?;

    let (job_info, payload) = match root {
        Value::Object(mut obj) if obj.contains_key("result_data") => {
            let payload = obj.remove("result_data").unwrap_or(Value::Null);
            let job_info = obj.remove("job_info").filter(|v| !v.is_null());
            (job_info, payload)
        }
        other => (None, other),
    };

    let result = adapt(model, &payload)?;
    tracing::debug!(
        model = %model,
        nodes = result.node_data.len(),
        points = result.len(),
        "loaded job result"
    );

    Ok(LoadedJob {
        model,
        job_info,
        result,
    })
}

pub fn load_job_file(path: &Path, model: ModelType) -> ResultsResult<LoadedJob> {
    let content = fs::read_to_string(path)?;
    load_job_str(&content, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResultsError;

    #[test]
    fn unwraps_job_envelope() {
        let json = r#"{
            "job_info": { "job_id": "j-42", "status": "completed" },
            "result_data": { "timestamps": [0, 1], "node_data": { "n1": { "label": "R1", "S_O": [2, 2] } } }
        }"#;
        let job = load_job_str(json, ModelType::Asm1).unwrap();
        assert_eq!(job.job_info.unwrap()["job_id"], "j-42");
        assert_eq!(job.result.len(), 2);
    }

    #[test]
    fn accepts_bare_payload() {
        let json = r#"{ "timestamps": [0], "node_data": {} }"#;
        let job = load_job_str(json, ModelType::Udm).unwrap();
        assert!(job.job_info.is_none());
        assert_eq!(job.model, ModelType::Udm);
    }

    #[test]
    fn null_result_data_is_malformed() {
        let json = r#"{ "job_info": {}, "result_data": null }"#;
        assert!(matches!(
            load_job_str(json, ModelType::Asm1),
            Err(ResultsError::Malformed { .. })
        ));
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        assert!(matches!(
            load_job_str("{ not json", ModelType::Asm1),
            Err(ResultsError::Json(_))
        ));
    }
}
