//! af-results: canonical simulation result payloads and per-model adapters.

pub mod adapter;
pub mod catalog;
pub mod hash;
pub mod load;
pub mod types;

pub use adapter::{AdapterFn, adapt, is_valid, validate_payload};
pub use catalog::{
    AvailableVariable, FLOW_RATE, ModelType, VOLUME, VariableInfo, available_nodes,
    available_variables, non_negative_columns, plottable_variables,
};
pub use hash::payload_fingerprint;
pub use load::{LoadedJob, load_job_file, load_job_str};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed result payload: {reason}")]
    Malformed { reason: String },

    #[error("Unknown model type: {name}")]
    UnknownModel { name: String },
}

impl ResultsError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ResultsError::Malformed {
            reason: reason.into(),
        }
    }
}
