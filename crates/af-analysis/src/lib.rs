//! af-analysis: steady-state detection, edge propagation, profiles and data
//! quality checks over normalized simulation results.
//!
//! Every routine here is a pure function of its inputs. Missing nodes, edges,
//! variables and edge parameters resolve to fixed defaults; only array length
//! problems and configuration errors are reported as `Err`.

pub mod config;
pub mod edges;
pub mod profile;
pub mod quality;
pub mod stats;
pub mod steady;

pub use config::AnalysisConfig;
pub use edges::{
    EdgeParam, EdgeParams, EdgeQuery, EdgeRow, EdgeSeries, edge_concentrations, edge_time_series,
};
pub use profile::{
    EffluentSeries, ProfileRow, RatioStats, carbon_nitrogen_ratio, effluent_node, effluent_series,
    percent_removal, pick_node_by_label, profile_at_end, profile_at_time, ratio_stats,
    storage_ratio,
};
pub use quality::{
    NodeQuality, QualityReport, SeriesQuality, basic_quality, inspect_series, quality_report,
};
pub use stats::{SeriesStats, last_of, linear_regression_slope, median, series_stats};
pub use steady::{
    APPROACHING_REL_SLOPE, DEFAULT_TAIL_RATIO, STABLE_REL_SLOPE, SteadyCheck, SteadyStatus,
    SteadyVerdict, T95_BAND, assess_all, assess_node, assess_series, steady_check, t95_index,
};

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Core(#[from] af_core::AfError),

    #[error(transparent)]
    Results(#[from] af_results::ResultsError),

    #[error("Invalid analysis config: {what}")]
    Config { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
