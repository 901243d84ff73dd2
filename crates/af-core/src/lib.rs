//! af-core: shared foundation for asmflow.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (Real + tolerances + float helpers)
//! - index (total index/range normalization for time selectors)

pub mod error;
pub mod index;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{AfError, AfResult};
pub use index::{
    DEFAULT_MIN_SEPARATION, IndexRange, TimeSlider, normalize_index, normalize_index_range,
};
pub use numeric::*;
