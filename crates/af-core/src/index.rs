//! Total normalization of time indices and index ranges.
//!
//! Interactive selectors hand us whatever the user (or a transient data state)
//! produced: negative values, NaN, fractional positions, reversed ranges. Every
//! function here maps such input to a valid, ordered, in-range result and never
//! fails.

/// Inclusive `(start, end)` pair of positions into a timestamp sequence.
pub type IndexRange = (usize, usize);

/// Minimum separation the range selector keeps between its thumbs.
pub const DEFAULT_MIN_SEPARATION: usize = 2;

fn safe_max(max_index: f64) -> usize {
    if max_index.is_finite() {
        max_index.floor().max(0.0) as usize
    } else {
        0
    }
}

fn floor_or_zero(value: f64) -> f64 {
    if value.is_finite() { value.floor() } else { 0.0 }
}

fn clamp_to(value: f64, max: usize) -> usize {
    value.clamp(0.0, max as f64) as usize
}

/// Clamp a single index into `[0, max(0, floor(max_index))]`.
///
/// Non-integer input is floored; non-finite input maps to `0`.
pub fn normalize_index(value: f64, max_index: f64) -> usize {
    clamp_to(floor_or_zero(value), safe_max(max_index))
}

/// Clamp and order a two-sided range, keeping at least `min_separation` between
/// the endpoints whenever `max_index` leaves room for it.
///
/// `min_separation` is itself floored and clamped into `[0, safe_max]`. When the
/// end cannot be pushed forward far enough, the range is anchored at `safe_max`
/// and the start is pulled back instead.
pub fn normalize_index_range(range: (f64, f64), max_index: f64, min_separation: f64) -> IndexRange {
    let max = safe_max(max_index);
    let separation = clamp_to(floor_or_zero(min_separation), max);

    let mut start = clamp_to(floor_or_zero(range.0), max);
    let mut end = clamp_to(floor_or_zero(range.1), max);

    if end < start {
        std::mem::swap(&mut start, &mut end);
    }

    if end - start < separation {
        if max - start >= separation {
            end = start + separation;
        } else {
            end = max;
            start = end - separation;
        }
    }

    (start, end)
}

/// Selector bounds derived from the length of a timestamp sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlider {
    last_index: usize,
    min_separation: usize,
}

impl TimeSlider {
    /// Bounds for a series with `len` points.
    ///
    /// A series with at most one point disables the slider: the only valid
    /// position is `0` and no separation is enforced.
    pub fn for_len(len: usize) -> Self {
        let last_index = len.saturating_sub(1);
        let min_separation = if len <= 1 {
            0
        } else {
            DEFAULT_MIN_SEPARATION.min(last_index)
        };
        Self {
            last_index,
            min_separation,
        }
    }

    /// Same bounds with a caller-chosen separation, clamped to what the series allows.
    pub fn with_min_separation(self, min_separation: usize) -> Self {
        Self {
            min_separation: min_separation.min(self.last_index),
            ..self
        }
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn min_separation(&self) -> usize {
        self.min_separation
    }

    pub fn is_disabled(&self) -> bool {
        self.last_index == 0
    }

    /// Initial single-index selection: the most recent point.
    pub fn default_index(&self) -> usize {
        self.last_index
    }

    /// Initial range selection: the whole series.
    pub fn default_range(&self) -> IndexRange {
        (0, self.last_index)
    }

    pub fn index(&self, raw: f64) -> usize {
        normalize_index(raw, self.last_index as f64)
    }

    pub fn range(&self, raw: (f64, f64)) -> IndexRange {
        normalize_index_range(raw, self.last_index as f64, self.min_separation as f64)
    }
}
