//! [`Extrema`] and [`StatsEntry`]: the per-slice statistics payload.

use rangekv_core::SliceNum;

/// Running min/max for one slice, in the numeric family selected by
/// `rangekv_core::is_float_key` for the owning index's key type.
///
/// Modeled as a sum type rather than an opaque union: the two families
/// never mix within one index, so callers match on the variant they
/// already know from the index's key type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extrema {
    /// Integer-family extrema: signed integer and byte/string keys.
    Integer {
        /// Running minimum normalized value.
        min: u64,
        /// Running maximum normalized value.
        max: u64,
    },
    /// Floating-family extrema: `Float32`/`Float64` keys.
    Floating {
        /// Running minimum normalized value.
        min: f64,
        /// Running maximum normalized value.
        max: f64,
    },
}

impl Extrema {
    /// A fresh extrema bracket of a single observed value.
    pub fn singleton_int(v: u64) -> Self {
        Extrema::Integer { min: v, max: v }
    }

    /// A fresh extrema bracket of a single observed value.
    pub fn singleton_float(v: f64) -> Self {
        Extrema::Floating { min: v, max: v }
    }

    /// Widen the bracket to include `v`. Panics if `v`'s family does not
    /// match `self`'s: callers must route through the index's own
    /// `is_float_key` before calling this, so a mismatch is a caller bug.
    pub fn widen_int(&mut self, v: u64) {
        match self {
            Extrema::Integer { min, max } => {
                *min = (*min).min(v);
                *max = (*max).max(v);
            }
            Extrema::Floating { .. } => panic!("widen_int called on floating extrema"),
        }
    }

    /// Widen the bracket to include `v`. See [`Extrema::widen_int`] for the
    /// family-mismatch panic contract.
    pub fn widen_float(&mut self, v: f64) {
        match self {
            Extrema::Floating { min, max } => {
                *min = min.min(v);
                *max = max.max(v);
            }
            Extrema::Integer { .. } => panic!("widen_float called on integer extrema"),
        }
    }

    /// `true` if this is the floating family.
    pub fn is_floating(&self) -> bool {
        matches!(self, Extrema::Floating { .. })
    }
}

/// `{slice_num, min_key_norm, max_key_norm, count}` — the statistics
/// tracked for one slice.
///
/// On range servers, `min`/`max` are the running extremes observed in
/// local puts to that slice; on clients, after flush, they are the
/// unioned view across that index's servers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsEntry {
    /// The slice this entry describes.
    pub slice_num: SliceNum,
    /// Running extrema, in the family the owning index's key type selects.
    pub extrema: Extrema,
    /// Number of puts observed for this slice since last load (deletions
    /// do not decrement this; see the module-level deletion policy note in
    /// [`crate::map::StatsMap`]).
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_int_tracks_running_bracket() {
        let mut e = Extrema::singleton_int(50);
        e.widen_int(10);
        e.widen_int(90);
        assert_eq!(e, Extrema::Integer { min: 10, max: 90 });
    }

    #[test]
    fn widen_float_tracks_running_bracket() {
        let mut e = Extrema::singleton_float(0.5);
        e.widen_float(-1.5);
        e.widen_float(3.0);
        assert_eq!(e, Extrema::Floating { min: -1.5, max: 3.0 });
    }

    #[test]
    #[should_panic(expected = "widen_int called on floating extrema")]
    fn widen_int_on_floating_panics() {
        let mut e = Extrema::singleton_float(1.0);
        e.widen_int(1);
    }
}
