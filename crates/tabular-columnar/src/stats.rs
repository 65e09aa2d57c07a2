#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::types::Element;

/// Per-column summary statistics, computed once when a column is frozen.
///
/// `min`/`max` cover valid elements only; NaNs in float columns count as NA
/// and never appear in the bounds. A column that is entirely NA has
/// `min == max == None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColumnStats<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub na_count: usize,
}

impl<T: Element> ColumnStats<T> {
    pub(crate) fn compute(values: &[T], validity: &BitVec) -> Self {
        debug_assert_eq!(values.len(), validity.len(), "stats length mismatch");

        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut na_count = 0usize;

        for (i, &v) in values.iter().enumerate() {
            if !validity.get(i) || v.is_na_value() {
                na_count += 1;
                continue;
            }
            match min {
                Some(m) if !(v < m) => {}
                _ => min = Some(v),
            }
            match max {
                Some(m) if !(v > m) => {}
                _ => max = Some(v),
            }
        }

        Self { min, max, na_count }
    }

    /// True when no valid element exists.
    pub fn is_all_na(&self) -> bool {
        self.min.is_none()
    }
}
