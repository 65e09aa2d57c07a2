#![forbid(unsafe_code)]

use crate::codec::UInt;
use crate::constants::INSERTION_SORT_NROWS;
use crate::output::Ordinal;
use std::cmp::Ordering;

/// Stable insertion sort of an ordering slice. `lt(a, b)` receives row
/// indices and must mean "row `a` sorts strictly before row `b`".
pub(crate) fn insertion_sort<I, F>(ordering: &mut [I], mut lt: F)
where
    I: Ordinal,
    F: FnMut(usize, usize) -> bool,
{
    for i in 1..ordering.len() {
        let current = ordering[i];
        let mut j = i;
        while j > 0 && lt(current.to_usize(), ordering[j - 1].to_usize()) {
            ordering[j] = ordering[j - 1];
            j -= 1;
        }
        ordering[j] = current;
    }
}

/// Stable comparison sort for inputs above the insertion-sort sweet spot but
/// below the radix threshold.
pub(crate) fn comparison_sort<I, F>(ordering: &mut [I], mut compare: F)
where
    I: Ordinal,
    F: FnMut(usize, usize) -> Ordering,
{
    ordering.sort_by(|a, b| compare(a.to_usize(), b.to_usize()));
}

/// Small-input dispatch used by the sorters.
pub(crate) fn sort_small<I, F>(ordering: &mut [I], mut compare: F)
where
    I: Ordinal,
    F: FnMut(usize, usize) -> Ordering,
{
    if ordering.len() <= INSERTION_SORT_NROWS {
        insertion_sort(ordering, |a, b| compare(a, b) == Ordering::Less);
    } else {
        comparison_sort(ordering, compare);
    }
}

/// Stable insertion sort of a radix bucket: orders `keys` ascending and
/// co-permutes `ordering` so the two stay row-aligned.
pub(crate) fn insertion_sort_keyed<I, K>(ordering: &mut [I], keys: &mut [K])
where
    I: Ordinal,
    K: UInt,
{
    debug_assert_eq!(ordering.len(), keys.len(), "bucket buffers misaligned");
    for i in 1..keys.len() {
        let key = keys[i];
        let row = ordering[i];
        let mut j = i;
        while j > 0 && key < keys[j - 1] {
            keys[j] = keys[j - 1];
            ordering[j] = ordering[j - 1];
            j -= 1;
        }
        keys[j] = key;
        ordering[j] = row;
    }
}

/// Stable sort of a larger radix bucket by residual key: pairs up the two
/// buffers, delegates to the standard sort, and unzips back in place.
pub(crate) fn comparison_sort_keyed<I, K>(ordering: &mut [I], keys: &mut [K])
where
    I: Ordinal,
    K: UInt,
{
    debug_assert_eq!(ordering.len(), keys.len(), "bucket buffers misaligned");
    let mut pairs: Vec<(K, I)> = keys
        .iter()
        .copied()
        .zip(ordering.iter().copied())
        .collect();
    pairs.sort_by_key(|&(k, _)| k);
    for (slot, (k, row)) in pairs.into_iter().enumerate() {
        keys[slot] = k;
        ordering[slot] = row;
    }
}
