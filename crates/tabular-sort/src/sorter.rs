#![forbid(unsafe_code)]

use crate::codec::{significant_bits, Direction, KeyBias, KeyCodec, UInt};
use crate::constants::{
    COMPARISON_SORT_NROWS, INSERTION_SORT_NROWS, MAX_RADIX_BITS, MIN_ROWS_PER_CHUNK,
};
use crate::grouper::Grouper;
use crate::output::Ordinal;
use crate::parallel;
use crate::radix::{self, RadixPass};
use crate::smallsort;
use crate::view::ViewMut;
use std::cmp::Ordering;
use std::marker::PhantomData;
use tabular_columnar::PrimitiveColumn;

/// Object-safe single-column sorter. The public factory and the composite
/// sorter talk to typed columns through this.
pub(crate) trait SingleSorter {
    fn nrows(&self) -> usize;
    fn sort_u32(&self, find_groups: bool) -> (Vec<u32>, Option<Vec<u32>>);
    fn sort_u64(&self, find_groups: bool) -> (Vec<u64>, Option<Vec<u64>>);
    /// Three-way row comparison in the sorter's direction; the composite
    /// sorter invokes this as the tie-break within equal-key groups.
    fn compare_rows(&self, i: usize, j: usize) -> Ordering;
}

/// Width-dispatch glue: lets generic code ask a dynamic sorter for an
/// ordering at its own ordinal width.
pub(crate) trait SortWidth: Ordinal {
    fn sort_column(
        sorter: &dyn SingleSorter,
        find_groups: bool,
    ) -> (Vec<Self>, Option<Vec<Self>>);
}

impl SortWidth for u32 {
    fn sort_column(
        sorter: &dyn SingleSorter,
        find_groups: bool,
    ) -> (Vec<u32>, Option<Vec<u32>>) {
        sorter.sort_u32(find_groups)
    }
}

impl SortWidth for u64 {
    fn sort_column(
        sorter: &dyn SingleSorter,
        find_groups: bool,
    ) -> (Vec<u64>, Option<Vec<u64>>) {
        sorter.sort_u64(find_groups)
    }
}

/// Binds one scalar type's codec and column statistics to the generic
/// small-sort / radix machinery.
pub(crate) struct ColumnSorter<'a, C: KeyCodec> {
    column: &'a PrimitiveColumn<C::Value>,
    direction: Direction,
    _codec: PhantomData<fn() -> C>,
}

impl<'a, C: KeyCodec> ColumnSorter<'a, C> {
    pub fn new(column: &'a PrimitiveColumn<C::Value>, direction: Direction) -> Self {
        Self {
            column,
            direction,
            _codec: PhantomData,
        }
    }

    fn compare(&self, i: usize, j: usize) -> Ordering {
        let (a, a_valid) = self.column.get(i);
        let (b, b_valid) = self.column.get(j);
        C::compare(a, a_valid, b, b_valid, self.direction)
    }

    fn sort_typed<I: Ordinal>(&self, find_groups: bool) -> (Vec<I>, Option<Vec<I>>) {
        let n = self.column.nrows();
        if n == 0 {
            return (Vec::new(), find_groups.then(|| vec![I::from_usize(0)]));
        }

        let stats = self.column.stats();

        // Entirely-NA and constant-no-NA columns are already ordered: emit
        // the identity without touching the histogram machinery.
        if stats.na_count == n || (stats.na_count == 0 && stats.min == stats.max) {
            return identity::<I>(n, find_groups);
        }

        let (Some(min), Some(max)) = (stats.min, stats.max) else {
            // na_count == n was handled above; stats always carry bounds here.
            debug_assert!(false, "column stats missing min/max");
            return identity::<I>(n, find_groups);
        };

        let t_min = C::transform(min);
        let t_max = C::transform(max);
        let range = t_max - t_min;

        // A full-domain 64-bit column would wrap the `1 + bias` key; such
        // columns take the comparison path regardless of size.
        let key_space_ok = range.checked_add(1).is_some();

        if n <= COMPARISON_SORT_NROWS || !key_space_ok {
            return self.sort_comparison(find_groups);
        }
        self.sort_radix(find_groups, t_min, t_max, range)
    }

    fn sort_comparison<I: Ordinal>(&self, find_groups: bool) -> (Vec<I>, Option<Vec<I>>) {
        let n = self.column.nrows();
        let mut ordering: Vec<I> = (0..n).map(I::from_usize).collect();
        smallsort::sort_small(&mut ordering, |a, b| self.compare(a, b));

        let groups = find_groups.then(|| {
            let mut buf = vec![I::from_usize(0); n + 1];
            let mut grouper = Grouper::new(ViewMut::new(buf.as_mut_slice()));
            grouper.push_from_predicate(n, |i| {
                self.compare(ordering[i - 1].to_usize(), ordering[i].to_usize())
                    != Ordering::Equal
            });
            let ngroups = grouper.ngroups();
            buf.truncate(ngroups + 1);
            buf
        });

        (ordering, groups)
    }

    fn sort_radix<I: Ordinal>(
        &self,
        find_groups: bool,
        t_min: u64,
        t_max: u64,
        range: u64,
    ) -> (Vec<I>, Option<Vec<I>>) {
        let n = self.column.nrows();
        let bias = KeyBias {
            t_min,
            t_max,
            direction: self.direction,
        };

        // Radix keys are computed once, in parallel, aligned with row order.
        let mut keys: Vec<C::Key> = vec![C::Key::default(); n];
        let chunk_len = n
            .div_ceil(parallel::pool_threads())
            .max(MIN_ROWS_PER_CHUNK);
        let column = self.column;
        parallel::fill_chunks(&mut keys, chunk_len, |start, out| {
            for (i, slot) in out.iter_mut().enumerate() {
                let (v, valid) = column.get(start + i);
                *slot = C::radix_key(v, valid, &bias);
            }
        });

        let n_sig = significant_bits(range);
        debug_assert!(n_sig <= C::Key::BITS, "key range exceeds key width");
        let first_bits = n_sig.min(MAX_RADIX_BITS);
        let shift = n_sig - first_bits;
        let mask = (1u64 << shift) - 1;

        let radix_of = |p: usize| {
            let k = keys[p].as_u64();
            if k == 0 {
                0
            } else {
                1 + ((k - 1) >> shift) as usize
            }
        };
        let residual_of = |p: usize| C::Key::from_u64(keys[p].as_u64().wrapping_sub(1) & mask);

        let na_last = self.direction == Direction::Descending;
        let pass = RadixPass::new(n, first_bits, true);
        let na_bucket = if na_last { pass.n_radixes - 1 } else { 0 };

        let mut ordering: Vec<I> = vec![I::from_usize(0); n];
        let mut residuals: Vec<C::Key> = if shift > 0 {
            vec![C::Key::default(); n]
        } else {
            Vec::new()
        };

        let bucket_lengths = radix::scatter(
            &pass,
            None,
            &mut ordering,
            &radix_of,
            &residual_of,
            if shift > 0 {
                Some(residuals.as_mut_slice())
            } else {
                None
            },
            na_last,
        );

        let mut group_buf = find_groups.then(|| vec![I::from_usize(0); n + 1]);
        let mut grouper = group_buf
            .as_mut()
            .map(|buf| Grouper::new(ViewMut::new(buf.as_mut_slice())));

        if shift == 0 {
            // One pass consumed every significant bit: each non-empty
            // bucket is one finished group.
            if let Some(g) = grouper.as_mut() {
                for &len in &bucket_lengths {
                    if len > 0 {
                        g.push(len);
                    }
                }
            }
        } else {
            radix::sort_subgroups(
                &bucket_lengths,
                Some(na_bucket),
                &mut ordering,
                &mut residuals,
                grouper.as_mut(),
                |ord, res, g| refine_bucket(ord, res, shift, g),
            );
        }

        let ngroups = grouper.as_ref().map(|g| g.ngroups());
        drop(grouper);
        let groups = match (group_buf, ngroups) {
            (Some(mut buf), Some(ngroups)) => {
                buf.truncate(ngroups + 1);
                Some(buf)
            }
            _ => None,
        };

        (ordering, groups)
    }
}

fn identity<I: Ordinal>(n: usize, find_groups: bool) -> (Vec<I>, Option<Vec<I>>) {
    let ordering = (0..n).map(I::from_usize).collect();
    let groups = find_groups.then(|| vec![I::from_usize(0), I::from_usize(n)]);
    (ordering, groups)
}

/// Recursively orders one radix bucket by its residual key bits.
///
/// Small buckets finish with a keyed small sort; larger ones take another
/// radix pass over the next `MAX_RADIX_BITS` of the residual and recurse.
/// Each level owns its scratch buffers and copies back into the parent
/// slice, so parent bucket boundaries never move once known.
fn refine_bucket<I: Ordinal, K: UInt>(
    ordering: &mut [I],
    residuals: &mut [K],
    remaining_bits: u32,
    grouper: Option<&mut Grouper<'_, I>>,
) {
    let n = ordering.len();
    debug_assert!(n > 1, "bucket of one row needs no refinement");
    debug_assert!(remaining_bits > 0, "no residual bits left to refine");

    if n <= INSERTION_SORT_NROWS {
        smallsort::insertion_sort_keyed(ordering, residuals);
        push_key_runs(residuals, grouper);
        return;
    }
    if n <= COMPARISON_SORT_NROWS {
        smallsort::comparison_sort_keyed(ordering, residuals);
        push_key_runs(residuals, grouper);
        return;
    }

    let bits = remaining_bits.min(MAX_RADIX_BITS);
    let shift = remaining_bits - bits;
    let mask = (1u64 << shift) - 1;
    // Sub-passes run on one chunk: recursive refinement stays sequential.
    let pass = RadixPass::new(n, bits, false);

    let radix_of = |p: usize| (1 + (residuals[p].as_u64() >> shift)) as usize;
    let residual_of = |p: usize| K::from_u64(residuals[p].as_u64() & mask);

    let mut ord_out: Vec<I> = vec![I::from_usize(0); n];
    let mut res_out: Vec<K> = if shift > 0 {
        vec![K::default(); n]
    } else {
        Vec::new()
    };

    let bucket_lengths = radix::scatter(
        &pass,
        Some(&*ordering),
        &mut ord_out,
        &radix_of,
        &residual_of,
        if shift > 0 {
            Some(res_out.as_mut_slice())
        } else {
            None
        },
        false,
    );

    ordering.copy_from_slice(&ord_out);
    if shift > 0 {
        residuals.copy_from_slice(&res_out);
        radix::sort_subgroups(
            &bucket_lengths,
            None,
            ordering,
            residuals,
            grouper,
            |ord, res, g| refine_bucket(ord, res, shift, g),
        );
    } else if let Some(g) = grouper {
        for &len in &bucket_lengths {
            if len > 0 {
                g.push(len);
            }
        }
    }
}

fn push_key_runs<I: Ordinal, K: UInt>(keys: &[K], grouper: Option<&mut Grouper<'_, I>>) {
    if let Some(g) = grouper {
        g.push_from_predicate(keys.len(), |i| keys[i - 1] != keys[i]);
    }
}

impl<C: KeyCodec> SingleSorter for ColumnSorter<'_, C> {
    fn nrows(&self) -> usize {
        self.column.nrows()
    }

    fn sort_u32(&self, find_groups: bool) -> (Vec<u32>, Option<Vec<u32>>) {
        self.sort_typed::<u32>(find_groups)
    }

    fn sort_u64(&self, find_groups: bool) -> (Vec<u64>, Option<Vec<u64>>) {
        self.sort_typed::<u64>(find_groups)
    }

    fn compare_rows(&self, i: usize, j: usize) -> Ordering {
        self.compare(i, j)
    }
}
