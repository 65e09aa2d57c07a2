#![forbid(unsafe_code)]

use crate::codec::UInt;
use crate::constants::MIN_ROWS_PER_CHUNK;
use crate::grouper::Grouper;
use crate::output::Ordinal;
use crate::parallel;
use crate::view::ViewMut;
use std::ops::Range;

/// Shape of one radix pass: how many buckets, and how the row range is
/// partitioned across workers.
///
/// `n_radixes` is `2^bits + 1`; slot 0 is the reserved NA bucket at the top
/// level and simply stays empty in recursive sub-passes.
pub(crate) struct RadixPass {
    pub nrows: usize,
    pub n_radixes: usize,
    pub n_chunks: usize,
    pub rows_per_chunk: usize,
}

impl RadixPass {
    pub fn new(nrows: usize, n_radix_bits: u32, allow_parallel: bool) -> Self {
        debug_assert!(nrows > 0, "radix pass over empty input");
        debug_assert!(n_radix_bits <= 20, "radix width too large");

        let n_radixes = (1usize << n_radix_bits) + 1;
        let n_chunks = if !allow_parallel || nrows < MIN_ROWS_PER_CHUNK {
            1
        } else {
            parallel::pool_threads()
                .min(nrows.div_ceil(MIN_ROWS_PER_CHUNK))
                .max(1)
        };
        let rows_per_chunk = nrows.div_ceil(n_chunks);

        Self {
            nrows,
            n_radixes,
            n_chunks,
            rows_per_chunk,
        }
    }

    fn chunk_range(&self, chunk: usize) -> Range<usize> {
        let start = chunk * self.rows_per_chunk;
        let end = ((chunk + 1) * self.rows_per_chunk).min(self.nrows);
        start..end
    }
}

struct ChunkWork<'v, I, K> {
    range: Range<usize>,
    ord_segs: Vec<ViewMut<'v, I>>,
    res_segs: Option<Vec<ViewMut<'v, K>>>,
    cursors: Vec<usize>,
}

/// One histogram → cumulate → scatter pass.
///
/// `radix_of`/`residual_of` take a logical position `p` in `[0, nrows)`:
/// the key buffers handed in by the caller are aligned with positions, and
/// the row written to the output is `ordering_in[p]` (or `p` itself at the
/// top level). Returns per-bucket lengths in physical (output) order.
///
/// Phases:
/// 1. parallel per-chunk histograms: each chunk owns a private counter
///    array, so there is no shared mutable state;
/// 2. sequential radix-major cumulate: every chunk's write offsets depend
///    on every other chunk's counts, so this step cannot be split;
/// 3. parallel scatter: the output buffers are carved into disjoint
///    per-(chunk, radix) segments in offset order and each chunk writes its
///    rows (and their residual keys) into its own segments. Correctness
///    rests on the partitioning, not on synchronization, and the result is
///    deterministic for a given input and chunk count. A panic inside a
///    chunk is captured by the pool and resurfaces after the join.
///
/// `na_bucket_last` moves bucket 0 to the back of the output, which is how
/// descending sorts place the NA group last without any branch in the
/// scatter loop.
pub(crate) fn scatter<I, K, R, S>(
    pass: &RadixPass,
    ordering_in: Option<&[I]>,
    ordering_out: &mut [I],
    radix_of: &R,
    residual_of: &S,
    mut residual_out: Option<&mut [K]>,
    na_bucket_last: bool,
) -> Vec<usize>
where
    I: Ordinal,
    K: UInt,
    R: Fn(usize) -> usize + Sync,
    S: Fn(usize) -> K + Sync,
{
    debug_assert_eq!(ordering_out.len(), pass.nrows, "ordering buffer size");
    if let Some(o) = ordering_in {
        debug_assert_eq!(o.len(), pass.nrows, "input ordering size");
    }
    if let Some(r) = &residual_out {
        debug_assert_eq!(r.len(), pass.nrows, "residual buffer size");
    }

    let histograms: Vec<Vec<usize>> = parallel::map_chunks(pass.n_chunks, |c| {
        let mut counts = vec![0usize; pass.n_radixes];
        for p in pass.chunk_range(c) {
            let r = radix_of(p);
            debug_assert!(r < pass.n_radixes, "radix out of range");
            counts[r] += 1;
        }
        counts
    });

    let bucket_order: Vec<usize> = if na_bucket_last {
        (1..pass.n_radixes).chain(std::iter::once(0)).collect()
    } else {
        (0..pass.n_radixes).collect()
    };

    let mut bucket_lengths = vec![0usize; pass.n_radixes];
    let mut offset = 0usize;

    let mut works: Vec<ChunkWork<'_, I, K>> = (0..pass.n_chunks)
        .map(|c| ChunkWork {
            range: pass.chunk_range(c),
            ord_segs: (0..pass.n_radixes).map(|_| ViewMut::empty()).collect(),
            res_segs: residual_out
                .as_ref()
                .map(|_| (0..pass.n_radixes).map(|_| ViewMut::empty()).collect()),
            cursors: vec![0usize; pass.n_radixes],
        })
        .collect();

    // Cumulate and carve in one radix-major walk: the running offset is the
    // prefix sum, and splitting the output views at each (chunk, radix)
    // count hands every chunk exactly the ranges it will fill.
    let mut ord_rest = ViewMut::new(ordering_out);
    let mut res_rest = residual_out.as_deref_mut().map(ViewMut::new);
    for (slot, &r) in bucket_order.iter().enumerate() {
        let bucket_start = offset;
        for (c, work) in works.iter_mut().enumerate() {
            let len = histograms[c][r];
            let (seg, tail) = ord_rest.split_at(len);
            work.ord_segs[r] = seg;
            ord_rest = tail;
            if let Some(rest) = res_rest.take() {
                let (seg, tail) = rest.split_at(len);
                if let Some(segs) = work.res_segs.as_mut() {
                    segs[r] = seg;
                }
                res_rest = Some(tail);
            }
            offset += len;
        }
        bucket_lengths[slot] = offset - bucket_start;
    }
    debug_assert_eq!(offset, pass.nrows, "histogram does not cover all rows");

    parallel::for_each_chunk(works, |mut work| {
        for p in work.range.clone() {
            let r = radix_of(p);
            let slot = work.cursors[r];
            let row = match ordering_in {
                Some(o) => o[p],
                None => I::from_usize(p),
            };
            work.ord_segs[r].set(slot, row);
            if let Some(segs) = work.res_segs.as_mut() {
                segs[r].set(slot, residual_of(p));
            }
            work.cursors[r] = slot + 1;
        }
    });

    bucket_lengths
}

/// Walks the buckets of a finished pass in physical order. Empty buckets are
/// skipped; the NA bucket and singletons become one group each; every other
/// bucket is handed to `subsort` together with its residual-key slice and
/// the grouper.
pub(crate) fn sort_subgroups<I, K, F>(
    bucket_lengths: &[usize],
    na_bucket: Option<usize>,
    ordering: &mut [I],
    residuals: &mut [K],
    mut grouper: Option<&mut Grouper<'_, I>>,
    mut subsort: F,
) where
    I: Ordinal,
    K: UInt,
    F: FnMut(&mut [I], &mut [K], Option<&mut Grouper<'_, I>>),
{
    debug_assert_eq!(ordering.len(), residuals.len(), "bucket buffers misaligned");

    let mut offset = 0usize;
    for (slot, &len) in bucket_lengths.iter().enumerate() {
        if len == 0 {
            continue;
        }
        if Some(slot) == na_bucket || len == 1 {
            if let Some(g) = grouper.as_deref_mut() {
                g.push(len);
            }
        } else {
            subsort(
                &mut ordering[offset..offset + len],
                &mut residuals[offset..offset + len],
                grouper.as_deref_mut(),
            );
        }
        offset += len;
    }
    debug_assert_eq!(offset, ordering.len(), "buckets do not cover the slice");
}
