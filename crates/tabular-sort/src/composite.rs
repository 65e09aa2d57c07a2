#![forbid(unsafe_code)]

use crate::grouper::Grouper;
use crate::output::Ordinal;
use crate::sorter::{SingleSorter, SortWidth};
use crate::view::ViewMut;
use std::cmp::Ordering;

/// Total order over several columns: the first column dominates, later
/// columns break ties.
///
/// The first column is sorted with grouping enabled and its groups become
/// the coarse partition; every group longer than one row is refined by the
/// next column's comparator, re-split on equality, and handed down the
/// remaining column list. A column's comparator therefore only ever runs
/// where all higher-priority columns compared equal.
pub(crate) fn composite_sort<'a, I: SortWidth>(
    sorters: &[Box<dyn SingleSorter + 'a>],
    find_groups: bool,
) -> (Vec<I>, Option<Vec<I>>) {
    debug_assert!(!sorters.is_empty(), "composite sort without columns");

    let n = sorters[0].nrows();
    let (mut ordering, coarse) = I::sort_column(sorters[0].as_ref(), true);
    let coarse = coarse.expect("grouping requested from first sorter");

    if sorters.len() == 1 {
        return (ordering, find_groups.then_some(coarse));
    }

    let mut group_buf = find_groups.then(|| vec![I::from_usize(0); n + 1]);
    let mut grouper = group_buf
        .as_mut()
        .map(|buf| Grouper::new(ViewMut::new(buf.as_mut_slice())));

    let tail = &sorters[1..];
    for w in coarse.windows(2) {
        let (start, end) = (w[0].to_usize(), w[1].to_usize());
        if end - start == 1 {
            if let Some(g) = grouper.as_mut() {
                g.push(1);
            }
        } else {
            refine_ties(tail, &mut ordering[start..end], grouper.as_mut());
        }
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

/// Refines one tie range: stable-sorts it by the head column's comparator
/// (rows here are equal on every earlier column, so stability preserves the
/// original relative order of full ties), then recurses into the runs that
/// are still tied.
fn refine_ties<'a, I: Ordinal>(
    sorters: &[Box<dyn SingleSorter + 'a>],
    ordering: &mut [I],
    mut grouper: Option<&mut Grouper<'_, I>>,
) {
    let head = sorters[0].as_ref();
    ordering.sort_by(|x, y| head.compare_rows(x.to_usize(), y.to_usize()));

    let n = ordering.len();
    let mut run_start = 0;
    for i in 1..=n {
        let boundary = i == n
            || head.compare_rows(ordering[i - 1].to_usize(), ordering[i].to_usize())
                != Ordering::Equal;
        if !boundary {
            continue;
        }
        let run = i - run_start;
        if run == 1 {
            if let Some(g) = grouper.as_deref_mut() {
                g.push(1);
            }
        } else if sorters.len() > 1 {
            refine_ties(
                &sorters[1..],
                &mut ordering[run_start..i],
                grouper.as_deref_mut(),
            );
        } else if let Some(g) = grouper.as_deref_mut() {
            g.push(run);
        }
        run_start = i;
    }
}
