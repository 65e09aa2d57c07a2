//! Parallel radix-sort and grouping engine for the tabular engine.
//!
//! This crate orders the rows of one or several columns and, as a byproduct
//! of the same passes, partitions them into contiguous equal-key groups:
//! the primitive every groupby, join, and order-by operation builds on.
//!
//! Shape of the machinery:
//! - Order-preserving bit transforms map each scalar type (including signed
//!   ints, IEEE-754 floats, and NA slots) into unsigned radix keys, with
//!   key 0 reserved for NA.
//! - Small inputs take a stable comparison sort; large inputs take parallel
//!   histogram → cumulate → scatter radix passes with recursive refinement
//!   of buckets that still have significant key bits left.
//! - Group boundaries fall out of the bucket boundaries (radix path) or an
//!   equality predicate (comparison path) during the same pass.
//! - Multi-column sorts use the first column's grouping as a coarse
//!   partition and later columns' comparators as tie-breaks.
//!
//! Entry points: [`make_sorter`] / [`make_composite_sorter`], then
//! [`Sorter::sort`].

#![forbid(unsafe_code)]

mod codec;
mod composite;
pub mod constants;
mod error;
mod grouper;
mod output;
mod parallel;
mod radix;
mod smallsort;
mod sorter;
mod view;

pub use crate::codec::Direction;
pub use crate::error::SortError;
pub use crate::output::{OrdinalIter, OrdinalVec, SortResult};

use crate::codec::{
    BoolCodec, Float32Codec, Float64Codec, Int16Codec, Int32Codec, Int64Codec, Int8Codec,
};
use crate::constants::MAX_NROWS_U32;
use crate::sorter::{ColumnSorter, SingleSorter};
use tabular_columnar::{Column, SType};

/// A configured sorter over one column or a column list.
///
/// `sort` always returns an ordering (a permutation of `[0, nrows)`);
/// grouping is computed in the same passes and returned only when
/// `find_groups` is set.
pub trait Sorter {
    fn sort(&self, find_groups: bool) -> SortResult;
}

struct SingleColumnSorter<'a> {
    inner: Box<dyn SingleSorter + 'a>,
}

impl Sorter for SingleColumnSorter<'_> {
    fn sort(&self, find_groups: bool) -> SortResult {
        if self.inner.nrows() <= MAX_NROWS_U32 {
            let (order, groups) = self.inner.sort_u32(find_groups);
            SortResult {
                order: OrdinalVec::U32(order),
                groups: groups.map(OrdinalVec::U32),
            }
        } else {
            let (order, groups) = self.inner.sort_u64(find_groups);
            SortResult {
                order: OrdinalVec::U64(order),
                groups: groups.map(OrdinalVec::U64),
            }
        }
    }
}

struct CompositeSorter<'a> {
    sorters: Vec<Box<dyn SingleSorter + 'a>>,
}

impl Sorter for CompositeSorter<'_> {
    fn sort(&self, find_groups: bool) -> SortResult {
        if self.sorters[0].nrows() <= MAX_NROWS_U32 {
            let (order, groups) = composite::composite_sort::<u32>(&self.sorters, find_groups);
            SortResult {
                order: OrdinalVec::U32(order),
                groups: groups.map(OrdinalVec::U32),
            }
        } else {
            let (order, groups) = composite::composite_sort::<u64>(&self.sorters, find_groups);
            SortResult {
                order: OrdinalVec::U64(order),
                groups: groups.map(OrdinalVec::U64),
            }
        }
    }
}

fn single_sorter<'a>(
    column: &'a Column,
    direction: Direction,
) -> Result<Box<dyn SingleSorter + 'a>, SortError> {
    match column {
        Column::Bool(c) => Ok(Box::new(ColumnSorter::<BoolCodec>::new(c, direction))),
        Column::Int8(c) => Ok(Box::new(ColumnSorter::<Int8Codec>::new(c, direction))),
        Column::Int16(c) => Ok(Box::new(ColumnSorter::<Int16Codec>::new(c, direction))),
        Column::Int32(c) => Ok(Box::new(ColumnSorter::<Int32Codec>::new(c, direction))),
        Column::Int64(c) => Ok(Box::new(ColumnSorter::<Int64Codec>::new(c, direction))),
        Column::Float32(c) => Ok(Box::new(ColumnSorter::<Float32Codec>::new(c, direction))),
        Column::Float64(c) => Ok(Box::new(ColumnSorter::<Float64Codec>::new(c, direction))),
        Column::Str(_) => Err(SortError::UnsupportedType(SType::Str)),
    }
}

/// Builds a sorter over one column. Fails immediately on unsupported column
/// types; the sort itself cannot fail afterwards.
pub fn make_sorter(
    column: &Column,
    direction: Direction,
) -> Result<Box<dyn Sorter + '_>, SortError> {
    let inner = single_sorter(column, direction)?;
    Ok(Box::new(SingleColumnSorter { inner }))
}

/// Builds a sorter over a column list: the first column dominates, later
/// columns break ties. Every column may have its own direction.
pub fn make_composite_sorter<'a>(
    columns: &'a [Column],
    directions: &[Direction],
) -> Result<Box<dyn Sorter + 'a>, SortError> {
    if columns.is_empty() {
        return Err(SortError::NoColumns);
    }
    if columns.len() != directions.len() {
        return Err(SortError::DirectionCountMismatch {
            columns: columns.len(),
            directions: directions.len(),
        });
    }
    let first = columns[0].nrows();
    for column in &columns[1..] {
        if column.nrows() != first {
            return Err(SortError::RowCountMismatch {
                first,
                other: column.nrows(),
            });
        }
    }

    if let [column] = columns {
        return make_sorter(column, directions[0]);
    }

    let sorters = columns
        .iter()
        .zip(directions)
        .map(|(column, &direction)| single_sorter(column, direction))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Box::new(CompositeSorter { sorters }))
}
