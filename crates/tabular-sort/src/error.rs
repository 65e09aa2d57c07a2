#![forbid(unsafe_code)]

use tabular_columnar::SType;
use thiserror::Error;

/// Validation errors reported by the sorter factory.
///
/// These are the only recoverable errors in the crate: once a sorter is
/// built, sorting itself cannot fail. Internal invariant violations are
/// debug assertions, not error values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortError {
    #[error("sorting is not supported for {0} columns")]
    UnsupportedType(SType),
    #[error("no sort columns given")]
    NoColumns,
    #[error("got {columns} sort columns but {directions} directions")]
    DirectionCountMismatch { columns: usize, directions: usize },
    #[error("sort columns must have equal row counts: {first} vs {other}")]
    RowCountMismatch { first: usize, other: usize },
}
