//! Minimal columnar storage for the tabular engine.
//!
//! This crate carries only what the sort/grouping core consumes from its
//! storage collaborator:
//! - Typed, immutable column buffers with a validity bitmap.
//! - Per-column min/max/NA statistics, computed once at construction.
//! - Cheap `(value, is_valid)` element reads that are safe to issue
//!   concurrently from multiple threads (shared reads of frozen buffers).

#![forbid(unsafe_code)]

mod bitmap;
mod column;
mod stats;
mod types;

pub use crate::bitmap::BitVec;
pub use crate::column::{Column, PrimitiveColumn, StrColumn};
pub use crate::stats::ColumnStats;
pub use crate::types::{Element, SType};
