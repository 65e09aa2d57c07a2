#![forbid(unsafe_code)]

//! Tuning constants for the sort engine.
//!
//! None of these are load-bearing for correctness; the threshold tests
//! exercise sizes at and around each boundary.

/// Below this row count a plain insertion sort wins over everything else.
pub const INSERTION_SORT_NROWS: usize = 16;

/// Below this row count the engine uses a stable comparison sort instead of
/// setting up radix passes.
pub const COMPARISON_SORT_NROWS: usize = 256;

/// Minimum rows per worker chunk; fewer rows than this and a phase runs on a
/// single chunk regardless of pool size.
pub const MIN_ROWS_PER_CHUNK: usize = 1024;

/// Radix bits consumed per pass.
pub const MAX_RADIX_BITS: u32 = 8;

/// Largest row count representable with 32-bit ordinals; larger tables use
/// 64-bit orderings.
pub const MAX_NROWS_U32: usize = (1 << 31) - 1;
