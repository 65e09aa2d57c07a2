#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::stats::ColumnStats;
use crate::types::{Element, SType};
use std::sync::Arc;

/// An immutable typed column: a value buffer plus a validity bitmap.
///
/// Columns are frozen at construction; reads take `&self` and are safe to
/// issue concurrently for different (or the same) rows, which the sort core
/// relies on during its parallel phases.
#[derive(Clone, Debug)]
pub struct PrimitiveColumn<T: Element> {
    values: Vec<T>,
    validity: BitVec,
    stats: ColumnStats<T>,
}

impl<T: Element + Default> PrimitiveColumn<T> {
    pub fn from_values<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let items = items.into_iter();
        let (lo, _) = items.size_hint();
        let mut values = Vec::with_capacity(lo);
        let mut validity = BitVec::with_capacity_bits(lo);

        for item in items {
            match item {
                Some(v) => {
                    values.push(v);
                    validity.push(true);
                }
                None => {
                    // The slot still needs a payload so rows stay aligned.
                    values.push(T::default());
                    validity.push(false);
                }
            }
        }

        let stats = ColumnStats::compute(&values, &validity);
        Self {
            values,
            validity,
            stats,
        }
    }
}

impl<T: Element> PrimitiveColumn<T> {
    pub fn from_parts(values: Vec<T>, validity: BitVec) -> Self {
        assert_eq!(
            values.len(),
            validity.len(),
            "column values/validity length mismatch"
        );
        let stats = ColumnStats::compute(&values, &validity);
        Self {
            values,
            validity,
            stats,
        }
    }

    pub fn nrows(&self) -> usize {
        self.values.len()
    }

    /// Element read: `(value, is_valid)`.
    ///
    /// A float NaN reads as invalid even when its validity bit is set, so
    /// every consumer sees one definition of NA.
    pub fn get(&self, row: usize) -> (T, bool) {
        debug_assert!(row < self.values.len(), "column row out of bounds");
        let v = self.values[row];
        (v, self.validity.get(row) && !v.is_na_value())
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn stats(&self) -> &ColumnStats<T> {
        &self.stats
    }
}

/// String column: present in storage, unsupported by the sort core.
#[derive(Clone, Debug)]
pub struct StrColumn {
    values: Vec<Arc<str>>,
    validity: BitVec,
}

impl StrColumn {
    pub fn from_values<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Option<Arc<str>>>,
    {
        let mut values = Vec::new();
        let mut validity = BitVec::new();
        for item in items {
            match item {
                Some(s) => {
                    values.push(s);
                    validity.push(true);
                }
                None => {
                    values.push(Arc::<str>::from(""));
                    validity.push(false);
                }
            }
        }
        Self { values, validity }
    }

    pub fn nrows(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, row: usize) -> (&str, bool) {
        debug_assert!(row < self.values.len(), "column row out of bounds");
        (&self.values[row], self.validity.get(row))
    }
}

/// A column of any supported storage type.
#[derive(Clone, Debug)]
pub enum Column {
    Bool(PrimitiveColumn<bool>),
    Int8(PrimitiveColumn<i8>),
    Int16(PrimitiveColumn<i16>),
    Int32(PrimitiveColumn<i32>),
    Int64(PrimitiveColumn<i64>),
    Float32(PrimitiveColumn<f32>),
    Float64(PrimitiveColumn<f64>),
    Str(StrColumn),
}

impl Column {
    pub fn nrows(&self) -> usize {
        match self {
            Column::Bool(c) => c.nrows(),
            Column::Int8(c) => c.nrows(),
            Column::Int16(c) => c.nrows(),
            Column::Int32(c) => c.nrows(),
            Column::Int64(c) => c.nrows(),
            Column::Float32(c) => c.nrows(),
            Column::Float64(c) => c.nrows(),
            Column::Str(c) => c.nrows(),
        }
    }

    pub fn stype(&self) -> SType {
        match self {
            Column::Bool(_) => SType::Bool,
            Column::Int8(_) => SType::Int8,
            Column::Int16(_) => SType::Int16,
            Column::Int32(_) => SType::Int32,
            Column::Int64(_) => SType::Int64,
            Column::Float32(_) => SType::Float32,
            Column::Float64(_) => SType::Float64,
            Column::Str(_) => SType::Str,
        }
    }

    pub fn bools<I: IntoIterator<Item = Option<bool>>>(items: I) -> Self {
        Column::Bool(PrimitiveColumn::from_values(items))
    }

    pub fn int8s<I: IntoIterator<Item = Option<i8>>>(items: I) -> Self {
        Column::Int8(PrimitiveColumn::from_values(items))
    }

    pub fn int16s<I: IntoIterator<Item = Option<i16>>>(items: I) -> Self {
        Column::Int16(PrimitiveColumn::from_values(items))
    }

    pub fn int32s<I: IntoIterator<Item = Option<i32>>>(items: I) -> Self {
        Column::Int32(PrimitiveColumn::from_values(items))
    }

    pub fn int64s<I: IntoIterator<Item = Option<i64>>>(items: I) -> Self {
        Column::Int64(PrimitiveColumn::from_values(items))
    }

    pub fn float32s<I: IntoIterator<Item = Option<f32>>>(items: I) -> Self {
        Column::Float32(PrimitiveColumn::from_values(items))
    }

    pub fn float64s<I: IntoIterator<Item = Option<f64>>>(items: I) -> Self {
        Column::Float64(PrimitiveColumn::from_values(items))
    }

    pub fn strs<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<Arc<str>>,
    {
        Column::Str(StrColumn::from_values(
            items.into_iter().map(|s| s.map(Into::into)),
        ))
    }
}
