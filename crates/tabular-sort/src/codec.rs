#![forbid(unsafe_code)]

use std::cmp::Ordering;
use tabular_columnar::Element;

/// Sort direction. NA values form one contiguous group placed first for
/// ascending sorts and last for descending ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Unsigned key primitive backing one column type's radix keys.
pub(crate) trait UInt:
    Copy + Ord + Default + Send + Sync + std::fmt::Debug + 'static
{
    const BITS: u32;

    fn as_u64(self) -> u64;
    fn from_u64(v: u64) -> Self;
}

macro_rules! impl_uint {
    ($($ty:ty),*) => {$(
        impl UInt for $ty {
            const BITS: u32 = <$ty>::BITS;

            fn as_u64(self) -> u64 {
                self as u64
            }

            fn from_u64(v: u64) -> Self {
                debug_assert!(
                    v <= <$ty>::MAX as u64,
                    "radix key {v} overflows {}-bit key type",
                    <$ty>::BITS
                );
                v as $ty
            }
        }
    )*};
}

impl_uint!(u8, u16, u32, u64);

/// Number of bits needed to represent `range` (0 for a constant column).
pub(crate) fn significant_bits(range: u64) -> u32 {
    64 - range.leading_zeros()
}

/// Column statistics folded into the key formula: keys are
/// `1 + (T(v) - T(min))` ascending and `1 + (T(max) - T(v))` descending,
/// so valid keys fill `[1, 2^nbits)` exactly and 0 stays reserved for NA.
#[derive(Clone, Copy, Debug)]
pub(crate) struct KeyBias {
    pub t_min: u64,
    pub t_max: u64,
    pub direction: Direction,
}

impl KeyBias {
    fn bias(&self, t: u64) -> u64 {
        match self.direction {
            Direction::Ascending => t - self.t_min,
            Direction::Descending => self.t_max - t,
        }
    }
}

/// Per-scalar-type key transforms and comparison.
///
/// Contract: `radix_key` and `compare` agree on the relative order of all
/// valid inputs (the property tests check this), and `radix_key` returns 0
/// exactly for NA elements.
pub(crate) trait KeyCodec {
    type Value: Element + Send + Sync;
    type Key: UInt;

    /// Order-preserving map of a valid value into the unsigned domain:
    /// `a < b` iff `transform(a) < transform(b)` for all valid values.
    fn transform(v: Self::Value) -> u64;

    fn radix_key(v: Self::Value, is_valid: bool, bias: &KeyBias) -> Self::Key {
        if !is_valid || v.is_na_value() {
            return Self::Key::from_u64(0);
        }
        Self::Key::from_u64(1 + bias.bias(Self::transform(v)))
    }

    fn compare(
        a: Self::Value,
        a_valid: bool,
        b: Self::Value,
        b_valid: bool,
        direction: Direction,
    ) -> Ordering {
        let a_valid = a_valid && !a.is_na_value();
        let b_valid = b_valid && !b.is_na_value();
        match (a_valid, b_valid) {
            (false, false) => Ordering::Equal,
            (false, true) => match direction {
                Direction::Ascending => Ordering::Less,
                Direction::Descending => Ordering::Greater,
            },
            (true, false) => match direction {
                Direction::Ascending => Ordering::Greater,
                Direction::Descending => Ordering::Less,
            },
            (true, true) => {
                let ord = Self::transform(a).cmp(&Self::transform(b));
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            }
        }
    }
}

// Key widths are one step wider than the element wherever the `1 + bias`
// encoding could otherwise wrap (a full-range int8 column has 256 distinct
// keys plus the NA slot). Floats keep their own width: the all-ones bit
// pattern is a NaN, so no valid float can ever claim key 0.

pub(crate) struct BoolCodec;

impl KeyCodec for BoolCodec {
    type Value = bool;
    type Key = u8;

    fn transform(v: bool) -> u64 {
        v as u64
    }
}

pub(crate) struct Int8Codec;

impl KeyCodec for Int8Codec {
    type Value = i8;
    type Key = u16;

    fn transform(v: i8) -> u64 {
        (v as u8 ^ 0x80) as u64
    }
}

pub(crate) struct Int16Codec;

impl KeyCodec for Int16Codec {
    type Value = i16;
    type Key = u32;

    fn transform(v: i16) -> u64 {
        (v as u16 ^ 0x8000) as u64
    }
}

pub(crate) struct Int32Codec;

impl KeyCodec for Int32Codec {
    type Value = i32;
    type Key = u64;

    fn transform(v: i32) -> u64 {
        (v as u32 ^ 0x8000_0000) as u64
    }
}

pub(crate) struct Int64Codec;

impl KeyCodec for Int64Codec {
    type Value = i64;
    type Key = u64;

    fn transform(v: i64) -> u64 {
        (v as u64) ^ (1u64 << 63)
    }
}

pub(crate) struct Float32Codec;

impl KeyCodec for Float32Codec {
    type Value = f32;
    type Key = u32;

    fn transform(v: f32) -> u64 {
        // -0.0 and 0.0 must share a key so they group as ties.
        let bits = (if v == 0.0 { 0.0f32 } else { v }).to_bits();
        let t = if bits >> 31 == 1 {
            !bits
        } else {
            bits | (1u32 << 31)
        };
        t as u64
    }
}

pub(crate) struct Float64Codec;

impl KeyCodec for Float64Codec {
    type Value = f64;
    type Key = u64;

    fn transform(v: f64) -> u64 {
        let bits = (if v == 0.0 { 0.0f64 } else { v }).to_bits();
        if bits >> 63 == 1 {
            !bits
        } else {
            bits | (1u64 << 63)
        }
    }
}
