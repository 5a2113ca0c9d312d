// SPDX-License-Identifier: Apache-2.0
//! Deterministic Q48.16 fixed-point scalar kernel.
//!
//! Every quantity the compiler touches is a `Q`: an `i64` storing an integer
//! scaled by `2^16` (`real_value = raw / 65536`). All arithmetic is integer,
//! so results are bit-identical across platforms. Multiplication rounds to
//! nearest with ties-to-even at the Q48.16 boundary; addition and subtraction
//! saturate instead of wrapping.

/// Number of fractional bits in the Q48.16 encoding.
pub const FRAC_BITS: u32 = 16;

/// Q48.16 fixed-point scalar.
#[repr(transparent)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Q(i64);

impl Q {
    /// The additive identity.
    pub const ZERO: Self = Self(0);
    /// The raw value corresponding to `1.0`.
    pub const ONE: Self = Self(1_i64 << FRAC_BITS);

    /// Construct from an integer value (`n << 16`), saturating at the raw range.
    #[must_use]
    pub fn from_int(n: i64) -> Self {
        Self(n.saturating_mul(1_i64 << FRAC_BITS))
    }

    /// Construct directly from raw Q48.16 bits.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Return the raw Q48.16 representation.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Absolute value, saturating on `i64::MIN`.
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn min(self, rhs: Self) -> Self {
        Self(self.0.min(rhs.0))
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn max(self, rhs: Self) -> Self {
        Self(self.0.max(rhs.0))
    }

    /// Halve toward zero (raw integer division by two).
    ///
    /// Matches the extent math used for carrier half-widths, which truncates.
    #[must_use]
    pub fn halve(self) -> Self {
        Self(self.0 / 2)
    }

    /// Fixed-point multiply with round-to-nearest, ties-to-even.
    ///
    /// The 128-bit product is shifted down by [`FRAC_BITS`] with the same
    /// rounding rule at every call site, then saturated back to `i64`.
    #[must_use]
    pub fn mul(self, rhs: Self) -> Self {
        let wide = i128::from(self.0) * i128::from(rhs.0);
        Self(saturate_i128(round_shift_right_i128(wide, FRAC_BITS)))
    }

    /// True when the raw value is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl std::ops::Add for Q {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Q {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Neg for Q {
    type Output = Self;
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

/// Round-to-nearest, ties-to-even shift used by [`Q::mul`].
fn round_shift_right_i128(value: i128, shift: u32) -> i128 {
    if shift == 0 {
        return value;
    }
    let q = value >> shift;
    let mask = (1_i128 << shift) - 1;
    let r = value & mask;
    let half = 1_i128 << (shift - 1);

    if r > half {
        q + 1
    } else if r < half {
        q
    } else if (q & 1) == 1 {
        q + 1
    } else {
        q
    }
}

fn saturate_i128(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Mathematical floor division: `floor(a / d)` for integer operands.
///
/// Chunk coordinates depend on this (`-0.5` chunks to `-1`, not `0`).
/// `d == 0` yields `0`, matching the defensive contract of the chunk grid.
#[must_use]
pub fn floor_div(a: i64, d: i64) -> i64 {
    if d == 0 {
        return 0;
    }
    let q = a / d;
    let r = a % d;
    if r != 0 && (r < 0) != (d < 0) {
        q - 1
    } else {
        q
    }
}

/// Saturating narrowing from `i64` to `i32`.
#[must_use]
pub fn clamp_i64_i32(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn one_is_shifted_unit() {
        assert_eq!(Q::ONE.raw(), 65536);
        assert_eq!(Q::from_int(10).raw(), 10 << 16);
        assert_eq!(Q::from_int(-3).raw(), -(3 << 16));
    }

    #[test]
    fn mul_rounds_ties_to_even() {
        // 0.5 * 0.000015... lands exactly on a half-ulp boundary.
        let half = Q::from_raw(1 << 15);
        assert_eq!(half.mul(Q::from_raw(1)).raw(), 0); // 0.5 ulp ties to even 0
        assert_eq!(half.mul(Q::from_raw(3)).raw(), 2); // 1.5 ulp ties to even 2
        assert_eq!(half.mul(Q::from_raw(5)).raw(), 2); // 2.5 ulp ties to even 2
        assert_eq!(Q::from_int(3).mul(Q::from_int(4)), Q::from_int(12));
        assert_eq!(Q::from_int(-3).mul(Q::from_int(4)), Q::from_int(-12));
    }

    #[test]
    fn floor_div_floors_negatives() {
        assert_eq!(floor_div(-1, 2), -1);
        assert_eq!(floor_div(1, 2), 0);
        assert_eq!(floor_div(-4, 2), -2);
        assert_eq!(floor_div(-5, 2), -3);
        assert_eq!(floor_div(5, 2), 2);
        assert_eq!(floor_div(7, 0), 0);
    }

    #[test]
    fn clamp_saturates_at_i32_range() {
        assert_eq!(clamp_i64_i32(i64::MAX), i32::MAX);
        assert_eq!(clamp_i64_i32(i64::MIN), i32::MIN);
        assert_eq!(clamp_i64_i32(-7), -7);
    }

    #[test]
    fn add_sub_saturate() {
        assert_eq!((Q::from_raw(i64::MAX) + Q::ONE).raw(), i64::MAX);
        assert_eq!((Q::from_raw(i64::MIN) - Q::ONE).raw(), i64::MIN);
    }
}
