//! Unsigned fixed-point arithmetic with 96 fractional bits.
//!
//! Values live in a `U256` and are bounded only by the 24-byte serialized
//! form; every intermediate product is formed in `U512` before the final
//! shift or division, so no precision is lost inside an operation.

use crate::{
    constants::{MAX_NUM_BYTES_Q96, ONE_Q96},
    error::DexError,
};
use alloy_primitives::{U256, U512};
use derive_more::Deref;

/// A non-negative fixed-point number interpreted as `raw / 2^96`.
#[derive(Clone, Copy, Debug, Default, Deref, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Q96(U256);

const SHIFT: usize = 96;

impl Q96 {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(ONE_Q96);

    /// Wraps a raw `U256` already scaled by `2^96`.
    #[inline]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Converts a plain integer into its Q96 representation.
    #[inline]
    pub fn from_int(value: u128) -> Self {
        Self(U256::from(value) << SHIFT)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn add(self, rhs: Self) -> Result<Self, DexError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(DexError::ArithmeticOverflow)
    }

    #[inline]
    pub fn sub(self, rhs: Self) -> Result<Self, DexError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(DexError::ArithmeticOverflow)
    }

    /// `(a * b) >> 96`, truncating.
    #[inline]
    pub fn mul(self, rhs: Self) -> Result<Self, DexError> {
        let wide = U512::from(self.0) * U512::from(rhs.0);
        narrow(wide >> SHIFT)
    }

    /// `(a << 96) / b`, truncating.
    #[inline]
    pub fn div(self, rhs: Self) -> Result<Self, DexError> {
        if rhs.0.is_zero() {
            return Err(DexError::DivisionByZero);
        }
        let wide = U512::from(self.0) << SHIFT;
        narrow(wide / U512::from(rhs.0))
    }

    /// `(a << 96) / b`, rounding the quotient up.
    #[inline]
    pub fn div_round_up(self, rhs: Self) -> Result<Self, DexError> {
        if rhs.0.is_zero() {
            return Err(DexError::DivisionByZero);
        }
        let rhs = U512::from(rhs.0);
        let wide = U512::from(self.0) << SHIFT;
        let quotient = wide / rhs;
        if quotient * rhs == wide {
            narrow(quotient)
        } else {
            narrow(quotient + U512::from(1_u8))
        }
    }

    /// Fused `a * b / c`, truncating. The full 512-bit product is divided
    /// directly, so nothing is lost to an intermediate `>> 96`.
    #[inline]
    pub fn mul_div(self, mul: Self, div: Self) -> Result<Self, DexError> {
        if div.0.is_zero() {
            return Err(DexError::DivisionByZero);
        }
        let numerator = U512::from(self.0) * U512::from(mul.0);
        narrow(numerator / U512::from(div.0))
    }

    /// [`Self::mul_div`] rounding the quotient up.
    #[inline]
    pub fn mul_div_round_up(self, mul: Self, div: Self) -> Result<Self, DexError> {
        if div.0.is_zero() {
            return Err(DexError::DivisionByZero);
        }
        let div = U512::from(div.0);
        let numerator = U512::from(self.0) * U512::from(mul.0);
        let quotient = numerator / div;
        if quotient * div == numerator {
            narrow(quotient)
        } else {
            narrow(quotient + U512::from(1_u8))
        }
    }

    /// `(2^96 << 96) / a`, the multiplicative inverse.
    #[inline]
    pub fn invert(self) -> Result<Self, DexError> {
        Self::ONE.div(self)
    }

    /// Extracts the integer part, discarding the fraction.
    #[inline]
    pub fn round_down(self) -> u128 {
        (self.0 >> SHIFT).saturating_to()
    }

    /// Extracts the integer part, adding 1 iff the fraction is non-zero.
    #[inline]
    pub fn round_up(self) -> u128 {
        let floor = self.0 >> SHIFT;
        let fraction = self.0 & (ONE_Q96 - U256::from(1_u8));
        if fraction.is_zero() {
            floor.saturating_to()
        } else {
            (floor + U256::from(1_u8)).saturating_to()
        }
    }

    /// Serializes to the minimal big-endian byte string; the empty string
    /// denotes zero.
    pub fn to_bytes(self) -> Result<Vec<u8>, DexError> {
        let bytes = self.0.to_be_bytes_trimmed_vec();
        if bytes.len() > MAX_NUM_BYTES_Q96 {
            return Err(DexError::ArithmeticOverflow);
        }
        Ok(bytes)
    }

    /// Deserializes a big-endian byte string of at most 24 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DexError> {
        if bytes.len() > MAX_NUM_BYTES_Q96 {
            return Err(DexError::ArithmeticOverflow);
        }
        U256::try_from_be_slice(bytes)
            .map(Self)
            .ok_or(DexError::ArithmeticOverflow)
    }
}

#[inline]
fn narrow(wide: U512) -> Result<Q96, DexError> {
    let limbs = wide.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return Err(DexError::ArithmeticOverflow);
    }
    Ok(Q96(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]])))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn byte_codec_round_trips(low: u64, mid: u64, high: u64) {
            let raw = (U256::from(high) << 128) | (U256::from(mid) << 64) | U256::from(low);
            let value = Q96::from_raw(raw);
            let bytes = value.to_bytes().unwrap();
            prop_assert!(bytes.len() <= crate::constants::MAX_NUM_BYTES_Q96);
            prop_assert_eq!(Q96::from_bytes(&bytes).unwrap(), value);
        }

        #[test]
        fn round_up_exceeds_round_down_by_fraction(value: u64, divisor in 1_u64..) {
            let q = Q96::from_int(value as u128).div(Q96::from_int(divisor as u128)).unwrap();
            let down = q.round_down();
            let up = q.round_up();
            prop_assert!(up == down || up == down + 1);
            prop_assert_eq!(up == down, value % divisor == 0);
        }
    }
}
