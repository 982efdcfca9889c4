//! Conversion between integer ticks and Q96 square-root prices.
//!
//! A tick `t` maps to `sqrt(1.0001)^t`, so one tick is roughly a basis
//! point of price. The conversion decomposes `|t|` into bits and multiplies
//! precomputed per-bit factors; the inverse greedily reconstructs the bits
//! from the highest down. Tie-breaking (`>=` against the target) is part of
//! the contract: it must not drift, or previously stored prices would map to
//! different ticks.

use crate::{
    constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, TICK_BITS},
    error::DexError,
    math::Q96,
};
use alloy_primitives::{uint, U256};

/// `SQRT_RATIO_FOR_BIT[i] = floor(2^96 / sqrt(1.0001)^(2^i))`.
///
/// The table covers the negative-tick direction; positive ticks invert the
/// accumulated product.
const SQRT_RATIO_FOR_BIT: [U256; TICK_BITS] = [
    uint!(0xfffcb933bd6fad37aa2d162d_U256),
    uint!(0xfff97272373d413259a46990_U256),
    uint!(0xfff2e50f5f656932ef12357c_U256),
    uint!(0xffe5caca7e10e4e61c3624ea_U256),
    uint!(0xffcb9843d60f6159c9db5883_U256),
    uint!(0xff973b41fa98c081472e6896_U256),
    uint!(0xff2ea16466c96a3843ec78b3_U256),
    uint!(0xfe5dee046a99a2a811c461f1_U256),
    uint!(0xfcbe86c7900a88aedcffc83b_U256),
    uint!(0xf987a7253ac413176f2b074c_U256),
    uint!(0xf3392b0822b70005940c7a39_U256),
    uint!(0xe7159475a2c29b7443b29c7f_U256),
    uint!(0xd097f3bdfd2022b8845ad8f7_U256),
    uint!(0xa9f746462d870fdf8a65dc1f_U256),
    uint!(0x70d869a156d2a1b890bb3df6_U256),
    uint!(0x31be135f97d08fd981231505_U256),
    uint!(0x9aa508b5b7a84e1c677de54_U256),
    uint!(0x5d6af8dedb81196699c329_U256),
    uint!(0x2216e584f5fa1ea92604_U256),
    uint!(0x48a170391f7dc42_U256),
];

/// Returns the Q96 square-root price at the given tick.
///
/// Fails with [`DexError::InvalidTickRange`] for ticks outside
/// `[MIN_TICK, MAX_TICK]`.
pub fn tick_to_price(tick: i32) -> Result<Q96, DexError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(DexError::InvalidTickRange);
    }
    let abs_tick = tick.unsigned_abs();
    let mut price = Q96::ONE;
    for (bit, factor) in SQRT_RATIO_FOR_BIT.iter().enumerate() {
        if abs_tick & (1 << bit) != 0 {
            price = price.mul(Q96::from_raw(*factor))?;
        }
    }
    if tick > 0 {
        price = price.invert()?;
    }
    Ok(price)
}

/// Returns the largest tick whose price does not exceed `sqrt_price`.
///
/// The reconstruction scans bit positions from high to low, accepting a bit
/// whenever the running product stays at or above the (possibly inverted)
/// target, then corrects the single rounding edge case where the
/// reconstructed tick's own price still exceeds the input.
pub fn price_to_tick(sqrt_price: Q96) -> Result<i32, DexError> {
    if *sqrt_price < MIN_SQRT_RATIO || *sqrt_price > MAX_SQRT_RATIO {
        return Err(DexError::InvalidParameters);
    }

    let inverted = sqrt_price > tick_to_price(1)?;
    let target = if inverted {
        sqrt_price.invert()?
    } else {
        sqrt_price
    };

    let mut estimate = Q96::ONE;
    let mut abs_tick: u32 = 0;
    for bit in (0..TICK_BITS).rev() {
        let candidate = estimate.mul(Q96::from_raw(SQRT_RATIO_FOR_BIT[bit]))?;
        if candidate >= target {
            estimate = candidate;
            abs_tick |= 1 << bit;
        }
    }

    let mut tick = if inverted {
        abs_tick as i32
    } else {
        -(abs_tick as i32)
    };
    if tick_to_price(tick)? > sqrt_price {
        tick -= 1;
    }
    Ok(tick)
}

/// The exact floor tick of a price: the largest tick `t` with
/// `tick_to_price(t) <= sqrt_price`.
///
/// [`price_to_tick`] keeps the historically pinned reconstruction, which may
/// undershoot the floor by one on inverted inputs; state bookkeeping that
/// decides which side of a tick the price sits on needs the exact floor.
pub(crate) fn floor_tick(sqrt_price: Q96) -> Result<i32, DexError> {
    let mut tick = price_to_tick(sqrt_price)?;
    while tick < MAX_TICK && tick_to_price(tick + 1)? <= sqrt_price {
        tick += 1;
    }
    Ok(tick)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::uint;

    #[test]
    fn fails_for_tick_below_min() {
        assert_eq!(
            tick_to_price(MIN_TICK - 1).unwrap_err(),
            DexError::InvalidTickRange
        );
    }

    #[test]
    fn fails_for_tick_above_max() {
        assert_eq!(
            tick_to_price(MAX_TICK + 1).unwrap_err(),
            DexError::InvalidTickRange
        );
    }

    #[test]
    fn tick_zero_is_unit_price() {
        assert_eq!(tick_to_price(0).unwrap(), Q96::ONE);
    }

    #[test]
    fn bounds_match_extreme_ticks() {
        assert_eq!(*tick_to_price(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(*tick_to_price(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
    }

    #[test]
    fn known_positive_tick() {
        assert_eq!(
            tick_to_price(314).unwrap(),
            Q96::from_raw(uint!(80481797268557086721408463874_U256))
        );
    }

    #[test]
    fn known_price_reconstruction() {
        let price = Q96::from_raw(uint!(248776430294790029895352188928_U256));
        assert_eq!(price_to_tick(price).unwrap(), 22885);
    }

    #[test]
    fn strictly_increasing_around_zero() {
        let mut previous = tick_to_price(-64).unwrap();
        for tick in -63..=64 {
            let price = tick_to_price(tick).unwrap();
            assert!(price > previous, "not increasing at tick {tick}");
            previous = price;
        }
    }

    #[test]
    fn odd_symmetry_in_sign() {
        for tick in [1, 7, 314, 5000, 887271] {
            let up = tick_to_price(tick).unwrap();
            let down = tick_to_price(-tick).unwrap();
            // price(-t) == 1 / price(t) up to inversion truncation
            let product = up.mul(down).unwrap();
            assert!(product <= Q96::ONE);
            assert!(*product >= *Q96::ONE - *Q96::ONE / alloy_primitives::U256::from(1_000_000_000_u64));
        }
    }

    #[test]
    fn reconstruction_never_overshoots() {
        for tick in [-887272, -22885, -314, -1, 0, 1, 314, 22885, 887272] {
            let price = tick_to_price(tick).unwrap();
            let reconstructed = price_to_tick(price).unwrap();
            assert!(tick_to_price(reconstructed).unwrap() <= price);
            assert!(reconstructed == tick || reconstructed == tick - 1);
        }
    }

    #[test]
    fn negative_ticks_round_trip_exactly() {
        for tick in [-887272, -100000, -22885, -314, -2, -1, 0] {
            assert_eq!(price_to_tick(tick_to_price(tick).unwrap()).unwrap(), tick);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reconstruction_stays_within_one_tick(tick in MIN_TICK..=MAX_TICK) {
            let price = tick_to_price(tick).unwrap();
            let reconstructed = price_to_tick(price).unwrap();
            prop_assert!(reconstructed == tick || reconstructed == tick - 1);
            prop_assert!(tick_to_price(reconstructed).unwrap() <= price);
        }

        #[test]
        fn floor_tick_brackets_the_price(tick in MIN_TICK..MAX_TICK) {
            let price = tick_to_price(tick).unwrap();
            let floor = floor_tick(price).unwrap();
            prop_assert_eq!(floor, tick);
            prop_assert!(tick_to_price(floor + 1).unwrap() > price);
        }

        #[test]
        fn strictly_increasing(tick in MIN_TICK..MAX_TICK) {
            prop_assert!(tick_to_price(tick + 1).unwrap() > tick_to_price(tick).unwrap());
        }
    }
}
