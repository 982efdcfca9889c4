use crate::{
    constants::{MAX_SQRT_RATIO, MIN_SQRT_RATIO},
    entities::{write_q96, ByteReader},
    error::DexError,
    math::{floor_tick, Q96},
};

/// A liquidity pool for one ordered token pair and fee tier.
///
/// The record holds only state that changes under trading; the pair and fee
/// tier live in the pool's key. Growth accumulators are monotonically
/// non-decreasing over the pool's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    /// Liquidity active at the current price.
    pub liquidity: u64,
    /// Current sqrt price, within `[MIN_SQRT_RATIO, MAX_SQRT_RATIO]`.
    pub sqrt_price: Q96,
    /// Per-liquidity incentive accumulator.
    pub incentives_per_liquidity: Q96,
    /// Height at which the incentive accumulator was last advanced.
    pub height_incentives_update: u32,
    /// Per-liquidity fee accumulator, token0 side.
    pub fee_growth_global_0: Q96,
    /// Per-liquidity fee accumulator, token1 side.
    pub fee_growth_global_1: Q96,
    /// Only ticks that are multiples of this spacing are usable.
    pub tick_spacing: u32,
}

impl Pool {
    /// Fresh pool at the given initial price.
    pub fn new(sqrt_price: Q96, tick_spacing: u32, height: u32) -> Result<Self, DexError> {
        if *sqrt_price < MIN_SQRT_RATIO || *sqrt_price > MAX_SQRT_RATIO || tick_spacing == 0 {
            return Err(DexError::InvalidParameters);
        }
        Ok(Self {
            liquidity: 0,
            sqrt_price,
            incentives_per_liquidity: Q96::ZERO,
            height_incentives_update: height,
            fee_growth_global_0: Q96::ZERO,
            fee_growth_global_1: Q96::ZERO,
            tick_spacing,
        })
    }

    /// The tick whose price is the largest not exceeding the current price.
    #[inline]
    pub fn current_tick(&self) -> Result<i32, DexError> {
        floor_tick(self.sqrt_price)
    }

    pub fn encode(&self) -> Result<Vec<u8>, DexError> {
        let mut out = Vec::with_capacity(96);
        out.extend_from_slice(&self.liquidity.to_be_bytes());
        write_q96(&mut out, self.sqrt_price)?;
        write_q96(&mut out, self.incentives_per_liquidity)?;
        out.extend_from_slice(&self.height_incentives_update.to_be_bytes());
        write_q96(&mut out, self.fee_growth_global_0)?;
        write_q96(&mut out, self.fee_growth_global_1)?;
        out.extend_from_slice(&self.tick_spacing.to_be_bytes());
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexError> {
        let mut reader = ByteReader::new(bytes);
        let pool = Self {
            liquidity: reader.read_u64()?,
            sqrt_price: reader.read_q96()?,
            incentives_per_liquidity: reader.read_q96()?,
            height_incentives_update: reader.read_u32()?,
            fee_growth_global_0: reader.read_q96()?,
            fee_growth_global_1: reader.read_q96()?,
            tick_spacing: reader.read_u32()?,
        };
        reader.finish()?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::uint;

    #[test]
    fn codec_round_trip() {
        let pool = Pool {
            liquidity: 123456,
            sqrt_price: Q96::from_raw(uint!(248776430294790029895352188928_U256)),
            incentives_per_liquidity: Q96::from_int(9),
            height_incentives_update: 77,
            fee_growth_global_0: Q96::from_int(1),
            fee_growth_global_1: Q96::ZERO,
            tick_spacing: 10,
        };
        assert_eq!(Pool::decode(&pool.encode().unwrap()).unwrap(), pool);
    }

    #[test]
    fn new_pool_rejects_out_of_range_price() {
        assert_eq!(
            Pool::new(Q96::ZERO, 10, 0).unwrap_err(),
            DexError::InvalidParameters
        );
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let pool = Pool::new(Q96::ONE, 10, 0).unwrap();
        let mut bytes = pool.encode().unwrap();
        bytes.push(0);
        assert_eq!(Pool::decode(&bytes).unwrap_err(), DexError::InvalidParameters);
    }
}
