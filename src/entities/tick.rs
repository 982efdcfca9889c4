use crate::{
    entities::{write_q96, ByteReader},
    error::DexError,
    math::Q96,
};

/// Per-tick bookkeeping for one pool.
///
/// The growth-outside snapshots hold the global growth accumulated while the
/// price was on the far side of this tick from the pool's initial reference
/// point; they flip (`outside := global - outside`) every time the price
/// crosses the tick. A record with `liquidity_gross == 0` is uninitialized
/// and removed from the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickRecord {
    /// Signed liquidity delta applied when the price crosses this tick
    /// upward.
    pub liquidity_net: i128,
    /// Total liquidity of all positions referencing this tick.
    pub liquidity_gross: u64,
    pub fee_growth_outside_0: Q96,
    pub fee_growth_outside_1: Q96,
    pub incentives_outside: Q96,
}

impl TickRecord {
    /// Snapshot rule at initialization: ticks at or below the current price
    /// start with the full global growth outside, ticks above start at zero.
    pub fn new(tick: i32, current_tick: i32, pool: &crate::entities::Pool) -> Self {
        if tick <= current_tick {
            Self {
                liquidity_net: 0,
                liquidity_gross: 0,
                fee_growth_outside_0: pool.fee_growth_global_0,
                fee_growth_outside_1: pool.fee_growth_global_1,
                incentives_outside: pool.incentives_per_liquidity,
            }
        } else {
            Self::default()
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross > 0
    }

    pub fn encode(&self) -> Result<Vec<u8>, DexError> {
        let mut out = Vec::with_capacity(104);
        out.extend_from_slice(&self.liquidity_net.to_be_bytes());
        out.extend_from_slice(&self.liquidity_gross.to_be_bytes());
        write_q96(&mut out, self.fee_growth_outside_0)?;
        write_q96(&mut out, self.fee_growth_outside_1)?;
        write_q96(&mut out, self.incentives_outside)?;
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexError> {
        let mut reader = ByteReader::new(bytes);
        let record = Self {
            liquidity_net: reader.read_i128()?,
            liquidity_gross: reader.read_u64()?,
            fee_growth_outside_0: reader.read_q96()?,
            fee_growth_outside_1: reader.read_q96()?,
            incentives_outside: reader.read_q96()?,
        };
        reader.finish()?;
        Ok(record)
    }
}
