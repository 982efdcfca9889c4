use crate::{
    constants::ADDRESS_LENGTH,
    entities::{write_q96, ByteReader},
    error::DexError,
    keys::Address,
    math::Q96,
};

/// A liquidity position over one tick range of one pool.
///
/// Snapshots record the growth-inside values at the last settlement; the
/// delta against the current inside values, scaled by the position's
/// liquidity, is the collectable amount. A position whose liquidity reaches
/// zero is kept as an empty record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u64,
    pub fee_growth_inside_last_0: Q96,
    pub fee_growth_inside_last_1: Q96,
    pub incentives_per_liquidity_last: Q96,
    pub owner: Address,
}

impl Position {
    pub fn new(tick_lower: i32, tick_upper: i32, owner: Address) -> Self {
        Self {
            tick_lower,
            tick_upper,
            liquidity: 0,
            fee_growth_inside_last_0: Q96::ZERO,
            fee_growth_inside_last_1: Q96::ZERO,
            incentives_per_liquidity_last: Q96::ZERO,
            owner,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, DexError> {
        let mut out = Vec::with_capacity(96);
        out.extend_from_slice(&crate::keys::tick_to_bytes(self.tick_lower)?);
        out.extend_from_slice(&crate::keys::tick_to_bytes(self.tick_upper)?);
        out.extend_from_slice(&self.liquidity.to_be_bytes());
        write_q96(&mut out, self.fee_growth_inside_last_0)?;
        write_q96(&mut out, self.fee_growth_inside_last_1)?;
        write_q96(&mut out, self.incentives_per_liquidity_last)?;
        out.extend_from_slice(&self.owner.0);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexError> {
        let mut reader = ByteReader::new(bytes);
        let tick_lower = crate::keys::bytes_to_tick(reader.take(4)?)?;
        let tick_upper = crate::keys::bytes_to_tick(reader.take(4)?)?;
        let liquidity = reader.read_u64()?;
        let fee_growth_inside_last_0 = reader.read_q96()?;
        let fee_growth_inside_last_1 = reader.read_q96()?;
        let incentives_per_liquidity_last = reader.read_q96()?;
        let owner = Address(
            reader
                .take(ADDRESS_LENGTH)?
                .try_into()
                .map_err(|_| DexError::InvalidParameters)?,
        );
        reader.finish()?;
        Ok(Self {
            tick_lower,
            tick_upper,
            liquidity,
            fee_growth_inside_last_0,
            fee_growth_inside_last_1,
            incentives_per_liquidity_last,
            owner,
        })
    }
}
