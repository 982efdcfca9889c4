use crate::{
    constants::POOL_ID_LENGTH,
    entities::ByteReader,
    error::DexError,
    keys::PoolId,
};

/// An allowed `(fee_tier, tick_spacing)` pair for pool creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolCreationSetting {
    pub fee_tier: u32,
    pub tick_spacing: u32,
}

/// Singleton module state.
///
/// Mutated only by governance-style operations outside this core; the core
/// reads it for pool creation validation and incentive apportioning, and
/// advances `position_counter` when minting position sequence numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DexGlobalState {
    /// Monotonic counter minting position sequence numbers.
    pub position_counter: u64,
    pub pool_creation_settings: Vec<PoolCreationSetting>,
    /// `(pool, multiplier)` pairs sharing the per-block incentives.
    pub incentivized_pools: Vec<(PoolId, u32)>,
    pub total_incentives_multiplier: u32,
}

impl DexGlobalState {
    /// Tick spacing for a fee tier, or `None` if the tier is not enabled.
    pub fn tick_spacing_for(&self, fee_tier: u32) -> Option<u32> {
        self.pool_creation_settings
            .iter()
            .find(|setting| setting.fee_tier == fee_tier)
            .map(|setting| setting.tick_spacing)
    }

    /// Incentive multiplier of a pool, zero when not incentivized.
    pub fn multiplier_for(&self, pool_id: &PoolId) -> u32 {
        self.incentivized_pools
            .iter()
            .find(|(id, _)| id == pool_id)
            .map(|(_, multiplier)| *multiplier)
            .unwrap_or(0)
    }

    pub fn encode(&self) -> Result<Vec<u8>, DexError> {
        let mut out = Vec::with_capacity(
            16 + 8 * self.pool_creation_settings.len()
                + (POOL_ID_LENGTH + 4) * self.incentivized_pools.len(),
        );
        out.extend_from_slice(&self.position_counter.to_be_bytes());
        out.extend_from_slice(&(self.pool_creation_settings.len() as u32).to_be_bytes());
        for setting in &self.pool_creation_settings {
            out.extend_from_slice(&setting.fee_tier.to_be_bytes());
            out.extend_from_slice(&setting.tick_spacing.to_be_bytes());
        }
        out.extend_from_slice(&(self.incentivized_pools.len() as u32).to_be_bytes());
        for (pool_id, multiplier) in &self.incentivized_pools {
            out.extend_from_slice(pool_id.as_bytes());
            out.extend_from_slice(&multiplier.to_be_bytes());
        }
        out.extend_from_slice(&self.total_incentives_multiplier.to_be_bytes());
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DexError> {
        let mut reader = ByteReader::new(bytes);
        let position_counter = reader.read_u64()?;
        let settings_len = reader.read_u32()? as usize;
        let mut pool_creation_settings = Vec::with_capacity(settings_len);
        for _ in 0..settings_len {
            pool_creation_settings.push(PoolCreationSetting {
                fee_tier: reader.read_u32()?,
                tick_spacing: reader.read_u32()?,
            });
        }
        let incentives_len = reader.read_u32()? as usize;
        let mut incentivized_pools = Vec::with_capacity(incentives_len);
        for _ in 0..incentives_len {
            let pool_id = PoolId::from_bytes(reader.take(POOL_ID_LENGTH)?)?;
            incentivized_pools.push((pool_id, reader.read_u32()?));
        }
        let total_incentives_multiplier = reader.read_u32()?;
        reader.finish()?;
        Ok(Self {
            position_counter,
            pool_creation_settings,
            incentivized_pools,
            total_incentives_multiplier,
        })
    }
}
