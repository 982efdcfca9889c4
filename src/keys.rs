//! Composite byte keys for the store collaborator.
//!
//! Keys are concatenations of fixed-width big-endian fields, constructed
//! only through the builder types here so field widths and token ordering
//! are enforced at construction. Byte-lexicographic key order equals the
//! entity's natural order (ticks are offset-encoded for exactly this
//! reason).

use crate::{
    constants::{ADDRESS_LENGTH, MAX_TICK, MIN_TICK, POOL_ID_LENGTH, TICK_OFFSET, TOKEN_ID_LENGTH},
    error::DexError,
};
use core::fmt;

/// An 8-byte token identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(pub [u8; TOKEN_ID_LENGTH]);

/// The chain's native token, used as the reference asset for exceptional
/// routes and as the denomination of liquidity incentives.
pub const NATIVE_TOKEN_ID: TokenId = TokenId([0; TOKEN_ID_LENGTH]);

/// A 20-byte account address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

/// A pool identifier: `token0 (8B) || token1 (8B) || fee_tier (4B BE)` with
/// `token0 < token1` lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId([u8; POOL_ID_LENGTH]);

impl PoolId {
    /// Builds a pool identifier from an unordered token pair and a fee tier.
    ///
    /// Fails with [`DexError::InvalidParameters`] when both tokens are the
    /// same.
    pub fn new(token_a: TokenId, token_b: TokenId, fee_tier: u32) -> Result<Self, DexError> {
        if token_a == token_b {
            return Err(DexError::InvalidParameters);
        }
        let (token_0, token_1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let mut bytes = [0_u8; POOL_ID_LENGTH];
        bytes[..TOKEN_ID_LENGTH].copy_from_slice(&token_0.0);
        bytes[TOKEN_ID_LENGTH..2 * TOKEN_ID_LENGTH].copy_from_slice(&token_1.0);
        bytes[2 * TOKEN_ID_LENGTH..].copy_from_slice(&fee_tier.to_be_bytes());
        Ok(Self(bytes))
    }

    /// Parses a pool identifier from its exact 20-byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DexError> {
        let bytes: [u8; POOL_ID_LENGTH] =
            bytes.try_into().map_err(|_| DexError::InvalidParameters)?;
        let id = Self(bytes);
        if id.token_0() >= id.token_1() {
            return Err(DexError::InvalidParameters);
        }
        Ok(id)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; POOL_ID_LENGTH] {
        &self.0
    }

    #[inline]
    pub fn token_0(&self) -> TokenId {
        TokenId(self.0[..TOKEN_ID_LENGTH].try_into().unwrap())
    }

    #[inline]
    pub fn token_1(&self) -> TokenId {
        TokenId(self.0[TOKEN_ID_LENGTH..2 * TOKEN_ID_LENGTH].try_into().unwrap())
    }

    #[inline]
    pub fn fee_tier(&self) -> u32 {
        u32::from_be_bytes(self.0[2 * TOKEN_ID_LENGTH..].try_into().unwrap())
    }

    /// Returns true if the pool connects the given token on either side.
    #[inline]
    pub fn involves_token(&self, token: TokenId) -> bool {
        self.token_0() == token || self.token_1() == token
    }

    /// The token on the opposite side of the pool, if `token` is one of the
    /// pair.
    pub fn other_token(&self, token: TokenId) -> Option<TokenId> {
        if token == self.token_0() {
            Some(self.token_1())
        } else if token == self.token_1() {
            Some(self.token_0())
        } else {
            None
        }
    }

    /// The custody vault address holding this pool's token balances.
    #[inline]
    pub fn vault_address(&self) -> Address {
        Address(self.0)
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoolId({:02x?}/{:02x?}/{})",
            self.token_0().0,
            self.token_1().0,
            self.fee_tier()
        )
    }
}

/// Serializes a tick as offset-binary big-endian u32, so that byte order
/// equals numeric order.
pub fn tick_to_bytes(tick: i32) -> Result<[u8; 4], DexError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(DexError::InvalidTickRange);
    }
    Ok(((tick as u32).wrapping_add(TICK_OFFSET)).to_be_bytes())
}

/// Inverse of [`tick_to_bytes`]; rejects inputs that are not exactly four
/// bytes or decode outside the tick range.
pub fn bytes_to_tick(bytes: &[u8]) -> Result<i32, DexError> {
    let bytes: [u8; 4] = bytes.try_into().map_err(|_| DexError::InvalidTickRange)?;
    let tick = u32::from_be_bytes(bytes).wrapping_sub(TICK_OFFSET) as i32;
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(DexError::InvalidTickRange);
    }
    Ok(tick)
}

/// Key of a tick record: `pool_id || tick_to_bytes(tick)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickKey {
    pub pool_id: PoolId,
    pub tick: i32,
}

impl TickKey {
    pub fn new(pool_id: PoolId, tick: i32) -> Result<Self, DexError> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(DexError::InvalidTickRange);
        }
        Ok(Self { pool_id, tick })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(POOL_ID_LENGTH + 4);
        bytes.extend_from_slice(self.pool_id.as_bytes());
        // constructor already validated the tick
        bytes.extend_from_slice(&((self.tick as u32).wrapping_add(TICK_OFFSET)).to_be_bytes());
        bytes
    }
}

/// Key of a position: `pool_id || owner (20B) || sequence (8B BE)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionKey {
    pub pool_id: PoolId,
    pub owner: Address,
    pub sequence: u64,
}

impl PositionKey {
    pub fn new(pool_id: PoolId, owner: Address, sequence: u64) -> Self {
        Self {
            pool_id,
            owner,
            sequence,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(POOL_ID_LENGTH + ADDRESS_LENGTH + 8);
        bytes.extend_from_slice(self.pool_id.as_bytes());
        bytes.extend_from_slice(&self.owner.0);
        bytes.extend_from_slice(&self.sequence.to_be_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(byte: u8) -> TokenId {
        TokenId([0, 0, 0, 0, 0, 0, 0, byte])
    }

    #[test]
    fn pool_id_orders_tokens() {
        let forward = PoolId::new(token(1), token(2), 3000).unwrap();
        let backward = PoolId::new(token(2), token(1), 3000).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.token_0(), token(1));
        assert_eq!(forward.token_1(), token(2));
        assert_eq!(forward.fee_tier(), 3000);
    }

    #[test]
    fn pool_id_rejects_identical_tokens() {
        assert_eq!(
            PoolId::new(token(1), token(1), 3000).unwrap_err(),
            DexError::InvalidParameters
        );
    }

    #[test]
    fn tick_bytes_round_trip_and_order() {
        for tick in [MIN_TICK, -1, 0, 1, 42, MAX_TICK] {
            assert_eq!(bytes_to_tick(&tick_to_bytes(tick).unwrap()).unwrap(), tick);
        }
        assert!(tick_to_bytes(-1).unwrap() < tick_to_bytes(0).unwrap());
        assert!(tick_to_bytes(0).unwrap() < tick_to_bytes(1).unwrap());
    }

    #[test]
    fn tick_bytes_reject_out_of_range() {
        assert_eq!(
            tick_to_bytes(MAX_TICK + 1).unwrap_err(),
            DexError::InvalidTickRange
        );
        assert_eq!(
            bytes_to_tick(&(MAX_TICK as u32 + 1 + TICK_OFFSET).to_be_bytes()).unwrap_err(),
            DexError::InvalidTickRange
        );
    }

    #[test]
    fn tick_bytes_reject_wrong_length() {
        assert_eq!(bytes_to_tick(&[0; 3]).unwrap_err(), DexError::InvalidTickRange);
        assert_eq!(bytes_to_tick(&[0; 5]).unwrap_err(), DexError::InvalidTickRange);
    }

    #[test]
    fn tick_keys_sort_numerically() {
        let pool = PoolId::new(token(1), token(2), 500).unwrap();
        let low = TickKey::new(pool, -60).unwrap().to_bytes();
        let mid = TickKey::new(pool, 0).unwrap().to_bytes();
        let high = TickKey::new(pool, 60).unwrap().to_bytes();
        assert!(low < mid && mid < high);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::constants::{MAX_TICK, MIN_TICK};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn tick_bytes_round_trip(tick in MIN_TICK..=MAX_TICK) {
            prop_assert_eq!(bytes_to_tick(&tick_to_bytes(tick).unwrap()).unwrap(), tick);
        }

        #[test]
        fn tick_byte_order_matches_numeric_order(a in MIN_TICK..=MAX_TICK, b in MIN_TICK..=MAX_TICK) {
            let (ab, bb) = (tick_to_bytes(a).unwrap(), tick_to_bytes(b).unwrap());
            prop_assert_eq!(a.cmp(&b), ab.cmp(&bb));
        }
    }
}
