//! Shared fixtures for unit tests: an in-memory store per table, a custody
//! double, and helpers to stand up funded pools.

use crate::{
    custody::TokenCustody,
    entities::{DexGlobalState, PoolCreationSetting},
    error::DexError,
    keys::{Address, PoolId, PositionKey, TokenId},
    liquidity::{add_liquidity, create_pool, create_position},
    math::Q96,
    store::{save_global, MemStore},
};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

pub(crate) static TOKEN_X: Lazy<TokenId> = Lazy::new(|| TokenId([0, 0, 0, 0, 0, 0, 0, 1]));
pub(crate) static TOKEN_Y: Lazy<TokenId> = Lazy::new(|| TokenId([0, 0, 0, 0, 0, 0, 0, 2]));
pub(crate) static TOKEN_Z: Lazy<TokenId> = Lazy::new(|| TokenId([0, 0, 0, 0, 0, 0, 0, 3]));

pub(crate) const ALICE: Address = Address([0xaa; 20]);
pub(crate) const BOB: Address = Address([0xbb; 20]);

pub(crate) fn pool_id_of(token_a: TokenId, token_b: TokenId, fee_tier: u32) -> PoolId {
    PoolId::new(token_a, token_b, fee_tier).unwrap()
}

/// Custody double backed by plain balance maps. Transfers check the
/// available (unlocked) balance of the sender.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockCustody {
    balances: BTreeMap<(Address, TokenId), u128>,
    locked: BTreeMap<(Address, TokenId), u128>,
}

impl MockCustody {
    pub(crate) fn balance(&self, address: Address, token_id: TokenId) -> u128 {
        self.balances.get(&(address, token_id)).copied().unwrap_or(0)
    }
}

impl TokenCustody for MockCustody {
    fn mint(&mut self, address: Address, token_id: TokenId, amount: u128) -> Result<(), DexError> {
        *self.balances.entry((address, token_id)).or_default() += amount;
        Ok(())
    }

    fn lock(&mut self, address: Address, token_id: TokenId, amount: u128) -> Result<(), DexError> {
        if self.available_balance(address, token_id) < amount {
            return Err(DexError::InvalidParameters);
        }
        *self.locked.entry((address, token_id)).or_default() += amount;
        Ok(())
    }

    fn unlock(
        &mut self,
        address: Address,
        token_id: TokenId,
        amount: u128,
    ) -> Result<(), DexError> {
        let locked = self.locked.entry((address, token_id)).or_default();
        if *locked < amount {
            return Err(DexError::InvalidParameters);
        }
        *locked -= amount;
        Ok(())
    }

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        token_id: TokenId,
        amount: u128,
    ) -> Result<(), DexError> {
        if self.available_balance(from, token_id) < amount {
            return Err(DexError::InvalidParameters);
        }
        *self.balances.entry((from, token_id)).or_default() -= amount;
        *self.balances.entry((to, token_id)).or_default() += amount;
        Ok(())
    }

    fn available_balance(&self, address: Address, token_id: TokenId) -> u128 {
        self.balance(address, token_id) - self.locked_amount(address, token_id)
    }

    fn locked_amount(&self, address: Address, token_id: TokenId) -> u128 {
        self.locked.get(&(address, token_id)).copied().unwrap_or(0)
    }
}

/// One store per logical table plus the custody double.
pub(crate) struct Harness {
    pub pools: MemStore,
    pub ticks: MemStore,
    pub positions: MemStore,
    pub global: MemStore,
    pub custody: MockCustody,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let mut global = MemStore::new();
        save_global(
            &mut global,
            &DexGlobalState {
                position_counter: 0,
                pool_creation_settings: vec![
                    PoolCreationSetting {
                        fee_tier: 500,
                        tick_spacing: 10,
                    },
                    PoolCreationSetting {
                        fee_tier: 3000,
                        tick_spacing: 60,
                    },
                    PoolCreationSetting {
                        fee_tier: 10000,
                        tick_spacing: 200,
                    },
                ],
                incentivized_pools: vec![],
                total_incentives_multiplier: 0,
            },
        )
        .unwrap();
        Self {
            pools: MemStore::new(),
            ticks: MemStore::new(),
            positions: MemStore::new(),
            global,
            custody: MockCustody::default(),
        }
    }

    pub(crate) fn create_pool(
        &mut self,
        token_a: TokenId,
        token_b: TokenId,
        fee_tier: u32,
        sqrt_price: Q96,
    ) -> PoolId {
        let pool_id = create_pool(
            &mut self.pools,
            &self.global,
            token_a,
            token_b,
            fee_tier,
            sqrt_price,
            1,
        )
        .unwrap();
        // swap inputs are deposited by the command layer; give the vault a
        // float so settlements can pay out in these tests
        let vault = pool_id.vault_address();
        self.custody.mint(vault, pool_id.token_0(), 1_000_000_000).unwrap();
        self.custody.mint(vault, pool_id.token_1(), 1_000_000_000).unwrap();
        pool_id
    }

    /// Opens a position for ALICE and funds it with `liquidity`, seeding
    /// the owner with ample balances first.
    pub(crate) fn open_position(
        &mut self,
        pool_id: PoolId,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u64,
    ) -> PositionKey {
        self.custody
            .mint(ALICE, pool_id.token_0(), 1_000_000_000_000)
            .unwrap();
        self.custody
            .mint(ALICE, pool_id.token_1(), 1_000_000_000_000)
            .unwrap();
        let key = create_position(
            &mut self.positions,
            &self.pools,
            &mut self.global,
            ALICE,
            &pool_id,
            tick_lower,
            tick_upper,
        )
        .unwrap();
        add_liquidity(
            &mut self.pools,
            &mut self.ticks,
            &mut self.positions,
            &self.global,
            &mut self.custody,
            &key,
            liquidity,
            1,
        )
        .unwrap();
        key
    }
}
