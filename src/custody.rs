//! Asset-custody collaborator.
//!
//! The core never infers balances on its own; it calls these methods only to
//! realize deltas it has already computed. Each pool's funds sit under the
//! vault address derived from its [`PoolId`].
//!
//! [`PoolId`]: crate::keys::PoolId

use crate::{
    error::DexError,
    keys::{Address, TokenId},
};

pub trait TokenCustody {
    /// Creates new units of `token_id` under `address`. Used for liquidity
    /// incentives, which are minted in the native token.
    fn mint(&mut self, address: Address, token_id: TokenId, amount: u128) -> Result<(), DexError>;

    fn lock(&mut self, address: Address, token_id: TokenId, amount: u128) -> Result<(), DexError>;

    fn unlock(&mut self, address: Address, token_id: TokenId, amount: u128)
        -> Result<(), DexError>;

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        token_id: TokenId,
        amount: u128,
    ) -> Result<(), DexError>;

    fn available_balance(&self, address: Address, token_id: TokenId) -> u128;

    fn locked_amount(&self, address: Address, token_id: TokenId) -> u128;
}
