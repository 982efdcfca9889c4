//! Pool and position lifecycle: creation, liquidity changes, and settlement
//! of owed fees and incentives.
//!
//! Every liquidity change settles the position first, against the growth
//! delta since its last snapshot and its *old* liquidity, then mutates the
//! tick records and the position, and finally refreshes all three
//! snapshots. Computed token deltas are realized through the custody
//! collaborator against the pool's vault.

use crate::{
    constants::{MAX_TICK, MIN_TICK},
    custody::TokenCustody,
    entities::{Pool, Position, TickRecord},
    error::DexError,
    growth::{collectable_amount, fee_growth_inside, incentives_inside, update_pool_incentives},
    keys::{Address, PoolId, PositionKey, TickKey, TokenId, NATIVE_TOKEN_ID},
    math::{get_amount_0_delta, get_amount_1_delta, tick_to_price, Q96},
    store::{
        delete_tick, find_tick, get_pool, get_position, load_global, put_pool, put_position,
        put_tick, save_global, TableStore,
    },
};
use tracing::debug;

/// Creates a pool for the token pair at the given fee tier.
///
/// The `(fee_tier, tick_spacing)` pair must be enabled in the global
/// creation settings; duplicates are rejected.
pub fn create_pool<S: TableStore>(
    pools: &mut S,
    global: &S,
    token_a: TokenId,
    token_b: TokenId,
    fee_tier: u32,
    initial_sqrt_price: Q96,
    height: u32,
) -> Result<PoolId, DexError> {
    let state = load_global(global)?;
    let tick_spacing = state
        .tick_spacing_for(fee_tier)
        .ok_or(DexError::InvalidParameters)?;
    let pool_id = PoolId::new(token_a, token_b, fee_tier)?;
    if pools.has(pool_id.as_bytes()) {
        return Err(DexError::InvalidParameters);
    }
    let pool = Pool::new(initial_sqrt_price, tick_spacing, height)?;
    put_pool(pools, &pool_id, &pool)?;
    debug!(?pool_id, tick_spacing, "pool created");
    Ok(pool_id)
}

/// Registers an empty position over a tick range, minting its sequence
/// number from the global counter.
pub fn create_position<S: TableStore>(
    positions: &mut S,
    pools: &S,
    global: &mut S,
    owner: Address,
    pool_id: &PoolId,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<PositionKey, DexError> {
    let pool = get_pool(pools, pool_id)?;
    validate_tick_range(tick_lower, tick_upper, pool.tick_spacing)?;
    let mut state = load_global(global)?;
    let sequence = state.position_counter;
    state.position_counter = state
        .position_counter
        .checked_add(1)
        .ok_or(DexError::ArithmeticOverflow)?;
    save_global(global, &state)?;
    let key = PositionKey::new(*pool_id, owner, sequence);
    put_position(positions, &key, &Position::new(tick_lower, tick_upper, owner))?;
    Ok(key)
}

/// Adds liquidity to a position, settling anything owed first. Returns the
/// token amounts collected from the owner.
#[allow(clippy::too_many_arguments)]
pub fn add_liquidity<S: TableStore, C: TokenCustody>(
    pools: &mut S,
    ticks: &mut S,
    positions: &mut S,
    global: &S,
    custody: &mut C,
    position_key: &PositionKey,
    amount: u64,
    height: u32,
) -> Result<(u128, u128), DexError> {
    if amount == 0 {
        return Err(DexError::InvalidParameters);
    }
    let pool_id = position_key.pool_id;
    let mut position = get_position(positions, position_key)?;
    let mut pool = get_pool(pools, &pool_id)?;
    let state = load_global(global)?;
    update_pool_incentives(&mut pool, &state, &pool_id, height)?;
    let current_tick = pool.current_tick()?;
    let had_liquidity = position.liquidity > 0;

    if had_liquidity {
        settle_position(ticks, custody, &pool_id, &pool, &mut position)?;
    }

    let lower_key = TickKey::new(pool_id, position.tick_lower)?;
    let upper_key = TickKey::new(pool_id, position.tick_upper)?;
    let mut lower = find_tick(ticks, &lower_key)?
        .unwrap_or_else(|| TickRecord::new(position.tick_lower, current_tick, &pool));
    let mut upper = find_tick(ticks, &upper_key)?
        .unwrap_or_else(|| TickRecord::new(position.tick_upper, current_tick, &pool));
    lower.liquidity_gross = lower
        .liquidity_gross
        .checked_add(amount)
        .ok_or(DexError::ArithmeticOverflow)?;
    lower.liquidity_net += amount as i128;
    upper.liquidity_gross = upper
        .liquidity_gross
        .checked_add(amount)
        .ok_or(DexError::ArithmeticOverflow)?;
    upper.liquidity_net -= amount as i128;
    put_tick(ticks, &lower_key, &lower)?;
    put_tick(ticks, &upper_key, &upper)?;

    position.liquidity = position
        .liquidity
        .checked_add(amount)
        .ok_or(DexError::ArithmeticOverflow)?;
    if !had_liquidity {
        refresh_snapshots(ticks, &pool_id, &pool, &mut position)?;
    }

    let (amount_0, amount_1) =
        amounts_for_liquidity(&pool, position.tick_lower, position.tick_upper, amount, true)?;
    let vault = pool_id.vault_address();
    if amount_0 > 0 {
        custody.transfer(position.owner, vault, pool_id.token_0(), amount_0)?;
        custody.lock(vault, pool_id.token_0(), amount_0)?;
    }
    if amount_1 > 0 {
        custody.transfer(position.owner, vault, pool_id.token_1(), amount_1)?;
        custody.lock(vault, pool_id.token_1(), amount_1)?;
    }

    if position.tick_lower <= current_tick && current_tick < position.tick_upper {
        pool.liquidity = pool
            .liquidity
            .checked_add(amount)
            .ok_or(DexError::ArithmeticOverflow)?;
    }
    put_pool(pools, &pool_id, &pool)?;
    put_position(positions, position_key, &position)?;
    debug!(?pool_id, amount, amount_0, amount_1, "liquidity added");
    Ok((amount_0, amount_1))
}

/// Removes liquidity from a position, settling anything owed first. Returns
/// the token amounts released to the owner.
#[allow(clippy::too_many_arguments)]
pub fn remove_liquidity<S: TableStore, C: TokenCustody>(
    pools: &mut S,
    ticks: &mut S,
    positions: &mut S,
    global: &S,
    custody: &mut C,
    position_key: &PositionKey,
    amount: u64,
    height: u32,
) -> Result<(u128, u128), DexError> {
    if amount == 0 {
        return Err(DexError::InvalidParameters);
    }
    let pool_id = position_key.pool_id;
    let mut position = get_position(positions, position_key)?;
    if amount > position.liquidity {
        return Err(DexError::InvalidParameters);
    }
    let mut pool = get_pool(pools, &pool_id)?;
    let state = load_global(global)?;
    update_pool_incentives(&mut pool, &state, &pool_id, height)?;
    let current_tick = pool.current_tick()?;

    settle_position(ticks, custody, &pool_id, &pool, &mut position)?;

    let lower_key = TickKey::new(pool_id, position.tick_lower)?;
    let upper_key = TickKey::new(pool_id, position.tick_upper)?;
    let mut lower = find_tick(ticks, &lower_key)?.ok_or(DexError::TickNotFound)?;
    let mut upper = find_tick(ticks, &upper_key)?.ok_or(DexError::TickNotFound)?;
    lower.liquidity_gross = lower
        .liquidity_gross
        .checked_sub(amount)
        .ok_or(DexError::ArithmeticOverflow)?;
    lower.liquidity_net -= amount as i128;
    upper.liquidity_gross = upper
        .liquidity_gross
        .checked_sub(amount)
        .ok_or(DexError::ArithmeticOverflow)?;
    upper.liquidity_net += amount as i128;
    // a tick nothing references any longer is deinitialized entirely
    if lower.liquidity_gross == 0 {
        delete_tick(ticks, &lower_key);
    } else {
        put_tick(ticks, &lower_key, &lower)?;
    }
    if upper.liquidity_gross == 0 {
        delete_tick(ticks, &upper_key);
    } else {
        put_tick(ticks, &upper_key, &upper)?;
    }

    position.liquidity -= amount;

    let (amount_0, amount_1) =
        amounts_for_liquidity(&pool, position.tick_lower, position.tick_upper, amount, false)?;
    let vault = pool_id.vault_address();
    if amount_0 > 0 {
        custody.unlock(vault, pool_id.token_0(), amount_0)?;
        custody.transfer(vault, position.owner, pool_id.token_0(), amount_0)?;
    }
    if amount_1 > 0 {
        custody.unlock(vault, pool_id.token_1(), amount_1)?;
        custody.transfer(vault, position.owner, pool_id.token_1(), amount_1)?;
    }

    if position.tick_lower <= current_tick && current_tick < position.tick_upper {
        pool.liquidity = pool
            .liquidity
            .checked_sub(amount)
            .ok_or(DexError::ArithmeticOverflow)?;
    }
    put_pool(pools, &pool_id, &pool)?;
    put_position(positions, position_key, &position)?;
    debug!(?pool_id, amount, amount_0, amount_1, "liquidity removed");
    Ok((amount_0, amount_1))
}

/// Settles a position without changing its liquidity. Returns the fee
/// amounts transferred and the incentives minted to the owner.
pub fn collect_fees_and_incentives<S: TableStore, C: TokenCustody>(
    pools: &mut S,
    ticks: &S,
    positions: &mut S,
    global: &S,
    custody: &mut C,
    position_key: &PositionKey,
    height: u32,
) -> Result<(u128, u128, u128), DexError> {
    let pool_id = position_key.pool_id;
    let mut position = get_position(positions, position_key)?;
    let mut pool = get_pool(pools, &pool_id)?;
    let state = load_global(global)?;
    update_pool_incentives(&mut pool, &state, &pool_id, height)?;

    let collected = settle_position(ticks, custody, &pool_id, &pool, &mut position)?;

    put_pool(pools, &pool_id, &pool)?;
    put_position(positions, position_key, &position)?;
    Ok(collected)
}

/// Pays out everything accrued since the last snapshot and advances the
/// snapshots. Uses the position's liquidity as it stands, so it must run
/// before any liquidity mutation.
fn settle_position<S: TableStore, C: TokenCustody>(
    ticks: &S,
    custody: &mut C,
    pool_id: &PoolId,
    pool: &Pool,
    position: &mut Position,
) -> Result<(u128, u128, u128), DexError> {
    if position.liquidity == 0 {
        return Ok((0, 0, 0));
    }
    let (inside_0, inside_1) =
        fee_growth_inside(ticks, pool_id, pool, position.tick_lower, position.tick_upper)?;
    let inside_incentives =
        incentives_inside(ticks, pool_id, pool, position.tick_lower, position.tick_upper)?;
    let owed_0 =
        collectable_amount(position.liquidity, inside_0, position.fee_growth_inside_last_0)?;
    let owed_1 =
        collectable_amount(position.liquidity, inside_1, position.fee_growth_inside_last_1)?;
    let owed_incentives = collectable_amount(
        position.liquidity,
        inside_incentives,
        position.incentives_per_liquidity_last,
    )?;

    let vault = pool_id.vault_address();
    if owed_0 > 0 {
        custody.transfer(vault, position.owner, pool_id.token_0(), owed_0)?;
    }
    if owed_1 > 0 {
        custody.transfer(vault, position.owner, pool_id.token_1(), owed_1)?;
    }
    if owed_incentives > 0 {
        custody.mint(position.owner, NATIVE_TOKEN_ID, owed_incentives)?;
    }

    position.fee_growth_inside_last_0 = inside_0;
    position.fee_growth_inside_last_1 = inside_1;
    position.incentives_per_liquidity_last = inside_incentives;
    debug!(owed_0, owed_1, owed_incentives, "position settled");
    Ok((owed_0, owed_1, owed_incentives))
}

fn refresh_snapshots<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    pool: &Pool,
    position: &mut Position,
) -> Result<(), DexError> {
    let (inside_0, inside_1) =
        fee_growth_inside(ticks, pool_id, pool, position.tick_lower, position.tick_upper)?;
    position.fee_growth_inside_last_0 = inside_0;
    position.fee_growth_inside_last_1 = inside_1;
    position.incentives_per_liquidity_last =
        incentives_inside(ticks, pool_id, pool, position.tick_lower, position.tick_upper)?;
    Ok(())
}

/// Token amounts corresponding to `liquidity` over a range, relative to the
/// pool's current price. Rounds up when collecting from the owner, down when
/// paying out.
fn amounts_for_liquidity(
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u64,
    round_up: bool,
) -> Result<(u128, u128), DexError> {
    let lower_price = tick_to_price(tick_lower)?;
    let upper_price = tick_to_price(tick_upper)?;
    let liquidity = liquidity as u128;
    if pool.sqrt_price <= lower_price {
        Ok((
            get_amount_0_delta(lower_price, upper_price, liquidity, round_up)?,
            0,
        ))
    } else if pool.sqrt_price >= upper_price {
        Ok((
            0,
            get_amount_1_delta(lower_price, upper_price, liquidity, round_up)?,
        ))
    } else {
        Ok((
            get_amount_0_delta(pool.sqrt_price, upper_price, liquidity, round_up)?,
            get_amount_1_delta(lower_price, pool.sqrt_price, liquidity, round_up)?,
        ))
    }
}

fn validate_tick_range(tick_lower: i32, tick_upper: i32, tick_spacing: u32) -> Result<(), DexError> {
    if tick_lower >= tick_upper
        || tick_lower < MIN_TICK
        || tick_upper > MAX_TICK
        || tick_lower % tick_spacing as i32 != 0
        || tick_upper % tick_spacing as i32 != 0
    {
        return Err(DexError::InvalidTickRange);
    }
    Ok(())
}
