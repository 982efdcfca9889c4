//! Fee and incentive growth accounting.
//!
//! Global accumulators only ever grow; per-position amounts are derived from
//! "growth inside" a tick range, which combines the globals with the
//! crossing-maintained outside snapshots on the range's two ticks.

use crate::{
    constants::INCENTIVES_PER_BLOCK,
    entities::{DexGlobalState, Pool, TickRecord},
    error::DexError,
    keys::{PoolId, TickKey},
    math::Q96,
    store::{get_tick, TableStore},
};

/// Native token units per block attributed to one pool, apportioned by its
/// incentive multiplier.
pub fn pool_incentive_rate(global_state: &DexGlobalState, pool_id: &PoolId) -> u64 {
    let multiplier = global_state.multiplier_for(pool_id);
    if multiplier == 0 || global_state.total_incentives_multiplier == 0 {
        return 0;
    }
    // apportioning rounds down; the residue is simply never minted
    ((INCENTIVES_PER_BLOCK as u128 * multiplier as u128)
        / global_state.total_incentives_multiplier as u128) as u64
}

/// The incentive accumulator the pool would hold at `height`.
///
/// Pools without active liquidity accrue nothing; there is nobody to
/// attribute the incentives to.
pub fn compute_new_incentives_per_liquidity(
    global_state: &DexGlobalState,
    pool_id: &PoolId,
    pool: &Pool,
    height: u32,
) -> Result<Q96, DexError> {
    if height < pool.height_incentives_update {
        return Err(DexError::InvalidParameters);
    }
    let blocks = (height - pool.height_incentives_update) as u128;
    let rate = pool_incentive_rate(global_state, pool_id) as u128;
    if blocks == 0 || rate == 0 || pool.liquidity == 0 {
        return Ok(pool.incentives_per_liquidity);
    }
    let accrued = Q96::from_int(rate * blocks).div(Q96::from_int(pool.liquidity as u128))?;
    pool.incentives_per_liquidity.add(accrued)
}

/// Advances the pool's incentive accumulator and update height to `height`.
pub fn update_pool_incentives(
    pool: &mut Pool,
    global_state: &DexGlobalState,
    pool_id: &PoolId,
    height: u32,
) -> Result<(), DexError> {
    pool.incentives_per_liquidity =
        compute_new_incentives_per_liquidity(global_state, pool_id, pool, height)?;
    pool.height_incentives_update = height;
    Ok(())
}

/// Growth accumulated below `tick` (from the pool's perspective at
/// `current_tick`), for one accumulator/outside pair.
#[inline]
fn growth_below(
    global: Q96,
    outside: Q96,
    tick: i32,
    current_tick: i32,
) -> Result<Q96, DexError> {
    if current_tick >= tick {
        Ok(outside)
    } else {
        global.sub(outside)
    }
}

#[inline]
fn growth_above(
    global: Q96,
    outside: Q96,
    tick: i32,
    current_tick: i32,
) -> Result<Q96, DexError> {
    if current_tick >= tick {
        global.sub(outside)
    } else {
        Ok(outside)
    }
}

fn growth_inside(
    global: Q96,
    lower_outside: Q96,
    upper_outside: Q96,
    tick_lower: i32,
    tick_upper: i32,
    current_tick: i32,
) -> Result<Q96, DexError> {
    let below = growth_below(global, lower_outside, tick_lower, current_tick)?;
    let above = growth_above(global, upper_outside, tick_upper, current_tick)?;
    global.sub(below)?.sub(above)
}

/// Fee growth inside `[tick_lower, tick_upper)` for both tokens.
pub fn fee_growth_inside<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<(Q96, Q96), DexError> {
    let current_tick = pool.current_tick()?;
    let lower = get_tick(ticks, &TickKey::new(*pool_id, tick_lower)?)?;
    let upper = get_tick(ticks, &TickKey::new(*pool_id, tick_upper)?)?;
    let inside_0 = growth_inside(
        pool.fee_growth_global_0,
        lower.fee_growth_outside_0,
        upper.fee_growth_outside_0,
        tick_lower,
        tick_upper,
        current_tick,
    )?;
    let inside_1 = growth_inside(
        pool.fee_growth_global_1,
        lower.fee_growth_outside_1,
        upper.fee_growth_outside_1,
        tick_lower,
        tick_upper,
        current_tick,
    )?;
    Ok((inside_0, inside_1))
}

/// Incentive growth inside `[tick_lower, tick_upper)`.
pub fn incentives_inside<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<Q96, DexError> {
    let current_tick = pool.current_tick()?;
    let lower = get_tick(ticks, &TickKey::new(*pool_id, tick_lower)?)?;
    let upper = get_tick(ticks, &TickKey::new(*pool_id, tick_upper)?)?;
    growth_inside(
        pool.incentives_per_liquidity,
        lower.incentives_outside,
        upper.incentives_outside,
        tick_lower,
        tick_upper,
        current_tick,
    )
}

/// Amount owed for `liquidity` given growth now versus the last snapshot.
pub fn collectable_amount(
    liquidity: u64,
    growth_now: Q96,
    growth_last: Q96,
) -> Result<u128, DexError> {
    let delta = growth_now.sub(growth_last)?;
    Ok(Q96::from_int(liquidity as u128).mul(delta)?.round_down())
}

/// Flips a tick's outside snapshots against the current globals; called
/// exactly once per crossing.
pub fn flip_tick_growth_outside(
    record: &mut TickRecord,
    fee_growth_global_0: Q96,
    fee_growth_global_1: Q96,
    incentives_per_liquidity: Q96,
) -> Result<(), DexError> {
    record.fee_growth_outside_0 = fee_growth_global_0.sub(record.fee_growth_outside_0)?;
    record.fee_growth_outside_1 = fee_growth_global_1.sub(record.fee_growth_outside_1)?;
    record.incentives_outside = incentives_per_liquidity.sub(record.incentives_outside)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::PoolCreationSetting,
        store::{put_tick, MemStore},
        tests::pool_id_of,
        tests::{TOKEN_X, TOKEN_Y},
    };

    fn incentivized_state(pool_id: PoolId, multiplier: u32, total: u32) -> DexGlobalState {
        DexGlobalState {
            position_counter: 0,
            pool_creation_settings: vec![PoolCreationSetting {
                fee_tier: 3000,
                tick_spacing: 60,
            }],
            incentivized_pools: vec![(pool_id, multiplier)],
            total_incentives_multiplier: total,
        }
    }

    #[test]
    fn rate_apportioned_by_multiplier() {
        let pool_id = pool_id_of(*TOKEN_X, *TOKEN_Y, 3000);
        let state = incentivized_state(pool_id, 2, 5);
        assert_eq!(
            pool_incentive_rate(&state, &pool_id),
            INCENTIVES_PER_BLOCK * 2 / 5
        );
        let other = pool_id_of(*TOKEN_X, *TOKEN_Y, 10000);
        assert_eq!(pool_incentive_rate(&state, &other), 0);
    }

    #[test]
    fn accumulator_advances_with_height() {
        let pool_id = pool_id_of(*TOKEN_X, *TOKEN_Y, 3000);
        let state = incentivized_state(pool_id, 1, 1);
        let mut pool = Pool::new(Q96::ONE, 60, 100).unwrap();
        pool.liquidity = 1000;
        update_pool_incentives(&mut pool, &state, &pool_id, 110).unwrap();
        assert_eq!(pool.height_incentives_update, 110);
        let expected = Q96::from_int(INCENTIVES_PER_BLOCK as u128 * 10)
            .div(Q96::from_int(1000))
            .unwrap();
        assert_eq!(pool.incentives_per_liquidity, expected);
    }

    #[test]
    fn zero_liquidity_accrues_nothing() {
        let pool_id = pool_id_of(*TOKEN_X, *TOKEN_Y, 3000);
        let state = incentivized_state(pool_id, 1, 1);
        let mut pool = Pool::new(Q96::ONE, 60, 100).unwrap();
        update_pool_incentives(&mut pool, &state, &pool_id, 200).unwrap();
        assert_eq!(pool.incentives_per_liquidity, Q96::ZERO);
        assert_eq!(pool.height_incentives_update, 200);
    }

    #[test]
    fn height_regression_rejected() {
        let pool_id = pool_id_of(*TOKEN_X, *TOKEN_Y, 3000);
        let state = incentivized_state(pool_id, 1, 1);
        let pool = Pool::new(Q96::ONE, 60, 100).unwrap();
        assert_eq!(
            compute_new_incentives_per_liquidity(&state, &pool_id, &pool, 99).unwrap_err(),
            DexError::InvalidParameters
        );
    }

    #[test]
    fn growth_inside_three_cases() {
        let pool_id = pool_id_of(*TOKEN_X, *TOKEN_Y, 3000);
        let mut ticks = MemStore::new();
        let mut pool = Pool::new(Q96::ONE, 60, 0).unwrap();
        pool.fee_growth_global_0 = Q96::from_int(10);
        // current tick 0 sits inside [-60, 60): lower outside 4, upper 1
        put_tick(
            &mut ticks,
            &TickKey::new(pool_id, -60).unwrap(),
            &TickRecord {
                liquidity_gross: 1,
                fee_growth_outside_0: Q96::from_int(4),
                ..TickRecord::default()
            },
        )
        .unwrap();
        put_tick(
            &mut ticks,
            &TickKey::new(pool_id, 60).unwrap(),
            &TickRecord {
                liquidity_gross: 1,
                fee_growth_outside_0: Q96::from_int(1),
                ..TickRecord::default()
            },
        )
        .unwrap();
        let (inside_0, inside_1) = fee_growth_inside(&ticks, &pool_id, &pool, -60, 60).unwrap();
        assert_eq!(inside_0, Q96::from_int(5));
        assert_eq!(inside_1, Q96::ZERO);
    }

    #[test]
    fn missing_tick_is_an_error() {
        let pool_id = pool_id_of(*TOKEN_X, *TOKEN_Y, 3000);
        let ticks = MemStore::new();
        let pool = Pool::new(Q96::ONE, 60, 0).unwrap();
        assert_eq!(
            fee_growth_inside(&ticks, &pool_id, &pool, -60, 60).unwrap_err(),
            DexError::TickNotFound
        );
    }

    #[test]
    fn collectable_scales_with_liquidity() {
        let owed =
            collectable_amount(500, Q96::from_int(3), Q96::from_int(1)).unwrap();
        assert_eq!(owed, 1000);
    }
}
