//! The swap engine: a bounded segment loop within one pool, and multi-hop
//! route execution on top of it.
//!
//! A segment is the price movement between two adjacent initialized ticks
//! (or a price limit / outer bound, whichever is nearer in the swap
//! direction). Crossing an initialized tick applies its signed liquidity and
//! flips its growth-outside snapshots; the crossing count is hard-capped so
//! a single swap can never do unbounded work.

use crate::{
    constants::{FEE_TIER_PARTITION, MAX_HOPS_SWAP, MAX_SQRT_RATIO, MIN_SQRT_RATIO},
    error::DexError,
    growth::{flip_tick_growth_outside, update_pool_incentives},
    keys::{PoolId, TickKey, TokenId},
    math::{
        add_delta, compute_next_price, floor_tick, get_amount_0_delta, get_amount_1_delta,
        tick_to_price, Q96,
    },
    store::{
        get_pool, load_global, next_tick_geq, prev_tick_leq, put_pool, put_tick, OverlayStore,
        TableStore,
    },
};
use alloy_primitives::U256;
use tracing::{debug, trace};

/// Outcome of a single-pool swap. Amounts exclude fees; `amount_out` is net
/// to the taker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_in: u128,
    pub amount_out: u128,
    pub fees_in: u128,
    pub fees_out: u128,
}

/// Quote produced by a multi-hop dry run. Prices are full (non-sqrt) Q96
/// prices of the output token in terms of the input token, before and after
/// the hypothetical execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_in: u128,
    pub amount_out: u128,
    pub price_before: Q96,
    pub price_after: Q96,
}

/// Executes a swap against one pool, walking liquidity across initialized
/// ticks until the amount is consumed, the price limit is reached, or no
/// further movement is possible.
///
/// `amount` is input-denominated when `exact_input` is set, output-denominated
/// otherwise. The fee tier is charged half on the input side and half on the
/// output side of every segment; each half accrues to the fee-growth
/// accumulator of the token it was collected in.
#[allow(clippy::too_many_arguments)]
pub fn swap<S: TableStore, G: TableStore>(
    pools: &mut S,
    ticks: &mut S,
    global: &G,
    pool_id: &PoolId,
    zero_to_one: bool,
    sqrt_price_limit: Q96,
    amount: u128,
    exact_input: bool,
    height: u32,
) -> Result<SwapResult, DexError> {
    let mut pool = get_pool(pools, pool_id)?;
    if amount == 0 {
        return Err(DexError::InvalidParameters);
    }
    if *sqrt_price_limit < MIN_SQRT_RATIO || *sqrt_price_limit > MAX_SQRT_RATIO {
        return Err(DexError::InvalidParameters);
    }
    if (zero_to_one && sqrt_price_limit > pool.sqrt_price)
        || (!zero_to_one && sqrt_price_limit < pool.sqrt_price)
    {
        return Err(DexError::InvalidParameters);
    }

    let global_state = load_global(global)?;
    update_pool_incentives(&mut pool, &global_state, pool_id, height)?;

    let fee_tier = pool_id.fee_tier();
    let mut price = pool.sqrt_price;
    let mut liquidity = pool.liquidity;
    let mut fee_growth_0 = pool.fee_growth_global_0;
    let mut fee_growth_1 = pool.fee_growth_global_1;
    // A tick counts as applied iff its price is at or below the pool price,
    // so the anchor must be the exact floor tick of the price.
    let mut anchor = floor_tick(price)?;
    let mut remaining = amount;
    let mut result = SwapResult::default();
    let mut ticks_crossed = 0_u32;

    while remaining > 0 && price != sqrt_price_limit {
        let boundary = if zero_to_one {
            prev_tick_leq(ticks, pool_id, anchor as i64)?
        } else {
            next_tick_geq(ticks, pool_id, anchor as i64 + 1)?
        };
        let boundary_price = match &boundary {
            Some((tick, _)) => tick_to_price(*tick)?,
            None => outer_bound(zero_to_one),
        };
        let target = if zero_to_one {
            boundary_price.max(sqrt_price_limit)
        } else {
            boundary_price.min(sqrt_price_limit)
        };

        // price that would consume the whole remaining amount here; a
        // failing denominator means the segment's liquidity cannot absorb
        // it, which clamps to the target anyway
        let adjusted = if exact_input {
            input_net_of_fee(remaining, fee_tier)
        } else {
            output_gross_of_fee(remaining, fee_tier)?
        };
        let full = match compute_next_price(
            price,
            liquidity as u128,
            adjusted,
            zero_to_one == exact_input,
            exact_input,
        ) {
            Ok(full) => full,
            Err(DexError::ArithmeticOverflow) | Err(DexError::DivisionByZero) => {
                outer_bound(zero_to_one)
            }
            Err(error) => return Err(error),
        };
        let step_price = if zero_to_one {
            full.max(target)
        } else {
            full.min(target)
        };
        let stalled = step_price == price;

        let (step_in, step_out) = if stalled {
            (0, 0)
        } else if zero_to_one {
            (
                get_amount_0_delta(step_price, price, liquidity as u128, true)?,
                get_amount_1_delta(step_price, price, liquidity as u128, false)?,
            )
        } else {
            (
                get_amount_1_delta(price, step_price, liquidity as u128, true)?,
                get_amount_0_delta(price, step_price, liquidity as u128, false)?,
            )
        };
        let step_fee_in = fee_amount(step_in, fee_tier);
        let step_fee_out = fee_amount(step_out, fee_tier);

        if exact_input {
            remaining = remaining.saturating_sub(step_in + step_fee_in);
        } else {
            remaining = remaining.saturating_sub(step_out - step_fee_out);
        }
        result.amount_in += step_in;
        result.amount_out += step_out - step_fee_out;
        result.fees_in += step_fee_in;
        result.fees_out += step_fee_out;

        if liquidity > 0 {
            let (growth_in, growth_out) = if zero_to_one {
                (&mut fee_growth_0, &mut fee_growth_1)
            } else {
                (&mut fee_growth_1, &mut fee_growth_0)
            };
            if step_fee_in > 0 {
                *growth_in = growth_in.add(fee_per_liquidity(step_fee_in, liquidity)?)?;
            }
            if step_fee_out > 0 {
                *growth_out = growth_out.add(fee_per_liquidity(step_fee_out, liquidity)?)?;
            }
        }

        price = step_price;
        trace!(
            step_in,
            step_out,
            remaining,
            "swap segment settled"
        );

        if let Some((tick, mut record)) = boundary {
            if price == boundary_price {
                // Upward crossings apply on arrival. Downward ones apply on
                // departure: a swap ending exactly on the boundary leaves
                // the tick applied, and the next downward segment starts
                // with a zero-width crossing instead.
                if zero_to_one && (remaining == 0 || price == sqrt_price_limit) {
                    break;
                }
                flip_tick_growth_outside(
                    &mut record,
                    fee_growth_0,
                    fee_growth_1,
                    pool.incentives_per_liquidity,
                )?;
                put_tick(ticks, &TickKey::new(*pool_id, tick)?, &record)?;
                let net = if zero_to_one {
                    -record.liquidity_net
                } else {
                    record.liquidity_net
                };
                liquidity = add_delta(liquidity, net)?;
                ticks_crossed += 1;
                if ticks_crossed > MAX_HOPS_SWAP {
                    return Err(DexError::TooManyTicksCrossed);
                }
                trace!(tick, liquidity, "crossed initialized tick");
                anchor = if zero_to_one { tick - 1 } else { tick };
                continue;
            }
        }
        if stalled {
            break;
        }
    }

    pool.sqrt_price = price;
    pool.liquidity = liquidity;
    pool.fee_growth_global_0 = fee_growth_0;
    pool.fee_growth_global_1 = fee_growth_1;
    put_pool(pools, pool_id, &pool)?;

    debug!(
        ?pool_id,
        zero_to_one,
        exact_input,
        amount_in = result.amount_in,
        amount_out = result.amount_out,
        ticks_crossed,
        "swap executed"
    );
    Ok(result)
}

/// Full Q96 price of traversing `route` starting from `token_in`: the
/// product of every hop's squared sqrt price, oriented to the running token.
pub fn compute_current_price<S: TableStore>(
    pools: &S,
    route: &[PoolId],
    token_in: TokenId,
) -> Result<Q96, DexError> {
    let mut price = Q96::ONE;
    let mut current_token = token_in;
    for pool_id in route {
        let pool = get_pool(pools, pool_id)?;
        let squared = pool.sqrt_price.mul(pool.sqrt_price)?;
        let oriented = if current_token == pool_id.token_0() {
            current_token = pool_id.token_1();
            squared
        } else if current_token == pool_id.token_1() {
            current_token = pool_id.token_0();
            squared.invert()?
        } else {
            return Err(DexError::InvalidSwapRoute);
        };
        price = price.mul(oriented)?;
    }
    Ok(price)
}

/// Quotes an exact-input swap along `route` without touching committed
/// state, failing if the realized output falls below `min_amount_out`.
#[allow(clippy::too_many_arguments)]
pub fn dry_run_swap_exact_in<S: TableStore>(
    pools: &S,
    ticks: &S,
    global: &S,
    token_in: TokenId,
    amount_in: u128,
    token_out: TokenId,
    min_amount_out: u128,
    route: &[PoolId],
    height: u32,
) -> Result<SwapQuote, DexError> {
    validate_route(token_in, token_out, amount_in, route)?;
    let price_before = compute_current_price(pools, route, token_in)?;

    let mut pools_scratch = OverlayStore::new(pools);
    let mut ticks_scratch = OverlayStore::new(ticks);
    let mut current_token = token_in;
    let mut current_amount = amount_in;
    for pool_id in route {
        let zero_to_one = hop_direction_from_input(pool_id, current_token)?;
        let result = swap(
            &mut pools_scratch,
            &mut ticks_scratch,
            global,
            pool_id,
            zero_to_one,
            outer_bound(zero_to_one),
            current_amount,
            true,
            height,
        )?;
        current_amount = result.amount_out;
        current_token = if zero_to_one {
            pool_id.token_1()
        } else {
            pool_id.token_0()
        };
    }
    if current_token != token_out {
        return Err(DexError::InvalidSwapRoute);
    }
    if current_amount < min_amount_out {
        return Err(DexError::SlippageExceeded);
    }
    let price_after = compute_current_price(&pools_scratch, route, token_in)?;
    Ok(SwapQuote {
        amount_in,
        amount_out: current_amount,
        price_before,
        price_after,
    })
}

/// Quotes an exact-output swap along `route`, traversing it in reverse to
/// derive the required input, failing if that input exceeds `max_amount_in`.
#[allow(clippy::too_many_arguments)]
pub fn dry_run_swap_exact_out<S: TableStore>(
    pools: &S,
    ticks: &S,
    global: &S,
    token_in: TokenId,
    max_amount_in: u128,
    token_out: TokenId,
    amount_out: u128,
    route: &[PoolId],
    height: u32,
) -> Result<SwapQuote, DexError> {
    validate_route(token_in, token_out, amount_out, route)?;
    let price_before = compute_current_price(pools, route, token_in)?;

    let mut pools_scratch = OverlayStore::new(pools);
    let mut ticks_scratch = OverlayStore::new(ticks);
    let mut current_token = token_out;
    let mut current_amount = amount_out;
    for pool_id in route.iter().rev() {
        let zero_to_one = hop_direction_from_output(pool_id, current_token)?;
        let result = swap(
            &mut pools_scratch,
            &mut ticks_scratch,
            global,
            pool_id,
            zero_to_one,
            outer_bound(zero_to_one),
            current_amount,
            false,
            height,
        )?;
        if result.amount_out < current_amount {
            // the pool cannot produce the requested output
            return Err(DexError::SlippageExceeded);
        }
        current_amount = result.amount_in + result.fees_in;
        current_token = if zero_to_one {
            pool_id.token_0()
        } else {
            pool_id.token_1()
        };
    }
    if current_token != token_in {
        return Err(DexError::InvalidSwapRoute);
    }
    if current_amount > max_amount_in {
        return Err(DexError::SlippageExceeded);
    }
    let price_after = compute_current_price(&pools_scratch, route, token_in)?;
    Ok(SwapQuote {
        amount_in: current_amount,
        amount_out,
        price_before,
        price_after,
    })
}

fn validate_route(
    token_in: TokenId,
    token_out: TokenId,
    amount: u128,
    route: &[PoolId],
) -> Result<(), DexError> {
    if token_in == token_out
        || amount == 0
        || route.is_empty()
        || route.len() > MAX_HOPS_SWAP as usize
    {
        return Err(DexError::InvalidParameters);
    }
    Ok(())
}

fn hop_direction_from_input(pool_id: &PoolId, token_in: TokenId) -> Result<bool, DexError> {
    if token_in == pool_id.token_0() {
        Ok(true)
    } else if token_in == pool_id.token_1() {
        Ok(false)
    } else {
        Err(DexError::InvalidSwapRoute)
    }
}

fn hop_direction_from_output(pool_id: &PoolId, token_out: TokenId) -> Result<bool, DexError> {
    if token_out == pool_id.token_1() {
        Ok(true)
    } else if token_out == pool_id.token_0() {
        Ok(false)
    } else {
        Err(DexError::InvalidSwapRoute)
    }
}

#[inline]
fn outer_bound(zero_to_one: bool) -> Q96 {
    if zero_to_one {
        Q96::from_raw(MIN_SQRT_RATIO)
    } else {
        Q96::from_raw(MAX_SQRT_RATIO)
    }
}

/// Half the fee tier applied to one side of a segment, rounded up.
fn fee_amount(amount: u128, fee_tier: u32) -> u128 {
    if amount == 0 || fee_tier == 0 {
        return 0;
    }
    let numerator = U256::from(amount) * U256::from(fee_tier);
    let denominator = U256::from(2 * FEE_TIER_PARTITION);
    let quotient = numerator / denominator;
    let exact = quotient * denominator == numerator;
    let fee: U256 = if exact {
        quotient
    } else {
        quotient + U256::from(1_u8)
    };
    fee.saturating_to()
}

/// Remaining input usable for price movement once the input-side fee is
/// set aside: `floor(r * 2P / (2P + tier))`.
fn input_net_of_fee(remaining: u128, fee_tier: u32) -> u128 {
    let partition = U256::from(2 * FEE_TIER_PARTITION);
    let scaled = U256::from(remaining) * partition / (partition + U256::from(fee_tier));
    scaled.saturating_to()
}

/// Gross output needed to deliver `remaining` net of the output-side fee:
/// `ceil(r * 2P / (2P - tier))`.
fn output_gross_of_fee(remaining: u128, fee_tier: u32) -> Result<u128, DexError> {
    let partition = U256::from(2 * FEE_TIER_PARTITION);
    let numerator = U256::from(remaining) * partition;
    let denominator = partition - U256::from(fee_tier);
    let quotient = numerator / denominator;
    let gross = if quotient * denominator == numerator {
        quotient
    } else {
        quotient + U256::from(1_u8)
    };
    gross
        .try_into()
        .map_err(|_| DexError::ArithmeticOverflow)
}

/// Fee growth contribution of one collected fee amount: `fee / liquidity`
/// in Q96.
fn fee_per_liquidity(fee: u128, liquidity: u64) -> Result<Q96, DexError> {
    Q96::from_int(fee).div(Q96::from_int(liquidity as u128))
}
