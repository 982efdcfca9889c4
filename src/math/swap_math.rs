//! Token-amount deltas between two prices and the single-step price-impact
//! formula applied once per swap segment.

use crate::{error::DexError, math::Q96};

/// Amount of token0 moved between two sqrt prices at the given liquidity:
/// `liquidity * (upper - lower) / (upper * lower)`.
///
/// The price arguments may be passed in either order. Rounds the result up
/// or down per `round_up`; upward rounding is used wherever the protocol
/// must never under-collect input or over-pay output.
pub fn get_amount_0_delta(
    sqrt_price_a: Q96,
    sqrt_price_b: Q96,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, DexError> {
    if liquidity == 0 {
        return Err(DexError::ZeroLiquidity);
    }
    let (lower, upper) = order(sqrt_price_a, sqrt_price_b);
    let numerator = Q96::from_int(liquidity).mul(upper.sub(lower)?)?;
    let denominator = lower.mul(upper)?;
    if round_up {
        Ok(numerator.div_round_up(denominator)?.round_up())
    } else {
        Ok(numerator.div(denominator)?.round_down())
    }
}

/// Amount of token1 moved between two sqrt prices at the given liquidity:
/// `liquidity * (upper - lower)`.
pub fn get_amount_1_delta(
    sqrt_price_a: Q96,
    sqrt_price_b: Q96,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, DexError> {
    if liquidity == 0 {
        return Err(DexError::ZeroLiquidity);
    }
    let (lower, upper) = order(sqrt_price_a, sqrt_price_b);
    let amount = Q96::from_int(liquidity).mul(upper.sub(lower)?)?;
    if round_up {
        Ok(amount.round_up())
    } else {
        Ok(amount.round_down())
    }
}

/// Price after applying `amount` of one token to a position of `liquidity`
/// at `sqrt_price`.
///
/// For token0 amounts: `liquidity * sqrt_price / (liquidity ± amount *
/// sqrt_price)`, rounded up. For token1 amounts: `sqrt_price ± amount /
/// liquidity`, with the quotient rounded down when adding and up when
/// subtracting. `adds_amount` selects whether the amount enters or leaves
/// the pool.
pub fn compute_next_price(
    sqrt_price: Q96,
    liquidity: u128,
    amount: u128,
    is_token_0: bool,
    adds_amount: bool,
) -> Result<Q96, DexError> {
    if liquidity == 0 {
        return Err(DexError::ZeroLiquidity);
    }
    let liquidity = Q96::from_int(liquidity);
    if is_token_0 {
        let numerator = liquidity.mul(sqrt_price)?;
        let product = Q96::from_int(amount).mul(sqrt_price)?;
        let denominator = if adds_amount {
            liquidity.add(product)?
        } else {
            liquidity.sub(product)?
        };
        numerator.div_round_up(denominator)
    } else if adds_amount {
        let quotient = Q96::from_int(amount).div(liquidity)?;
        sqrt_price.add(quotient)
    } else {
        let quotient = Q96::from_int(amount).div_round_up(liquidity)?;
        sqrt_price.sub(quotient)
    }
}

#[inline]
fn order(a: Q96, b: Q96) -> (Q96, Q96) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
