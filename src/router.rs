//! Route discovery over the token graph.
//!
//! Tokens are vertices and pools are edges. Regular discovery is a
//! breadth-first search by hop count over pools that currently hold
//! liquidity; the exceptional fallback routes through the native token and
//! drops the liquidity requirement. Pool selection for a concrete hop is
//! delegated to dry-run quoting, which never commits state.

use crate::{
    constants::MAX_HOPS_SWAP,
    error::DexError,
    keys::{PoolId, TokenId, NATIVE_TOKEN_ID},
    store::{all_pools, pools_for_pair, TableStore},
    swap::{dry_run_swap_exact_in, dry_run_swap_exact_out, SwapQuote},
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// Finds the shortest token path from `token_in` to `token_out` using only
/// pools with active liquidity, bounded by [`MAX_HOPS_SWAP`] hops.
pub fn compute_regular_route<S: TableStore>(
    pools: &S,
    token_in: TokenId,
    token_out: TokenId,
) -> Result<Vec<TokenId>, DexError> {
    if token_in == token_out {
        return Err(DexError::InvalidParameters);
    }
    let mut adjacency: BTreeMap<TokenId, BTreeSet<TokenId>> = BTreeMap::new();
    for (pool_id, pool) in all_pools(pools)? {
        if pool.liquidity == 0 {
            continue;
        }
        adjacency
            .entry(pool_id.token_0())
            .or_default()
            .insert(pool_id.token_1());
        adjacency
            .entry(pool_id.token_1())
            .or_default()
            .insert(pool_id.token_0());
    }

    let mut parents: BTreeMap<TokenId, TokenId> = BTreeMap::new();
    let mut visited: BTreeSet<TokenId> = BTreeSet::from([token_in]);
    let mut queue: VecDeque<(TokenId, u32)> = VecDeque::from([(token_in, 0)]);
    while let Some((token, hops)) = queue.pop_front() {
        if hops == MAX_HOPS_SWAP {
            continue;
        }
        let Some(neighbors) = adjacency.get(&token) else {
            continue;
        };
        for next in neighbors {
            if !visited.insert(*next) {
                continue;
            }
            parents.insert(*next, token);
            if *next == token_out {
                let mut path = vec![token_out];
                let mut cursor = token_out;
                while cursor != token_in {
                    cursor = parents[&cursor];
                    path.push(cursor);
                }
                path.reverse();
                debug!(hops = path.len() - 1, "regular route found");
                return Ok(path);
            }
            queue.push_back((*next, hops + 1));
        }
    }
    Err(DexError::NoRouteFound)
}

/// Fallback path through the native token, consulted only when no regular
/// route exists. Pool existence is enough here; a zero-liquidity leg still
/// fails later at execution, but the canonical path is reported.
pub fn compute_exceptional_route<S: TableStore>(
    pools: &S,
    token_in: TokenId,
    token_out: TokenId,
) -> Result<Vec<TokenId>, DexError> {
    if token_in == token_out {
        return Err(DexError::InvalidParameters);
    }
    let entries = all_pools(pools)?;
    let connected = |a: TokenId, b: TokenId| {
        entries
            .iter()
            .any(|(pool_id, _)| pool_id.involves_token(a) && pool_id.involves_token(b))
    };
    if token_in == NATIVE_TOKEN_ID || token_out == NATIVE_TOKEN_ID {
        if connected(token_in, token_out) {
            return Ok(vec![token_in, token_out]);
        }
        return Err(DexError::NoRouteFound);
    }
    if connected(token_in, NATIVE_TOKEN_ID) && connected(NATIVE_TOKEN_ID, token_out) {
        return Ok(vec![token_in, NATIVE_TOKEN_ID, token_out]);
    }
    Err(DexError::NoRouteFound)
}

/// Regular route if one exists, otherwise the exceptional fallback.
pub fn find_route<S: TableStore>(
    pools: &S,
    token_in: TokenId,
    token_out: TokenId,
) -> Result<Vec<TokenId>, DexError> {
    match compute_regular_route(pools, token_in, token_out) {
        Err(DexError::NoRouteFound) => compute_exceptional_route(pools, token_in, token_out),
        route => route,
    }
}

/// Among pools directly connecting two tokens, the one quoting the best
/// outcome for the given amount: highest output for exact input, lowest
/// input for exact output.
#[allow(clippy::too_many_arguments)]
pub fn get_optimal_swap_pool<S: TableStore>(
    pools: &S,
    ticks: &S,
    global: &S,
    token_in: TokenId,
    token_out: TokenId,
    amount: u128,
    exact_input: bool,
    height: u32,
) -> Result<(PoolId, SwapQuote), DexError> {
    let candidates = pools_for_pair(pools, token_in, token_out)?;
    if candidates.is_empty() {
        return Err(DexError::PoolNotFound);
    }
    let mut best: Option<(PoolId, SwapQuote)> = None;
    for (pool_id, _) in candidates {
        let quoted = if exact_input {
            dry_run_swap_exact_in(
                pools,
                ticks,
                global,
                token_in,
                amount,
                token_out,
                0,
                &[pool_id],
                height,
            )
        } else {
            dry_run_swap_exact_out(
                pools,
                ticks,
                global,
                token_in,
                u128::MAX,
                token_out,
                amount,
                &[pool_id],
                height,
            )
        };
        // unusable candidates (no liquidity, bounds) simply drop out
        let Ok(quote) = quoted else {
            continue;
        };
        let better = match &best {
            None => true,
            Some((_, current)) => {
                if exact_input {
                    quote.amount_out > current.amount_out
                } else {
                    quote.amount_in < current.amount_in
                }
            }
        };
        if better {
            best = Some((pool_id, quote));
        }
    }
    best.ok_or(DexError::NoRouteFound)
}

/// Materializes a token path into a pool route by picking the optimal pool
/// for every hop, propagating the running amount along the path.
#[allow(clippy::too_many_arguments)]
pub fn build_pool_route<S: TableStore>(
    pools: &S,
    ticks: &S,
    global: &S,
    token_path: &[TokenId],
    amount: u128,
    exact_input: bool,
    height: u32,
) -> Result<Vec<PoolId>, DexError> {
    if token_path.len() < 2 || token_path.len() > MAX_HOPS_SWAP as usize + 1 {
        return Err(DexError::InvalidParameters);
    }
    let mut route = Vec::with_capacity(token_path.len() - 1);
    let mut current_amount = amount;
    if exact_input {
        for pair in token_path.windows(2) {
            let (pool_id, quote) = get_optimal_swap_pool(
                pools,
                ticks,
                global,
                pair[0],
                pair[1],
                current_amount,
                true,
                height,
            )?;
            route.push(pool_id);
            current_amount = quote.amount_out;
        }
    } else {
        for pair in token_path.windows(2).rev() {
            let (pool_id, quote) = get_optimal_swap_pool(
                pools,
                ticks,
                global,
                pair[0],
                pair[1],
                current_amount,
                false,
                height,
            )?;
            route.push(pool_id);
            current_amount = quote.amount_in;
        }
        route.reverse();
    }
    Ok(route)
}
