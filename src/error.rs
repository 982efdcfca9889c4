#[cfg(doc)]
use crate::prelude::*;

/// Errors produced by the DEX core.
///
/// Every failure is local and synchronous; a failing operation leaves all
/// external state untouched, and the command layer surfaces the failure as a
/// rejected transaction.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, thiserror::Error)]
pub enum DexError {
    /// Tick outside `[MIN_TICK, MAX_TICK]`, `tick_lower >= tick_upper`, or a
    /// tick not aligned to the pool's tick spacing.
    #[error("Invalid tick or tick range")]
    InvalidTickRange,

    /// A Q96 value exceeds the 24-byte encoding bound, or a subtraction
    /// underflowed.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Division with a zero denominator.
    #[error("Division by zero")]
    DivisionByZero,

    /// A delta or price-step computation was attempted with zero liquidity.
    #[error("Zero liquidity")]
    ZeroLiquidity,

    /// A swap crossed more than [`MAX_HOPS_SWAP`] initialized ticks.
    #[error("Too many ticks crossed")]
    TooManyTicksCrossed,

    /// A route hop does not connect to the running token, or the route is
    /// otherwise unusable.
    #[error("Invalid swap route")]
    InvalidSwapRoute,

    /// No path of pools connects the input token to the output token.
    #[error("No route found")]
    NoRouteFound,

    /// Realized output below the caller's minimum, or required input above
    /// the caller's maximum.
    #[error("Slippage limit exceeded")]
    SlippageExceeded,

    /// The referenced position does not exist.
    #[error("Position not found")]
    PositionNotFound,

    /// The referenced pool does not exist.
    #[error("Pool not found")]
    PoolNotFound,

    /// The referenced tick record does not exist.
    #[error("Tick not found")]
    TickNotFound,

    /// Malformed operation input: empty or oversized route, identical input
    /// and output tokens, zero amount, a price limit on the wrong side of
    /// the current price, or invalid creation parameters.
    #[error("Invalid parameters")]
    InvalidParameters,
}
