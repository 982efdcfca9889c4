use crate::error::DexError;

/// Applies a signed liquidity delta to a pool's active liquidity, failing on
/// overflow or underflow.
pub fn add_delta(liquidity: u64, delta: i128) -> Result<u64, DexError> {
    let updated = (liquidity as i128)
        .checked_add(delta)
        .ok_or(DexError::ArithmeticOverflow)?;
    u64::try_from(updated).map_err(|_| DexError::ArithmeticOverflow)
}
