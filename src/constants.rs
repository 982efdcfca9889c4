use alloy_primitives::{uint, U256};

/// The maximum tick that may be passed to [`tick_to_price`].
///
/// [`tick_to_price`]: crate::math::tick_to_price
pub const MAX_TICK: i32 = 887272;
/// The minimum tick that may be passed to [`tick_to_price`].
pub const MIN_TICK: i32 = -MAX_TICK;

/// Number of bit positions needed to cover `MAX_TICK` (`MAX_TICK < 2^20`).
pub const TICK_BITS: usize = 20;

/// Sqrt price at [`MIN_TICK`], the lower bound of every pool price.
pub const MIN_SQRT_RATIO: U256 = uint!(4295128738_U256);
/// Sqrt price at [`MAX_TICK`], the upper bound of every pool price.
pub const MAX_SQRT_RATIO: U256 =
    uint!(1461446703529909599612049957420313862569572983184_U256);

/// Maximum byte length of a serialized [`Q96`] value.
///
/// [`Q96`]: crate::math::Q96
pub const MAX_NUM_BYTES_Q96: usize = 24;

/// Hard cap on both the number of pools in a swap route and the number of
/// initialized ticks a single-pool swap may cross.
pub const MAX_HOPS_SWAP: u32 = 5;

/// Fee tiers are expressed in parts per million of the swapped amount.
pub const FEE_TIER_PARTITION: u64 = 1_000_000;

/// Native token units distributed to incentivized pools per block.
pub const INCENTIVES_PER_BLOCK: u64 = 100_000_000;

/// Byte width of a token identifier.
pub const TOKEN_ID_LENGTH: usize = 8;
/// Byte width of an account address.
pub const ADDRESS_LENGTH: usize = 20;
/// Byte width of a serialized pool identifier.
pub const POOL_ID_LENGTH: usize = 2 * TOKEN_ID_LENGTH + 4;

/// Offset added to a tick before serialization so that byte-lexicographic
/// order of tick keys equals numeric tick order.
pub const TICK_OFFSET: u32 = 1 << 31;

/// Q96 representation of the integer 1.
pub const ONE_Q96: U256 = uint!(0x1000000000000000000000000_U256);
