mod q96;
pub use q96::Q96;

mod tick_math;
pub(crate) use tick_math::floor_tick;
pub use tick_math::{price_to_tick, tick_to_price};

mod swap_math;
pub use swap_math::{compute_next_price, get_amount_0_delta, get_amount_1_delta};

mod liquidity_math;
pub use liquidity_math::add_delta;
