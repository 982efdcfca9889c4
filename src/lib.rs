//! # rangedex
//!
//! Core of a concentrated-liquidity exchange embedded in a ledger
//! application: parties supply liquidity into discrete price ranges and swap
//! against it, with exact Q96 fixed-point arithmetic throughout.
//!
//! ## Features
//!
//! - Q96 fixed-point arithmetic over [alloy-rs](https://github.com/alloy-rs)
//!   integer types, with full-width intermediates
//! - Tick ↔ sqrt-price conversion pinned to the protocol's historical
//!   rounding behavior
//! - A bounded swap engine that walks liquidity across initialized ticks,
//!   plus multi-hop dry-run quoting over copy-on-write state
//! - Position bookkeeping with fee and incentive growth accounting
//! - Route discovery over the token graph with a native-token fallback
//!
//! The core owns no state and performs no I/O: stores and the asset-custody
//! collaborator are injected into every operation, and a failed operation
//! relies on the collaborator's transactional commit to leave external state
//! untouched.

pub mod constants;
pub mod custody;
pub mod entities;
pub mod error;
pub mod growth;
pub mod keys;
pub mod liquidity;
pub mod math;
pub mod router;
pub mod store;
pub mod swap;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::{
        constants::*, custody::*, entities::*, error::*, growth::*, keys::*, liquidity::*,
        math::*, router::*, store::*, swap::*,
    };
}
