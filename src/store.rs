//! Key-value store collaborator and typed access on top of it.
//!
//! One [`TableStore`] instance backs one logical table (pools, ticks,
//! positions, global state). The core never owns state: every operation
//! reads current records, computes new ones, and hands them back through
//! `set`/`delete`. Atomicity of a whole state transition is the
//! collaborator's responsibility.

use crate::{
    constants::{MAX_TICK, MIN_TICK, POOL_ID_LENGTH},
    entities::{DexGlobalState, Pool, Position, TickRecord},
    error::DexError,
    keys::{PoolId, PositionKey, TickKey, TokenId},
};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Ordered byte-keyed table, lexicographic key space.
pub trait TableStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    fn set(&mut self, key: &[u8], value: &[u8]);

    fn delete(&mut self, key: &[u8]);

    /// All `(key, value)` pairs with `start <= key <= end`, ordered by key,
    /// reversed when `reverse` is set.
    fn iterate(&self, start: &[u8], end: &[u8], reverse: bool) -> Vec<(Vec<u8>, Vec<u8>)>;

    /// First entry of the range scan. Implementations should override this
    /// with a native length-1 seek rather than materializing the range.
    fn seek(&self, start: &[u8], end: &[u8], reverse: bool) -> Option<(Vec<u8>, Vec<u8>)> {
        self.iterate(start, end, reverse).into_iter().next()
    }
}

/// BTreeMap-backed store, the reference implementation used in tests and by
/// dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn has(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.entries.insert(key.to_vec(), value.to_vec());
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    fn iterate(&self, start: &[u8], end: &[u8], reverse: bool) -> Vec<(Vec<u8>, Vec<u8>)> {
        if start > end {
            return Vec::new();
        }
        let range = self
            .entries
            .range::<[u8], _>((Bound::Included(start), Bound::Included(end)))
            .map(|(key, value)| (key.clone(), value.clone()));
        if reverse {
            let mut entries: Vec<_> = range.collect();
            entries.reverse();
            entries
        } else {
            range.collect()
        }
    }

    fn seek(&self, start: &[u8], end: &[u8], reverse: bool) -> Option<(Vec<u8>, Vec<u8>)> {
        if start > end {
            return None;
        }
        let mut range = self
            .entries
            .range::<[u8], _>((Bound::Included(start), Bound::Included(end)));
        let found = if reverse { range.next_back() } else { range.next() };
        found.map(|(key, value)| (key.clone(), value.clone()))
    }
}

/// Copy-on-write view over a base store.
///
/// Dry runs execute the real swap engine against an overlay, so quoting
/// never mutates committed state and every candidate is evaluated against
/// the same snapshot.
#[derive(Debug)]
pub struct OverlayStore<'a, S: TableStore> {
    base: &'a S,
    written: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a, S: TableStore> OverlayStore<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            written: BTreeMap::new(),
        }
    }
}

impl<S: TableStore> TableStore for OverlayStore<'_, S> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.written.get(key) {
            Some(entry) => entry.clone(),
            None => self.base.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.written.insert(key.to_vec(), Some(value.to_vec()));
    }

    fn delete(&mut self, key: &[u8]) {
        self.written.insert(key.to_vec(), None);
    }

    fn iterate(&self, start: &[u8], end: &[u8], reverse: bool) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.base.iterate(start, end, false).into_iter().collect();
        for (key, entry) in self
            .written
            .range::<[u8], _>((Bound::Included(start), Bound::Included(end)))
        {
            match entry {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        let mut entries: Vec<_> = merged.into_iter().collect();
        if reverse {
            entries.reverse();
        }
        entries
    }
}

const GLOBAL_STATE_KEY: &[u8] = &[];

/// Loads the singleton global state; absent means default.
pub fn load_global<S: TableStore>(global: &S) -> Result<DexGlobalState, DexError> {
    match global.get(GLOBAL_STATE_KEY) {
        Some(bytes) => DexGlobalState::decode(&bytes),
        None => Ok(DexGlobalState::default()),
    }
}

pub fn save_global<S: TableStore>(global: &mut S, state: &DexGlobalState) -> Result<(), DexError> {
    global.set(GLOBAL_STATE_KEY, &state.encode()?);
    Ok(())
}

pub fn find_pool<S: TableStore>(pools: &S, pool_id: &PoolId) -> Result<Option<Pool>, DexError> {
    pools
        .get(pool_id.as_bytes())
        .map(|bytes| Pool::decode(&bytes))
        .transpose()
}

pub fn get_pool<S: TableStore>(pools: &S, pool_id: &PoolId) -> Result<Pool, DexError> {
    find_pool(pools, pool_id)?.ok_or(DexError::PoolNotFound)
}

pub fn put_pool<S: TableStore>(
    pools: &mut S,
    pool_id: &PoolId,
    pool: &Pool,
) -> Result<(), DexError> {
    pools.set(pool_id.as_bytes(), &pool.encode()?);
    Ok(())
}

/// Every pool in the store, in key order.
pub fn all_pools<S: TableStore>(pools: &S) -> Result<Vec<(PoolId, Pool)>, DexError> {
    pools
        .iterate(&[0_u8; POOL_ID_LENGTH], &[0xff_u8; POOL_ID_LENGTH], false)
        .into_iter()
        .map(|(key, value)| Ok((PoolId::from_bytes(&key)?, Pool::decode(&value)?)))
        .collect()
}

/// Pools connecting a token pair, any fee tier, in key order.
pub fn pools_for_pair<S: TableStore>(
    pools: &S,
    token_a: TokenId,
    token_b: TokenId,
) -> Result<Vec<(PoolId, Pool)>, DexError> {
    let low = PoolId::new(token_a, token_b, 0)?;
    let high = PoolId::new(token_a, token_b, u32::MAX)?;
    pools
        .iterate(low.as_bytes(), high.as_bytes(), false)
        .into_iter()
        .map(|(key, value)| Ok((PoolId::from_bytes(&key)?, Pool::decode(&value)?)))
        .collect()
}

pub fn find_tick<S: TableStore>(ticks: &S, key: &TickKey) -> Result<Option<TickRecord>, DexError> {
    ticks
        .get(&key.to_bytes())
        .map(|bytes| TickRecord::decode(&bytes))
        .transpose()
}

pub fn get_tick<S: TableStore>(ticks: &S, key: &TickKey) -> Result<TickRecord, DexError> {
    find_tick(ticks, key)?.ok_or(DexError::TickNotFound)
}

pub fn put_tick<S: TableStore>(
    ticks: &mut S,
    key: &TickKey,
    record: &TickRecord,
) -> Result<(), DexError> {
    ticks.set(&key.to_bytes(), &record.encode()?);
    Ok(())
}

pub fn delete_tick<S: TableStore>(ticks: &mut S, key: &TickKey) {
    ticks.delete(&key.to_bytes());
}

pub fn find_position<S: TableStore>(
    positions: &S,
    key: &PositionKey,
) -> Result<Option<Position>, DexError> {
    positions
        .get(&key.to_bytes())
        .map(|bytes| Position::decode(&bytes))
        .transpose()
}

pub fn get_position<S: TableStore>(
    positions: &S,
    key: &PositionKey,
) -> Result<Position, DexError> {
    find_position(positions, key)?.ok_or(DexError::PositionNotFound)
}

pub fn put_position<S: TableStore>(
    positions: &mut S,
    key: &PositionKey,
    position: &Position,
) -> Result<(), DexError> {
    positions.set(&key.to_bytes(), &position.encode()?);
    Ok(())
}

/// Smallest initialized tick of the pool with index `>= tick`.
pub(crate) fn next_tick_geq<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    tick: i64,
) -> Result<Option<(i32, TickRecord)>, DexError> {
    if tick > MAX_TICK as i64 {
        return Ok(None);
    }
    let start = TickKey::new(*pool_id, (tick.max(MIN_TICK as i64)) as i32)?.to_bytes();
    let end = TickKey::new(*pool_id, MAX_TICK)?.to_bytes();
    decode_seek(ticks.seek(&start, &end, false))
}

/// Largest initialized tick of the pool with index `<= tick`.
pub(crate) fn prev_tick_leq<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    tick: i64,
) -> Result<Option<(i32, TickRecord)>, DexError> {
    if tick < MIN_TICK as i64 {
        return Ok(None);
    }
    let start = TickKey::new(*pool_id, MIN_TICK)?.to_bytes();
    let end = TickKey::new(*pool_id, (tick.min(MAX_TICK as i64)) as i32)?.to_bytes();
    decode_seek(ticks.seek(&start, &end, true))
}

/// Next initialized tick strictly above the given one, `None` at the upper
/// end of the pool's range.
pub fn get_next_tick<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    tick: i32,
) -> Result<Option<(i32, TickRecord)>, DexError> {
    next_tick_geq(ticks, pool_id, tick as i64 + 1)
}

/// Previous initialized tick strictly below the given one, `None` at the
/// lower end of the pool's range.
pub fn get_prev_tick<S: TableStore>(
    ticks: &S,
    pool_id: &PoolId,
    tick: i32,
) -> Result<Option<(i32, TickRecord)>, DexError> {
    prev_tick_leq(ticks, pool_id, tick as i64 - 1)
}

fn decode_seek(
    found: Option<(Vec<u8>, Vec<u8>)>,
) -> Result<Option<(i32, TickRecord)>, DexError> {
    found
        .map(|(key, value)| {
            let tick = crate::keys::bytes_to_tick(&key[POOL_ID_LENGTH..])?;
            Ok((tick, TickRecord::decode(&value)?))
        })
        .transpose()
}
