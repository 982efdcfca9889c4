mod global;
mod pool;
mod position;
mod tick;

pub use global::{DexGlobalState, PoolCreationSetting};
pub use pool::Pool;
pub use position::Position;
pub use tick::TickRecord;

use crate::{error::DexError, math::Q96};

/// Cursor over a serialized entity. Decoding is strict: every read checks
/// the remaining length and the whole buffer must be consumed.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], DexError> {
        if self.bytes.len() < len {
            return Err(DexError::InvalidParameters);
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, DexError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, DexError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub(crate) fn read_i128(&mut self) -> Result<i128, DexError> {
        Ok(i128::from_be_bytes(self.take(16)?.try_into().unwrap()))
    }

    /// Length-prefixed Q96: one length byte (0..=24) then that many
    /// big-endian bytes.
    pub(crate) fn read_q96(&mut self) -> Result<Q96, DexError> {
        let len = self.take(1)?[0] as usize;
        Q96::from_bytes(self.take(len)?)
    }

    pub(crate) fn finish(self) -> Result<(), DexError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(DexError::InvalidParameters)
        }
    }
}

pub(crate) fn write_q96(out: &mut Vec<u8>, value: Q96) -> Result<(), DexError> {
    let bytes = value.to_bytes()?;
    out.push(bytes.len() as u8);
    out.extend_from_slice(&bytes);
    Ok(())
}
