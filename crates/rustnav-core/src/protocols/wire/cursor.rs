use super::error::{DecodeError, DecodeResult};

/// Bounds-checked read position over a borrowed datagram.
///
/// Offsets reported in errors are absolute within the original buffer, also
/// for child cursors produced by [`ByteCursor::sub`]. A cursor never reads past
/// its end bound even when the underlying buffer is longer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
        }
    }

    /// Cursor starting at a fixed header offset.
    pub fn at(data: &'a [u8], offset: usize) -> DecodeResult<Self> {
        let mut cursor = Self::new(data);
        cursor.skip(offset)?;
        Ok(cursor)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn require(&self, needed: usize) -> DecodeResult<()> {
        if self.remaining() < needed {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn peek(&self) -> DecodeResult<u8> {
        self.require(1)?;
        Ok(self.data[self.pos])
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        self.require(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u32_le(&mut self) -> DecodeResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32_le(&mut self) -> DecodeResult<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self) -> DecodeResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Reads a fixed32 wire value as an IEEE-754 float.
    pub fn read_f32_le(&mut self) -> DecodeResult<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Splits off the next `len` bytes as a child cursor and advances past them.
    pub fn sub(&mut self, len: usize) -> DecodeResult<ByteCursor<'a>> {
        self.require(len)?;
        let child = ByteCursor {
            data: self.data,
            pos: self.pos,
            end: self.pos + len,
        };
        self.pos += len;
        Ok(child)
    }

    fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}
