// ---------------------------------------------------------------------------
// codec – Primitive reader/writer every other codec is built from
// ---------------------------------------------------------------------------
//
// Wire alphabet (all little-endian):
//   u8 / i32 / u32 / i64 / f32   fixed width
//   bool                         i32 0/1 (presence flags use the same form)
//   byte bool                    u8 0/1 (only the effect `colored` flag)
//   text                         i32 length + UTF-8 bytes, no terminator
//   list                         i32 count + items
//   blob                         i32 length + raw bytes, 0 = absent
//
// Text lengths are bounded by MAX_TEXT_LEN so a corrupt length cannot cause
// an unbounded allocation. Blobs (screenshots, portraits) are bounded by the
// remaining stream instead.

use byteorder::{ByteOrder, LittleEndian};

use crate::save_error::{SaveError, SaveResult};

/// Largest accepted text length in bytes.
pub const MAX_TEXT_LEN: i32 = 65_536;

/// A position in world space.
pub type Vec3 = [f32; 3];

/// Append-only little-endian writer.
#[derive(Debug, Default)]
pub struct SaveWriter {
    buf: Vec<u8>,
}

impl SaveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_u32(&mut self, v: u32) {
        let mut b = [0u8; 4];
        LittleEndian::write_u32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_i64(&mut self, v: i64) {
        let mut b = [0u8; 8];
        LittleEndian::write_i64(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_f32(&mut self, v: f32) {
        let mut b = [0u8; 4];
        LittleEndian::write_f32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_vec3(&mut self, v: Vec3) {
        for c in v {
            self.write_f32(c);
        }
    }

    /// Raw bytes with no prefix (signatures).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Boolean as a 4-byte integer. Used for every flag except the effect
    /// `colored` byte.
    pub fn write_bool(&mut self, v: bool) {
        self.write_i32(i32::from(v));
    }

    /// Boolean as a single byte.
    pub fn write_byte_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub fn write_text(&mut self, field: &'static str, s: &str) -> SaveResult<()> {
        let len = s.len();
        if len > MAX_TEXT_LEN as usize {
            return Err(SaveError::MalformedLength {
                field,
                offset: self.buf.len(),
                length: len as i64,
            });
        }
        self.write_i32(len as i32);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub fn write_count(&mut self, field: &'static str, count: usize) -> SaveResult<()> {
        let count = i32::try_from(count).map_err(|_| SaveError::MalformedLength {
            field,
            offset: self.buf.len(),
            length: count as i64,
        })?;
        self.write_i32(count);
        Ok(())
    }

    /// Optional blob; `None` and an empty blob both encode as length 0.
    pub fn write_blob(&mut self, field: &'static str, blob: Option<&[u8]>) -> SaveResult<()> {
        let bytes = blob.unwrap_or_default();
        self.write_count(field, bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Presence flag followed by the block when present.
    pub fn write_optional<T>(
        &mut self,
        value: Option<&T>,
        write: impl FnOnce(&mut Self, &T) -> SaveResult<()>,
    ) -> SaveResult<()> {
        match value {
            Some(v) => {
                self.write_bool(true);
                write(self, v)
            }
            None => {
                self.write_bool(false);
                Ok(())
            }
        }
    }

    /// Count prefix followed by every item.
    pub fn write_list<'a, T: 'a>(
        &mut self,
        field: &'static str,
        items: impl ExactSizeIterator<Item = &'a T>,
        mut write: impl FnMut(&mut Self, &T) -> SaveResult<()>,
    ) -> SaveResult<()> {
        self.write_count(field, items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }
}

/// Bounds-checked little-endian reader over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct SaveReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SaveReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current byte offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn take(&mut self, n: usize, field: &'static str) -> SaveResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(SaveError::TruncatedStream {
                field,
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self, field: &'static str) -> SaveResult<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_i32(&mut self, field: &'static str) -> SaveResult<i32> {
        Ok(LittleEndian::read_i32(self.take(4, field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> SaveResult<u32> {
        Ok(LittleEndian::read_u32(self.take(4, field)?))
    }

    pub fn read_i64(&mut self, field: &'static str) -> SaveResult<i64> {
        Ok(LittleEndian::read_i64(self.take(8, field)?))
    }

    pub fn read_f32(&mut self, field: &'static str) -> SaveResult<f32> {
        Ok(LittleEndian::read_f32(self.take(4, field)?))
    }

    pub fn read_vec3(&mut self, field: &'static str) -> SaveResult<Vec3> {
        Ok([
            self.read_f32(field)?,
            self.read_f32(field)?,
            self.read_f32(field)?,
        ])
    }

    pub fn read_raw<const N: usize>(&mut self, field: &'static str) -> SaveResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    /// 4-byte boolean; anything but 0/1 is rejected so a misaligned cursor
    /// is caught at the first flag it lands on.
    pub fn read_bool(&mut self, field: &'static str) -> SaveResult<bool> {
        let offset = self.pos;
        match self.read_i32(field)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SaveError::InvalidFlag {
                field,
                offset,
                value,
            }),
        }
    }

    pub fn read_byte_bool(&mut self, field: &'static str) -> SaveResult<bool> {
        let offset = self.pos;
        match self.read_u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SaveError::InvalidFlag {
                field,
                offset,
                value: i32::from(value),
            }),
        }
    }

    /// Length-prefixed UTF-8 text. The length is validated before any
    /// payload byte is consumed.
    pub fn read_text(&mut self, field: &'static str) -> SaveResult<String> {
        let offset = self.pos;
        let len = self.read_i32(field)?;
        if !(0..=MAX_TEXT_LEN).contains(&len) {
            return Err(SaveError::MalformedLength {
                field,
                offset,
                length: i64::from(len),
            });
        }
        let text_offset = self.pos;
        let bytes = self.take(len as usize, field)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SaveError::InvalidText {
            field,
            offset: text_offset,
        })
    }

    /// List count. `min_item_size` is the smallest encoding of one item and
    /// lets an absurd count fail up front instead of after a huge
    /// allocation.
    pub fn read_count(&mut self, field: &'static str, min_item_size: usize) -> SaveResult<usize> {
        let offset = self.pos;
        let count = self.read_i32(field)?;
        if count < 0 {
            return Err(SaveError::MalformedLength {
                field,
                offset,
                length: i64::from(count),
            });
        }
        let count = count as usize;
        let needed = count.saturating_mul(min_item_size);
        if needed > self.remaining() {
            return Err(SaveError::TruncatedStream {
                field,
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Optional blob; length 0 decodes as `None`.
    pub fn read_blob(&mut self, field: &'static str) -> SaveResult<Option<Vec<u8>>> {
        let offset = self.pos;
        let len = self.read_i32(field)?;
        if len < 0 || len as usize > self.remaining() {
            return Err(SaveError::InvalidBlobLength {
                field,
                offset,
                length: i64::from(len),
                remaining: self.remaining(),
            });
        }
        if len == 0 {
            return Ok(None);
        }
        Ok(Some(self.take(len as usize, field)?.to_vec()))
    }

    /// Presence flag, then the block only when the flag is set.
    pub fn read_optional<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> SaveResult<T>,
    ) -> SaveResult<Option<T>> {
        if self.read_bool(field)? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_list<T>(
        &mut self,
        field: &'static str,
        min_item_size: usize,
        mut read: impl FnMut(&mut Self) -> SaveResult<T>,
    ) -> SaveResult<Vec<T>> {
        let count = self.read_count(field, min_item_size)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }
}
