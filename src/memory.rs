//! Memory serializer — an endian-aware cursor over an in-memory byte device.
//!
//! [`MemorySerializer`] tracks a read/write position, a configured
//! [`ByteOrder`], and a sticky [`Status`]. Every scalar accessor comes as a
//! matched read/write pair; multi-byte values are stored in the configured
//! byte order regardless of the host's.
//!
//! # Failure model
//!
//! No operation returns `Result` and none panics. A short read latches
//! [`Status::ReadPastEnd`] and zeroes the output; a write to a read-only
//! device latches [`Status::WriteFailed`]. Once the status is non-Ok every
//! further write is a no-op, so a caller can issue a straight-line sequence
//! of operations and check the status once at the end.
//! [`MemorySerializer::reset_status`] re-arms the cursor.
//!
//! # Example
//!
//! ```
//! use streamwire::memory::{MemorySerializer, Status};
//!
//! let mut buf = Vec::new();
//! let mut writer = MemorySerializer::writer(&mut buf);
//! writer.write_u16(0x0100);
//! writer.write_u32(0xDEAD_BEEF);
//! assert_eq!(writer.status(), Status::Ok);
//! drop(writer);
//!
//! let mut reader = MemorySerializer::reader(&buf);
//! assert_eq!(reader.read_u16(), 0x0100);
//! assert_eq!(reader.read_u32(), 0xDEAD_BEEF);
//! assert!(reader.at_end());
//! ```

/// Byte order used for multi-byte scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first (the wire default).
    #[default]
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
}

/// Current condition of a serializer. Sticky: the first non-Ok value holds
/// until [`MemorySerializer::reset_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operating normally.
    Ok,
    /// A read ran past the end of the data.
    ReadPastEnd,
    /// A write could not be applied to the underlying device.
    WriteFailed,
}

/// The underlying byte device: owned growable, borrowed growable, or a
/// borrowed read-only slice.
#[derive(Debug)]
enum Device<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut Vec<u8>),
    ReadOnly(&'a [u8]),
}

impl Device<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Device::Owned(vec) => vec,
            Device::Borrowed(vec) => vec,
            Device::ReadOnly(slice) => slice,
        }
    }

    /// Write `buf` at `pos`, growing the buffer if needed. False when the
    /// device is read-only.
    fn write_at(&mut self, pos: usize, buf: &[u8]) -> bool {
        let vec: &mut Vec<u8> = match self {
            Device::Owned(vec) => vec,
            Device::Borrowed(vec) => vec,
            Device::ReadOnly(_) => return false,
        };

        let end = pos + buf.len();
        if vec.len() < end {
            vec.resize(end, 0);
        }
        vec[pos..end].copy_from_slice(buf);
        true
    }
}

/// A position-tracking, endian-aware, sticky-status cursor over bytes.
///
/// Single-owner by design: no interior mutability, no locking. Callers that
/// want concurrent cursors create one per thread.
#[derive(Debug)]
pub struct MemorySerializer<'a> {
    device: Device<'a>,
    pos: usize,
    byte_order: ByteOrder,
    status: Status,
}

macro_rules! int_io {
    ($read:ident, $write:ident, $ty:ty) => {
        #[doc = concat!("Read a `", stringify!($ty), "` in the configured byte order, or 0 past the end.")]
        pub fn $read(&mut self) -> $ty {
            let mut raw = [0u8; std::mem::size_of::<$ty>()];
            if self.read_raw(&mut raw) != raw.len() {
                return 0;
            }
            match self.byte_order {
                ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
            }
        }

        #[doc = concat!("Write a `", stringify!($ty), "` in the configured byte order.")]
        pub fn $write(&mut self, value: $ty) {
            let raw = match self.byte_order {
                ByteOrder::BigEndian => value.to_be_bytes(),
                ByteOrder::LittleEndian => value.to_le_bytes(),
            };
            self.write_raw(&raw);
        }
    };
}

impl<'a> MemorySerializer<'a> {
    /// Cursor over a fresh owned buffer, open for reading and writing.
    pub fn new() -> Self {
        Self::from_device(Device::Owned(Vec::new()))
    }

    /// Cursor over an owned buffer, positioned at the start.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_device(Device::Owned(data))
    }

    /// Read-write cursor over a caller-owned buffer.
    pub fn writer(data: &'a mut Vec<u8>) -> Self {
        Self::from_device(Device::Borrowed(data))
    }

    /// Read-only cursor over a byte slice. Writes latch
    /// [`Status::WriteFailed`].
    pub fn reader(data: &'a [u8]) -> Self {
        Self::from_device(Device::ReadOnly(data))
    }

    fn from_device(device: Device<'a>) -> Self {
        Self {
            device,
            pos: 0,
            byte_order: ByteOrder::BigEndian,
            status: Status::Ok,
        }
    }

    // Typed scalar pairs. The wire protocol uses a subset of these, but the
    // cursor mirrors the full scalar family so every header field has a
    // matched accessor.
    int_io!(read_i8, write_i8, i8);
    int_io!(read_u8, write_u8, u8);
    int_io!(read_i16, write_i16, i16);
    int_io!(read_u16, write_u16, u16);
    int_io!(read_i32, write_i32, i32);
    int_io!(read_u32, write_u32, u32);
    int_io!(read_i64, write_i64, i64);
    int_io!(read_u64, write_u64, u64);

    /// Read an IEEE 754 binary32 in the configured byte order.
    pub fn read_f32(&mut self) -> f32 {
        f32::from_bits(self.read_u32())
    }

    /// Write an IEEE 754 binary32 in the configured byte order.
    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Read an IEEE 754 binary64 in the configured byte order.
    pub fn read_f64(&mut self) -> f64 {
        f64::from_bits(self.read_u64())
    }

    /// Write an IEEE 754 binary64 in the configured byte order.
    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Read a binary16 half float as its raw bit pattern. The cursor does
    /// not interpret the value.
    pub fn read_f16_bits(&mut self) -> u16 {
        self.read_u16()
    }

    /// Write a binary16 half float from its raw bit pattern.
    pub fn write_f16_bits(&mut self, bits: u16) {
        self.write_u16(bits);
    }

    /// Read one byte as a boolean: zero is `false`, anything else `true`.
    pub fn read_bool(&mut self) -> bool {
        self.read_u8() != 0
    }

    /// Write a boolean as a single byte.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    /// Read a UTF-16 code unit as its raw 16-bit value.
    pub fn read_char16(&mut self) -> u16 {
        self.read_u16()
    }

    /// Write a UTF-16 code unit from its raw 16-bit value.
    pub fn write_char16(&mut self, unit: u16) {
        self.write_u16(unit);
    }

    /// Read a UTF-32 code unit as its raw 32-bit value.
    pub fn read_char32(&mut self) -> u32 {
        self.read_u32()
    }

    /// Write a UTF-32 code unit from its raw 32-bit value.
    pub fn write_char32(&mut self, unit: u32) {
        self.write_u32(unit);
    }

    /// Read up to `buf.len()` bytes into `buf`, returning the count
    /// actually read. A short read latches [`Status::ReadPastEnd`]; the
    /// unread tail of `buf` is left untouched.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> usize {
        let data = self.device.as_slice();
        let available = data.len().saturating_sub(self.pos);
        let count = buf.len().min(available);

        buf[..count].copy_from_slice(&data[self.pos..self.pos + count]);
        self.pos += count;

        if count != buf.len() {
            self.set_status(Status::ReadPastEnd);
        }
        count
    }

    /// Write `buf` at the current position, growing the device if needed.
    ///
    /// Returns the count written: `buf.len()` on success, 0 when the status
    /// is already non-Ok (writes are no-ops then) or the device is
    /// read-only (which latches [`Status::WriteFailed`]).
    pub fn write_raw(&mut self, buf: &[u8]) -> usize {
        if self.status != Status::Ok {
            return 0;
        }

        if self.device.write_at(self.pos, buf) {
            self.pos += buf.len();
            buf.len()
        } else {
            self.set_status(Status::WriteFailed);
            0
        }
    }

    /// Skip up to `length` bytes, returning the count actually skipped. A
    /// short skip latches [`Status::ReadPastEnd`].
    pub fn skip_raw(&mut self, length: usize) -> usize {
        let count = length.min(self.bytes_available());
        self.pos += count;

        if count != length {
            self.set_status(Status::ReadPastEnd);
        }
        count
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes remaining between the position and the end of the device.
    pub fn bytes_available(&self) -> usize {
        self.device.as_slice().len().saturating_sub(self.pos)
    }

    /// True when the position has reached the end of the device.
    pub fn at_end(&self) -> bool {
        self.bytes_available() == 0
    }

    /// Move the cursor. Positions past the end are refused.
    pub fn seek(&mut self, position: usize) -> bool {
        if position <= self.device.as_slice().len() {
            self.pos = position;
            true
        } else {
            false
        }
    }

    /// The device contents, independent of the cursor position.
    pub fn data(&self) -> &[u8] {
        self.device.as_slice()
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Latch `status`. Ignored unless the current status is Ok.
    pub fn set_status(&mut self, status: Status) {
        if self.status == Status::Ok {
            self.status = status;
        }
    }

    /// Clear the status back to Ok.
    pub fn reset_status(&mut self) {
        self.status = Status::Ok;
    }

    /// Configured byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Set the byte order for subsequent scalar operations.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }
}

impl Default for MemorySerializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut buf = Vec::new();
        let mut s = MemorySerializer::writer(&mut buf);
        s.write_u16(0x0102);
        s.write_u32(0x0304_0506);
        drop(s);

        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buf = Vec::new();
        let mut s = MemorySerializer::writer(&mut buf);
        s.set_byte_order(ByteOrder::LittleEndian);
        s.write_u16(0x0102);
        s.write_u32(0x0304_0506);
        drop(s);

        assert_eq!(buf, [0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn test_scalar_round_trip_both_orders() {
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let mut s = MemorySerializer::new();
            s.set_byte_order(order);

            s.write_i8(-7);
            s.write_u8(0xFE);
            s.write_i16(-12_345);
            s.write_u16(54_321);
            s.write_i32(-1_234_567);
            s.write_u32(0xCAFE_BABE);
            s.write_i64(-9_876_543_210);
            s.write_u64(0xDEAD_BEEF_0102_0304);
            s.write_f32(3.5);
            s.write_f64(-2.25);
            s.write_f16_bits(0x3C00);
            s.write_bool(true);
            s.write_bool(false);
            s.write_char16(0xD801);
            s.write_char32(0x0001_F600);

            assert_eq!(s.status(), Status::Ok);
            assert!(s.seek(0));

            assert_eq!(s.read_i8(), -7);
            assert_eq!(s.read_u8(), 0xFE);
            assert_eq!(s.read_i16(), -12_345);
            assert_eq!(s.read_u16(), 54_321);
            assert_eq!(s.read_i32(), -1_234_567);
            assert_eq!(s.read_u32(), 0xCAFE_BABE);
            assert_eq!(s.read_i64(), -9_876_543_210);
            assert_eq!(s.read_u64(), 0xDEAD_BEEF_0102_0304);
            assert_eq!(s.read_f32(), 3.5);
            assert_eq!(s.read_f64(), -2.25);
            assert_eq!(s.read_f16_bits(), 0x3C00);
            assert!(s.read_bool());
            assert!(!s.read_bool());
            assert_eq!(s.read_char16(), 0xD801);
            assert_eq!(s.read_char32(), 0x0001_F600);

            assert_eq!(s.status(), Status::Ok);
            assert!(s.at_end());
        }
    }

    #[test]
    fn test_short_read_zeroes_and_latches() {
        let mut s = MemorySerializer::reader(&[0xAA]);

        assert_eq!(s.read_u32(), 0);
        assert_eq!(s.status(), Status::ReadPastEnd);
        assert!(s.at_end());
    }

    #[test]
    fn test_read_past_end_is_sticky() {
        let mut s = MemorySerializer::reader(&[0x01, 0x02]);

        assert_eq!(s.read_u32(), 0);
        assert_eq!(s.status(), Status::ReadPastEnd);

        // A subsequent in-range operation does not clear the status.
        assert!(s.seek(0));
        let _ = s.read_u16();
        assert_eq!(s.status(), Status::ReadPastEnd);

        s.reset_status();
        assert_eq!(s.status(), Status::Ok);
    }

    #[test]
    fn test_write_to_reader_fails() {
        let data = [0u8; 4];
        let mut s = MemorySerializer::reader(&data);

        s.write_u16(0x1234);
        assert_eq!(s.status(), Status::WriteFailed);
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_writes_are_noops_after_failure() {
        let mut buf = Vec::new();
        let mut s = MemorySerializer::writer(&mut buf);
        s.write_u8(1);
        s.set_status(Status::WriteFailed);
        s.write_u8(2);
        s.write_u32(3);
        drop(s);

        assert_eq!(buf, [1]);
    }

    #[test]
    fn test_status_latches_first_value() {
        let mut s = MemorySerializer::new();
        s.set_status(Status::ReadPastEnd);
        s.set_status(Status::WriteFailed);
        assert_eq!(s.status(), Status::ReadPastEnd);
    }

    #[test]
    fn test_seek_and_overwrite() {
        let mut buf = Vec::new();
        let mut s = MemorySerializer::writer(&mut buf);
        s.write_u16(0);
        s.write_u16(0xBEEF);

        assert!(s.seek(0));
        s.write_u16(0xFACE);
        assert_eq!(s.position(), 2);
        drop(s);

        assert_eq!(buf, [0xFA, 0xCE, 0xBE, 0xEF]);
    }

    #[test]
    fn test_seek_past_end_refused() {
        let mut s = MemorySerializer::reader(&[0u8; 4]);
        assert!(!s.seek(5));
        assert_eq!(s.position(), 0);
        assert!(s.seek(4));
        assert!(s.at_end());
    }

    #[test]
    fn test_raw_round_trip() {
        let mut s = MemorySerializer::new();
        s.write_raw(b"chunk payload");
        assert!(s.seek(6));

        let mut out = [0u8; 7];
        assert_eq!(s.read_raw(&mut out), 7);
        assert_eq!(&out, b"payload");
    }

    #[test]
    fn test_skip_within_and_past_end() {
        let mut s = MemorySerializer::reader(&[0u8; 10]);

        assert_eq!(s.skip_raw(4), 4);
        assert_eq!(s.position(), 4);
        assert_eq!(s.status(), Status::Ok);

        assert_eq!(s.skip_raw(10), 6);
        assert_eq!(s.status(), Status::ReadPastEnd);
    }

    #[test]
    fn test_bytes_available_tracks_position() {
        let mut s = MemorySerializer::reader(&[0u8; 8]);
        assert_eq!(s.bytes_available(), 8);
        let _ = s.read_u32();
        assert_eq!(s.bytes_available(), 4);
        let _ = s.read_u32();
        assert_eq!(s.bytes_available(), 0);
        assert!(s.at_end());
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let mut s = MemorySerializer::reader(&[0x7F, 0x00]);
        assert!(s.read_bool());
        assert!(!s.read_bool());
    }

    #[test]
    fn test_owned_buffer_grows_on_write() {
        let mut s = MemorySerializer::from_vec(vec![1, 2]);
        assert!(s.seek(2));
        s.write_u16(0x0304);
        assert_eq!(s.data(), &[1, 2, 3, 4]);
    }
}
