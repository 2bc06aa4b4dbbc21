// Bounds-checked little-endian field readers
// Every accessor returns None unless the whole field lies inside the buffer.

use byteorder::{ByteOrder, LittleEndian};

/// Borrow `len` bytes at `offset`, or `None` if any of them lies past the end of `buf`.
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    let end = offset.checked_add(len)?;
    buf.get(offset..end)
}

/// Copy a fixed-size array out of `buf`.
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    slice_at(buf, offset, N)?.try_into().ok()
}

pub fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

pub fn read_i8(buf: &[u8], offset: usize) -> Option<i8> {
    read_u8(buf, offset).map(|b| b as i8)
}

pub fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    slice_at(buf, offset, 2).map(LittleEndian::read_u16)
}

pub fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    slice_at(buf, offset, 4).map(LittleEndian::read_u32)
}

pub fn read_u64(buf: &[u8], offset: usize) -> Option<u64> {
    slice_at(buf, offset, 8).map(LittleEndian::read_u64)
}
