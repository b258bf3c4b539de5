
//! Read and write little-endian binary data,
//! either at byte offsets inside a buffer, or through a stream.

pub use std::io::{Read, Write};
use lebe::prelude::*;
use crate::error::{Result, UnitResult};


// In-buffer field access. The caller guarantees that the accessed
// range is inside the buffer; all arithmetic is modular.

/// Read the unsigned 16 bit little-endian integer at the byte offset.
#[inline]
pub fn read_i16_le(bytes: &[u8], position: usize) -> i32 {
    bytes[position] as i32 | ((bytes[position + 1] as i32) << 8)
}

/// Read the 32 bit little-endian integer at the byte offset.
#[inline]
pub fn read_i32_le(bytes: &[u8], position: usize) -> i32 {
    bytes[position] as i32
        | ((bytes[position + 1] as i32) << 8)
        | ((bytes[position + 2] as i32) << 16)
        | ((bytes[position + 3] as i32) << 24)
}

/// Store the low 16 bits of the value at the byte offset, little-endian.
#[inline]
pub fn write_i16_le(bytes: &mut [u8], position: usize, value: i32) {
    bytes[position] = value as u8;
    bytes[position + 1] = (value >> 8) as u8;
}

/// Store the low 32 bits of the value at the byte offset, little-endian.
#[inline]
pub fn write_i32_le(bytes: &mut [u8], position: usize, value: i32) {
    bytes[position] = value as u8;
    bytes[position + 1] = (value >> 8) as u8;
    bytes[position + 2] = (value >> 16) as u8;
    bytes[position + 3] = (value >> 24) as u8;
}


// Stream access, used by the container codec.

/// Read one byte from the stream.
#[inline]
pub fn read_u8(read: &mut impl Read) -> Result<u8> {
    Ok(u8::read_from_little_endian(read)?)
}

/// Read a little-endian 32 bit word from the stream.
#[inline]
pub fn read_u32(read: &mut impl Read) -> Result<u32> {
    Ok(u32::read_from_little_endian(read)?)
}

/// Fill the whole slice with bytes from the stream.
#[inline]
pub fn read_bytes(read: &mut impl Read, bytes: &mut [u8]) -> UnitResult {
    read.read_from_little_endian_into(bytes)?;
    Ok(())
}

/// Write one byte to the stream.
#[inline]
pub fn write_u8(write: &mut impl Write, value: u8) -> UnitResult {
    write.write_as_little_endian(&value)?;
    Ok(())
}

/// Write a 32 bit word to the stream, little-endian.
#[inline]
pub fn write_u32(write: &mut impl Write, value: u32) -> UnitResult {
    write.write_as_little_endian(&value)?;
    Ok(())
}

/// Write the whole slice to the stream.
#[inline]
pub fn write_bytes(write: &mut impl Write, bytes: &[u8]) -> UnitResult {
    write.write_as_little_endian(bytes)?;
    Ok(())
}
