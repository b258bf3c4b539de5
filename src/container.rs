
//! Store zero eliminated buffers in a small archive and read them back.
//!
//! The archive is the only place where the individual transforms meet: the
//! compressor preprocesses the buffer (header neutralisation, residuals,
//! bit planes), runs zero elimination over the whole result, and records in
//! a flags byte which of the two happened. Buffers outside the supported
//! bmp subset are stored without preprocessing after a warning, and buffers
//! that zero elimination cannot shrink are stored raw, so compressing never
//! fails and always roundtrips.

use std::fs;
use std::path::Path;

use bit_field::BitField;
use crate::compression::{self, zero, ByteVec, Bytes};
use crate::error::{Error, Result, UnitResult};
use crate::io::{self, Read, Write};


/// The first four bytes of each compressed file.
/// Used to abort reading files that were not written by this codec.
pub mod magic_number {
    use super::*;

    /// The first four bytes of each compressed file.
    pub const BYTES: [u8; 4] = [b'b', b'm', b'z', 0x01];

    /// Without validation, write this instance to the byte stream.
    pub fn write(write: &mut impl Write) -> UnitResult {
        io::write_bytes(write, &self::BYTES)
    }

    /// Consume four bytes from the reader and check that they
    /// are the identifier of a compressed file.
    pub fn validate(read: &mut impl Read) -> UnitResult {
        let mut magic = [0_u8; 4];
        io::read_bytes(read, &mut magic)?;

        if magic == self::BYTES { Ok(()) }
        else { Err(Error::invalid("compressed file identifier missing")) }
    }
}


// bits of the archive flags byte
const PREPROCESSED_BIT: usize = 0;
const ELIMINATED_BIT: usize = 1;

/// Compress a bmp buffer into an archive. Inputs outside the supported
/// subset are still stored, only without the pixel preprocessing; the
/// result of [`decompress`] is byte-identical to the input either way
/// (up to bmp row padding, which is normalized to zero).
pub fn compress(bytes: Bytes<'_>) -> Result<ByteVec> {
    if bytes.len() as u64 > u32::MAX as u64 {
        return Err(Error::unsupported("input larger than four gigabytes"));
    }

    let mut payload = bytes.to_vec();

    let preprocessed = match compression::preprocess(&mut payload) {
        Ok(_) => true,
        Err(error) => {
            log::warn!("storing without pixel preprocessing: {}", error);
            false
        },
    };

    // the eliminated form must pay for its bitmap, otherwise store raw
    let bitmap_len = zero::bitmap_length::<u8>(payload.len());
    let eliminated =
        if bitmap_len < payload.len() {
            zero::eliminate_zeros_bounded(&payload, payload.len() - bitmap_len - 1).ok()
        }
        else { None };

    let mut archive = Vec::with_capacity(payload.len() / 2 + 16);
    magic_number::write(&mut archive)?;

    let mut flags = 0_u8;
    flags.set_bit(PREPROCESSED_BIT, preprocessed);
    flags.set_bit(ELIMINATED_BIT, eliminated.is_some());

    io::write_u8(&mut archive, flags)?;
    io::write_u32(&mut archive, payload.len() as u32)?;

    match &eliminated {
        Some((dense, bitmap)) => {
            io::write_u32(&mut archive, dense.len() as u32)?;
            io::write_bytes(&mut archive, bitmap)?;
            io::write_bytes(&mut archive, dense)?;
        },

        None => {
            io::write_u32(&mut archive, 0)?;
            io::write_bytes(&mut archive, &payload)?;
        },
    }

    Ok(archive)
}

/// Decompress an archive produced by [`compress`],
/// returning the original buffer.
pub fn decompress(bytes: Bytes<'_>) -> Result<ByteVec> {
    let mut read = bytes;
    magic_number::validate(&mut read)?;

    let flags = io::read_u8(&mut read)?;
    if flags >> 2 != 0 {
        return Err(Error::unsupported("unknown archive flags"));
    }

    let decoded_len = io::read_u32(&mut read)? as usize;
    let dense_len = io::read_u32(&mut read)? as usize;

    // both branches check the exact remaining length before allocating,
    // so a lying header cannot demand absurd amounts of memory
    let mut payload =
        if flags.get_bit(ELIMINATED_BIT) {
            let bitmap_len = zero::bitmap_length::<u8>(decoded_len);
            if read.len() as u64 != bitmap_len as u64 + dense_len as u64 {
                return Err(Error::invalid("compressed payload length"));
            }

            let (bitmap, dense) = read.split_at(bitmap_len);
            zero::restore_zeros(dense, bitmap, decoded_len, true)?
        }
        else {
            if dense_len != 0 || read.len() != decoded_len {
                return Err(Error::invalid("compressed payload length"));
            }

            read.to_vec()
        };

    if flags.get_bit(PREPROCESSED_BIT) {
        compression::postprocess(&mut payload)?;
    }

    Ok(payload)
}


/// Compress the file at the input path into a new file at the output path.
/// An existing file at the output path is overwritten.
pub fn compress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> UnitResult {
    let archive = compress(&fs::read(input)?)?;
    fs::write(output, archive)?;
    Ok(())
}

/// Decompress the archive file at the input path into a new file at the
/// output path. An existing file at the output path is overwritten.
pub fn decompress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> UnitResult {
    let bytes = decompress(&fs::read(input)?)?;
    fs::write(output, bytes)?;
    Ok(())
}
