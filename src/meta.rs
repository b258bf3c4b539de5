
//! Recognise the supported BMP subset and make its header compressible.
//!
//! Every supported header stores the same constants: the `BM` magic, the
//! 54 byte pixel data offset, the 40 byte info header size, one color plane,
//! 24 bits per pixel, and sizes that follow from the image dimensions.
//! Subtracting those expected values turns a valid header into zero bytes
//! (except for width, height and the resolution fields), which the zero
//! elimination stage then removes. The inverse adds the same values back.

use crate::error::{Error, Result};
use crate::io::{read_i16_le, read_i32_le, write_i16_le, write_i32_le};


/// Number of bytes before the pixel data: 14 byte file header + 40 byte info header.
pub const HEADER_SIZE: usize = 54;

/// The first two bytes of every bmp file.
pub const MAGIC_BYTES: [u8; 2] = *b"BM";

/// Byte offsets of the header fields inside the buffer.
pub mod field {
    #![allow(missing_docs)] // the field names say it all

    pub const MAGIC: usize = 0;
    pub const FILE_SIZE: usize = 2;
    pub const RESERVED: usize = 6;
    pub const PIXEL_OFFSET: usize = 10;
    pub const INFO_SIZE: usize = 14;
    pub const WIDTH: usize = 18;
    pub const HEIGHT: usize = 22;
    pub const PLANES: usize = 26;
    pub const BITS_PER_PIXEL: usize = 28;
    pub const COMPRESSION: usize = 30;
    pub const IMAGE_SIZE: usize = 34;
    pub const RESOLUTION_X: usize = 38;
    pub const RESOLUTION_Y: usize = 42;
    pub const COLORS_USED: usize = 46;
    pub const COLORS_IMPORTANT: usize = 50;
}

/// Expected info header size of the supported subset.
const INFO_SIZE: i32 = 40;

/// Expected bit depth of the supported subset.
const BITS_PER_PIXEL: i32 = 24;


/// The size of a decoded image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {

    /// Number of pixels per row. At least one.
    pub width: usize,

    /// Number of rows. At least one.
    pub height: usize,
}

impl Dimensions {

    /// Byte distance between successive pixel rows:
    /// three bytes per pixel, rounded up to a multiple of four.
    pub fn row_stride(self) -> usize {
        (self.width * 3 + 3) & !3
    }

    /// Number of bytes in one deinterleaved channel plane.
    pub fn plane_bytes(self) -> usize {
        self.width * self.height
    }

    /// Number of bytes in all three channel planes.
    pub fn residual_bytes(self) -> usize {
        3 * self.plane_bytes()
    }

    /// Number of bytes in the pixel region, including row padding.
    pub fn pixel_bytes(self) -> usize {
        self.row_stride() * self.height
    }

    /// Number of bytes in the whole file.
    pub fn file_size(self) -> usize {
        HEADER_SIZE + self.pixel_bytes()
    }
}


/// Check that the bytes are a bmp image of the supported subset
/// and return its dimensions. Never mutates the buffer.
pub fn validate(bytes: &[u8]) -> Result<Dimensions> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::invalid("input ends before the bmp header"));
    }

    if bytes[..2] != MAGIC_BYTES {
        return Err(Error::unsupported("bmp file identifier missing"));
    }

    let width = read_i32_le(bytes, field::WIDTH);
    let height = read_i32_le(bytes, field::HEIGHT);
    if width < 1 || height < 1 {
        return Err(Error::unsupported("bmp dimensions"));
    }

    // sizes in u64, so that a lying header cannot overflow the arithmetic
    let row_stride = (width as u64 * 3 + 3) & !3;
    let pixel_bytes = row_stride * height as u64;
    let file_size = HEADER_SIZE as u64 + pixel_bytes;

    let checks = [
        (read_i32_le(bytes, field::RESERVED) == 0, "reserved bmp fields"),
        (read_i32_le(bytes, field::PIXEL_OFFSET) == HEADER_SIZE as i32, "bmp pixel data offset"),
        (read_i32_le(bytes, field::INFO_SIZE) == INFO_SIZE, "bmp info header size"),
        (read_i16_le(bytes, field::PLANES) == 1, "bmp color plane count"),
        (read_i16_le(bytes, field::BITS_PER_PIXEL) == BITS_PER_PIXEL, "bmp bit depth"),
        (read_i32_le(bytes, field::COMPRESSION) == 0, "compressed bmp pixel data"),
        (read_i32_le(bytes, field::FILE_SIZE) as u32 as u64 == file_size, "bmp file size field"),
        (read_i32_le(bytes, field::IMAGE_SIZE) as u32 as u64 == pixel_bytes, "bmp image size field"),
        (read_i32_le(bytes, field::COLORS_USED) == 0, "bmp color palette"),
        (read_i32_le(bytes, field::COLORS_IMPORTANT) == 0, "bmp important colors field"),
        (bytes.len() as u64 == file_size, "bmp buffer length"),
    ];

    for (is_valid, name) in checks {
        if !is_valid {
            return Err(Error::unsupported(name));
        }
    }

    Ok(Dimensions { width: width as usize, height: height as usize })
}

/// Check that the bytes are a neutralised header followed by the matching
/// amount of payload, and return the dimensions it retains.
/// Never mutates the buffer.
pub fn validate_neutralized(bytes: &[u8]) -> Result<Dimensions> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::invalid("input ends before the neutralised header"));
    }

    let width = read_i32_le(bytes, field::WIDTH);
    let height = read_i32_le(bytes, field::HEIGHT);
    if width < 1 || height < 1 {
        return Err(Error::unsupported("neutralised bmp dimensions"));
    }

    let row_stride = (width as u64 * 3 + 3) & !3;
    let file_size = HEADER_SIZE as u64 + row_stride * height as u64;

    let zeroed = [
        field::MAGIC, field::FILE_SIZE, field::RESERVED, field::PIXEL_OFFSET,
        field::INFO_SIZE, field::COMPRESSION, field::IMAGE_SIZE,
        field::COLORS_USED, field::COLORS_IMPORTANT,
    ];

    let all_zero =
        zeroed.iter().all(|&position| read_i32_le(bytes, position) == 0)
        && read_i16_le(bytes, field::PLANES) == 0
        && read_i16_le(bytes, field::BITS_PER_PIXEL) == 0;

    if !all_zero {
        return Err(Error::unsupported("leftover bytes in neutralised header"));
    }

    if bytes.len() as u64 != file_size {
        return Err(Error::unsupported("neutralised buffer length"));
    }

    Ok(Dimensions { width: width as usize, height: height as usize })
}

/// Subtract the expected constant from every recognised header field,
/// leaving zero bytes everywhere except width, height and the resolutions.
/// A buffer that fails [`validate`] is returned unchanged with the error.
pub fn neutralize(bytes: &mut [u8]) -> Result<Dimensions> {
    let dimensions = validate(bytes)?;
    shift_header(bytes, dimensions, i32::wrapping_sub);
    Ok(dimensions)
}

/// Add the expected constants back, exactly undoing [`neutralize`].
/// A buffer that fails [`validate_neutralized`] is returned unchanged with the error.
pub fn restore(bytes: &mut [u8]) -> Result<Dimensions> {
    let dimensions = validate_neutralized(bytes)?;
    shift_header(bytes, dimensions, i32::wrapping_add);
    Ok(dimensions)
}

// The forward and inverse directions use the same field/constant table and
// only differ in the sign of the operation.
fn shift_header(bytes: &mut [u8], dimensions: Dimensions, apply: fn(i32, i32) -> i32) {
    let pixel_bytes = dimensions.pixel_bytes() as i32;

    bytes[0] = apply(bytes[0] as i32, MAGIC_BYTES[0] as i32) as u8;
    bytes[1] = apply(bytes[1] as i32, MAGIC_BYTES[1] as i32) as u8;

    let fields_32 = [
        (field::FILE_SIZE, pixel_bytes.wrapping_add(HEADER_SIZE as i32)),
        (field::PIXEL_OFFSET, HEADER_SIZE as i32),
        (field::INFO_SIZE, INFO_SIZE),
        (field::IMAGE_SIZE, pixel_bytes),

        // printers typically set both resolutions to the same value,
        // so the difference is near zero and compresses well
        (field::RESOLUTION_Y, read_i32_le(bytes, field::RESOLUTION_X)),
    ];

    for (position, expected) in fields_32 {
        write_i32_le(bytes, position, apply(read_i32_le(bytes, position), expected));
    }

    write_i16_le(bytes, field::PLANES, apply(read_i16_le(bytes, field::PLANES), 1));
    write_i16_le(bytes, field::BITS_PER_PIXEL, apply(read_i16_le(bytes, field::BITS_PER_PIXEL), BITS_PER_PIXEL));
}
