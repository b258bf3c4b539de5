
//! Turn interleaved BGR pixels into channel planes of prediction residuals.
//!
//! Each pixel is replaced by its difference to the previous pixel in scan
//! order, the blue and red channels additionally subtract the green delta,
//! and the sign of every residual is folded into the least significant bit.
//! The resulting single-byte residuals are written deinterleaved into three
//! column-major planes, so that later stages see each channel as one
//! contiguous run of mostly tiny values.
//!
//! The predictor for the first pixel of a row is the first pixel of the
//! previous row (not the pixel directly above). Changing this would silently
//! break compatibility with existing encoded data.
//!
//! Because the running predictor is always the previous *raw* pixel, every
//! residual depends only on read-only input bytes. The forward direction
//! therefore runs in parallel over the output columns, and the inverse over
//! the output rows once the first column has been rebuilt serially.

use crate::meta::{Dimensions, HEADER_SIZE};

#[cfg(feature = "rayon")]
use rayon::prelude::*;


/// Rewrite the pixel region of the buffer as three column-major planes of
/// magnitude-sign residuals, followed by zero bytes where the row padding
/// used to be. The buffer must hold a validated image of the given size.
pub fn pixels_to_residuals(bytes: &mut [u8], dimensions: Dimensions) {
    let mut residuals = vec![0_u8; dimensions.residual_bytes()];

    {
        let pixels = &bytes[HEADER_SIZE ..];

        #[cfg(feature = "rayon")]
        residuals.par_chunks_mut(dimensions.height).enumerate()
            .for_each(|(column, chunk)| encode_column(pixels, dimensions, column, chunk));

        #[cfg(not(feature = "rayon"))]
        residuals.chunks_mut(dimensions.height).enumerate()
            .for_each(|(column, chunk)| encode_column(pixels, dimensions, column, chunk));
    }

    let planes_end = HEADER_SIZE + residuals.len();
    bytes[HEADER_SIZE .. planes_end].copy_from_slice(&residuals);

    // the remaining bytes of the pixel region were row padding
    for byte in &mut bytes[planes_end ..] {
        *byte = 0;
    }
}

/// Rebuild the interleaved, padded pixel region from the residual planes.
/// Exactly undoes [`pixels_to_residuals`]; row padding bytes become zero.
pub fn residuals_to_pixels(bytes: &mut [u8], dimensions: Dimensions) {
    let residuals = bytes[HEADER_SIZE ..][.. dimensions.residual_bytes()].to_vec();
    let first_pixels = decode_first_column(&residuals, dimensions);

    let pixels = &mut bytes[HEADER_SIZE ..];

    #[cfg(feature = "rayon")]
    pixels.par_chunks_mut(dimensions.row_stride()).enumerate()
        .for_each(|(y, row)| decode_row(&residuals, &first_pixels, dimensions, y, row));

    #[cfg(not(feature = "rayon"))]
    pixels.chunks_mut(dimensions.row_stride()).enumerate()
        .for_each(|(y, row)| decode_row(&residuals, &first_pixels, dimensions, y, row));
}


/// Fold the low eight bits of a residual into an unsigned byte with the sign
/// in the least significant bit: `2s` for non-negative `s`, `-2s - 1`
/// otherwise. Small magnitudes of either sign become small bytes.
#[inline]
pub fn to_magnitude_sign(residual: i32) -> u8 {
    let signed = residual as i8 as i32; // the residual modulo 256, sign extended
    ((signed << 1) ^ (signed >> 7)) as u8
}

/// Unfold a magnitude-sign byte back into the signed residual in `[-128, 127]`.
#[inline]
pub fn from_magnitude_sign(folded: u8) -> i32 {
    let folded = folded as i32;
    (folded >> 1) ^ -(folded & 1)
}


// Difference of the pixel at (y, x) to its predictor in scan order. The
// first pixel of row zero is predicted as zero.
#[inline]
fn prediction_delta(pixels: &[u8], dimensions: Dimensions, y: usize, x: usize, channel: usize) -> i32 {
    let row_stride = dimensions.row_stride();
    let current = pixels[y * row_stride + x * 3 + channel] as i32;

    let predicted =
        if x > 0 { pixels[y * row_stride + (x - 1) * 3 + channel] as i32 }
        else if y > 0 { pixels[(y - 1) * row_stride + channel] as i32 }
        else { 0 };

    current - predicted
}

fn encode_column(pixels: &[u8], dimensions: Dimensions, column: usize, residuals: &mut [u8]) {
    let channel = column / dimensions.width;
    let x = column % dimensions.width;

    for (y, residual) in residuals.iter_mut().enumerate() {
        let mut delta = prediction_delta(pixels, dimensions, y, x, channel);

        if channel != 1 {
            delta -= prediction_delta(pixels, dimensions, y, x, 1);
        }

        *residual = to_magnitude_sign(delta);
    }
}

// Channel delta of pixel (y, x), with the green delta added back onto the
// blue and red channels.
#[inline]
fn channel_delta(residuals: &[u8], dimensions: Dimensions, y: usize, x: usize, channel: usize) -> i32 {
    let plane = dimensions.plane_bytes();
    let position = y + x * dimensions.height;

    let green = from_magnitude_sign(residuals[plane + position]);
    if channel == 1 { green }
    else { from_magnitude_sign(residuals[channel * plane + position]) + green }
}

// The first pixel of every row, rebuilt in scan order. Each depends on the
// previous one, so this sweep is serial; everything else is not.
fn decode_first_column(residuals: &[u8], dimensions: Dimensions) -> Vec<[u8; 3]> {
    let mut first_pixels = Vec::with_capacity(dimensions.height);
    let mut previous = [0_u8; 3];

    for y in 0 .. dimensions.height {
        let mut pixel = [0_u8; 3];
        for (channel, value) in pixel.iter_mut().enumerate() {
            *value = (previous[channel] as i32 + channel_delta(residuals, dimensions, y, 0, channel)) as u8;
        }

        first_pixels.push(pixel);
        previous = pixel;
    }

    first_pixels
}

fn decode_row(residuals: &[u8], first_pixels: &[[u8; 3]], dimensions: Dimensions, y: usize, row: &mut [u8]) {
    let mut previous = first_pixels[y];
    row[.. 3].copy_from_slice(&previous);

    for x in 1 .. dimensions.width {
        for channel in 0 .. 3 {
            previous[channel] = (previous[channel] as i32 + channel_delta(residuals, dimensions, y, x, channel)) as u8;
        }

        row[x * 3 .. x * 3 + 3].copy_from_slice(&previous);
    }

    for padding in &mut row[dimensions.width * 3 ..] {
        *padding = 0;
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn image(dimensions: Dimensions, pixels: &[[u8; 3]]) -> Vec<u8> {
        assert_eq!(pixels.len(), dimensions.plane_bytes());
        let mut bytes = vec![0_u8; dimensions.file_size()];

        for y in 0 .. dimensions.height {
            for x in 0 .. dimensions.width {
                let position = HEADER_SIZE + y * dimensions.row_stride() + x * 3;
                bytes[position .. position + 3].copy_from_slice(&pixels[y * dimensions.width + x]);
            }
        }

        bytes
    }

    #[test]
    fn magnitude_sign_is_a_bijection(){
        for byte in 0 ..= 255_u8 {
            let residual = from_magnitude_sign(byte);
            assert!((-128 ..= 127).contains(&residual));
            assert_eq!(to_magnitude_sign(residual), byte);
        }

        assert_eq!(to_magnitude_sign(0), 0);
        assert_eq!(to_magnitude_sign(1), 2);
        assert_eq!(to_magnitude_sign(-1), 1);
        assert_eq!(to_magnitude_sign(255), 1); // folded modulo 256
        assert_eq!(to_magnitude_sign(-10), 19);
    }

    #[test]
    fn single_white_pixel(){
        let dimensions = Dimensions { width: 1, height: 1 };
        let mut bytes = image(dimensions, &[[255, 255, 255]]);

        pixels_to_residuals(&mut bytes, dimensions);

        // blue and red deltas cancel against green, green folds to one
        assert_eq!(&bytes[HEADER_SIZE ..], &[0, 1, 0, 0]);
    }

    #[test]
    fn identical_neighbors_leave_only_the_first_column(){
        let dimensions = Dimensions { width: 2, height: 1 };
        let mut bytes = image(dimensions, &[[10, 20, 30], [10, 20, 30]]);

        pixels_to_residuals(&mut bytes, dimensions);

        // column zero: (10-20, 20, 30-20) folded; column one: all zero
        assert_eq!(&bytes[HEADER_SIZE .. HEADER_SIZE + 6], &[19, 0, 40, 0, 20, 0]);
    }

    #[test]
    fn gray_ramp_leaves_only_green_residuals(){
        let dimensions = Dimensions { width: 4, height: 1 };
        let mut bytes = image(dimensions, &[[0; 3], [1; 3], [2; 3], [3; 3]]);

        pixels_to_residuals(&mut bytes, dimensions);

        assert_eq!(
            &bytes[HEADER_SIZE .. HEADER_SIZE + 12],
            &[0, 0, 0, 0,  0, 2, 2, 2,  0, 0, 0, 0]
        );
    }

    #[test]
    fn planes_are_column_major(){
        let dimensions = Dimensions { width: 2, height: 2 };
        let mut bytes = image(dimensions, &[
            [9, 0, 0], [0, 0, 0],
            [0, 0, 0], [0, 0, 0],
        ]);

        pixels_to_residuals(&mut bytes, dimensions);

        // the blue residual of pixel (y 0, x 0) lands at plane offset y + x*height
        assert_eq!(bytes[HEADER_SIZE], to_magnitude_sign(9));
    }

    #[test]
    fn roundtrip_random_pixels(){
        use rand::prelude::*;
        let mut random = StdRng::seed_from_u64(42);

        for &(width, height) in &[(1, 1), (1, 5), (5, 1), (2, 2), (3, 7), (8, 4), (13, 9)] {
            let dimensions = Dimensions { width, height };

            let pixels: Vec<[u8; 3]> = (0 .. dimensions.plane_bytes())
                .map(|_| [random.random(), random.random(), random.random()])
                .collect();

            let original = image(dimensions, &pixels);
            let mut transformed = original.clone();

            pixels_to_residuals(&mut transformed, dimensions);
            residuals_to_pixels(&mut transformed, dimensions);

            assert_eq!(transformed, original, "width {} height {}", width, height);
        }
    }

    #[test]
    fn roundtrip_zeroes_the_row_padding(){
        let dimensions = Dimensions { width: 1, height: 2 };
        let mut bytes = image(dimensions, &[[1, 2, 3], [4, 5, 6]]);

        // scribble over the padding byte of each row
        bytes[HEADER_SIZE + 3] = 0xee;
        bytes[HEADER_SIZE + 7] = 0xee;

        pixels_to_residuals(&mut bytes, dimensions);
        residuals_to_pixels(&mut bytes, dimensions);

        assert_eq!(&bytes[HEADER_SIZE ..], &[1, 2, 3, 0, 4, 5, 6, 0]);
    }
}
