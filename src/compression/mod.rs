
//! The reversible transforms that prepare a bmp buffer for zero elimination,
//! and the zero elimination codec itself.

pub mod residual;
pub mod transpose;
pub mod zero;

use crate::error::Result;
use crate::meta::{self, Dimensions};


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// A byte slice.
pub type Bytes<'s> = &'s [u8];


/// Rewrite a supported bmp buffer in place so that most of its bytes become
/// zero: neutralise the header, replace the pixels by deinterleaved
/// magnitude-sign residuals, and gather the residual bits into bit planes.
/// The buffer length never changes.
///
/// A buffer outside the supported subset is left completely unchanged and
/// reported as an error; the caller decides whether that is fatal.
pub fn preprocess(bytes: &mut [u8]) -> Result<Dimensions> {
    let dimensions = meta::neutralize(bytes)?;
    residual::pixels_to_residuals(bytes, dimensions);
    transpose::scatter_bit_planes(bytes, dimensions);
    Ok(dimensions)
}

/// Exactly undo [`preprocess`], restoring the original bmp buffer
/// (row padding bytes are restored as zero).
///
/// A buffer that is not a preprocessed image is left completely unchanged
/// and reported as an error.
pub fn postprocess(bytes: &mut [u8]) -> Result<Dimensions> {
    let dimensions = meta::validate_neutralized(bytes)?;
    transpose::gather_bit_planes(bytes, dimensions);
    residual::residuals_to_pixels(bytes, dimensions);
    meta::restore(bytes)?;
    Ok(dimensions)
}


#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::meta::{field, HEADER_SIZE, MAGIC_BYTES};
    use crate::io::{write_i16_le, write_i32_le};

    pub fn bmp_image(width: i32, height: i32, mut pixel: impl FnMut(usize, usize) -> [u8; 3]) -> Vec<u8> {
        let dimensions = Dimensions { width: width as usize, height: height as usize };
        let mut bytes = vec![0_u8; dimensions.file_size()];

        bytes[..2].copy_from_slice(&MAGIC_BYTES);
        write_i32_le(&mut bytes, field::FILE_SIZE, dimensions.file_size() as i32);
        write_i32_le(&mut bytes, field::PIXEL_OFFSET, HEADER_SIZE as i32);
        write_i32_le(&mut bytes, field::INFO_SIZE, 40);
        write_i32_le(&mut bytes, field::WIDTH, width);
        write_i32_le(&mut bytes, field::HEIGHT, height);
        write_i16_le(&mut bytes, field::PLANES, 1);
        write_i16_le(&mut bytes, field::BITS_PER_PIXEL, 24);
        write_i32_le(&mut bytes, field::IMAGE_SIZE, dimensions.pixel_bytes() as i32);

        for y in 0 .. dimensions.height {
            for x in 0 .. dimensions.width {
                let position = HEADER_SIZE + y * dimensions.row_stride() + x * 3;
                bytes[position .. position + 3].copy_from_slice(&pixel(y, x));
            }
        }

        bytes
    }

    #[test]
    fn black_image_becomes_almost_all_zero(){
        let mut bytes = bmp_image(1, 1, |_, _| [0, 0, 0]);
        preprocess(&mut bytes).unwrap();

        let nonzero: Vec<usize> = bytes.iter().enumerate()
            .filter(|(_, &byte)| byte != 0)
            .map(|(position, _)| position)
            .collect();

        // only the retained width and height survive
        assert_eq!(nonzero, vec![field::WIDTH, field::HEIGHT]);
    }

    #[test]
    fn roundtrip_random_images(){
        use rand::prelude::*;
        let mut random = StdRng::seed_from_u64(21);

        for &(width, height) in &[(1, 1), (2, 1), (1, 2), (4, 1), (3, 3), (5, 4), (8, 8), (13, 7)] {
            let original = bmp_image(width, height, |_, _| [random.random(), random.random(), random.random()]);

            let mut buffer = original.clone();
            let dimensions = preprocess(&mut buffer).unwrap();
            assert_eq!(dimensions, Dimensions { width: width as usize, height: height as usize });
            assert_eq!(buffer.len(), original.len());

            postprocess(&mut buffer).unwrap();
            assert_eq!(buffer, original, "width {} height {}", width, height);
        }
    }

    #[test]
    fn unsupported_buffers_pass_through_unchanged(){
        let mut garbage: Vec<u8> = (0 .. 200).map(|byte| byte as u8).collect();
        let original = garbage.clone();

        assert!(preprocess(&mut garbage).is_err());
        assert_eq!(garbage, original);

        assert!(postprocess(&mut garbage).is_err());
        assert_eq!(garbage, original);
    }

    #[test]
    fn postprocess_rejects_an_unprocessed_bmp(){
        let mut bytes = bmp_image(2, 2, |_, _| [1, 2, 3]);
        let original = bytes.clone();

        assert!(postprocess(&mut bytes).is_err());
        assert_eq!(bytes, original);
    }
}
