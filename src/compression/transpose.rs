
//! Pack the bits of the residual bytes into eight bit planes.
//!
//! After the residual transform most bytes are tiny, so bits two to seven
//! are almost always zero. Transposing every group of eight consecutive
//! bytes as an 8×8 bit matrix gathers equal bit positions into whole bytes:
//! the high-bit planes become long runs of zeros that the zero elimination
//! stage removes wholesale.
//!
//! The transposed bytes are laid out plane-major, eight slabs of one byte
//! per group each. A trailing remainder of fewer than eight residual bytes
//! is left untouched.

use std::convert::TryInto;
use crate::meta::{Dimensions, HEADER_SIZE};

#[cfg(feature = "rayon")]
use rayon::prelude::*;


/// Transpose the 8×8 bit matrix stored in a 64 bit word, where matrix row
/// `i` is the `i`-th least significant byte: bit `i` of output byte `j`
/// equals bit `j` of input byte `i`.
///
/// Three exchange layers, each of which is its own inverse, so applying the
/// whole transform twice returns the original word.
#[inline]
pub fn transpose_8x8(mut word: u64) -> u64 {
    let swap = (word ^ (word >> 7)) & 0x00aa_00aa_00aa_00aa;
    word ^= swap ^ (swap << 7);

    let swap = (word ^ (word >> 14)) & 0x0000_cccc_0000_cccc;
    word ^= swap ^ (swap << 14);

    let swap = (word ^ (word >> 28)) & 0x0000_0000_f0f0_f0f0;
    word ^= swap ^ (swap << 28);

    word
}

/// Bit-transpose the residual region of the buffer from groups of eight
/// consecutive bytes into eight plane-major slabs.
pub fn scatter_bit_planes(bytes: &mut [u8], dimensions: Dimensions) {
    let group_count = dimensions.residual_bytes() / 8;
    if group_count == 0 { return; }

    let region = &mut bytes[HEADER_SIZE .. HEADER_SIZE + group_count * 8];
    let mut words = load_contiguous(region);
    transpose_words(&mut words);

    for (group, word) in words.iter().enumerate() {
        for (plane, byte) in word.to_le_bytes().iter().enumerate() {
            region[group + plane * group_count] = *byte;
        }
    }
}

/// Undo [`scatter_bit_planes`], restoring the contiguous residual bytes.
pub fn gather_bit_planes(bytes: &mut [u8], dimensions: Dimensions) {
    let group_count = dimensions.residual_bytes() / 8;
    if group_count == 0 { return; }

    let region = &mut bytes[HEADER_SIZE .. HEADER_SIZE + group_count * 8];

    let mut words = vec![0_u64; group_count];
    for (group, word) in words.iter_mut().enumerate() {
        let mut group_bytes = [0_u8; 8];
        for (plane, byte) in group_bytes.iter_mut().enumerate() {
            *byte = region[group + plane * group_count];
        }

        *word = u64::from_le_bytes(group_bytes);
    }

    transpose_words(&mut words);

    for (group, word) in words.iter().enumerate() {
        region[group * 8 .. group * 8 + 8].copy_from_slice(&word.to_le_bytes());
    }
}


// One owned scratch of 64 bit words; groups are fully independent.
fn load_contiguous(region: &[u8]) -> Vec<u64> {
    region.chunks_exact(8)
        .map(|group| u64::from_le_bytes(group.try_into().expect("eight byte group")))
        .collect()
}

fn transpose_words(words: &mut [u64]) {
    #[cfg(feature = "rayon")]
    words.par_iter_mut().for_each(|word| *word = transpose_8x8(*word));

    #[cfg(not(feature = "rayon"))]
    words.iter_mut().for_each(|word| *word = transpose_8x8(*word));
}
