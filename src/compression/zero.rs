
//! Drop the zero words of a stream, remembering where they were.
//!
//! The encoder walks the input in groups of one word-width, emitting one
//! bitmap word per group (bit `j` set means the `j`-th word of the group was
//! nonzero) and appending every nonzero word to a dense stream. The decoder
//! walks the bitmap in the same order and reinserts a zero word wherever a
//! bit is clear. No entropy coding: the output shrinks exactly by the number
//! of zero input words, minus one bitmap word per group.

use bit_field::BitField;
use crate::error::{Error, Result};


/// A word the zero elimination codec can operate on.
pub trait Word: BitField + Copy + Default + PartialEq {}

impl Word for u8 {}
impl Word for u16 {}
impl Word for u32 {}
impl Word for u64 {}


/// Split the input into a dense stream of its nonzero words and a bitmap of
/// one bit per input word. The bitmap holds one word per started group of
/// `T::BIT_LENGTH` input words; unused bits of the last word stay zero.
pub fn eliminate_zeros<T: Word>(input: &[T]) -> (Vec<T>, Vec<T>) {
    let mut dense = Vec::new();
    let mut bitmap = Vec::with_capacity(bitmap_length::<T>(input.len()));

    for group in input.chunks(T::BIT_LENGTH) {
        let mut mask = T::default();

        for (bit, value) in group.iter().enumerate() {
            if *value != T::default() {
                mask.set_bit(bit, true);
                dense.push(*value);
            }
        }

        bitmap.push(mask);
    }

    (dense, bitmap)
}

/// Like [`eliminate_zeros`], but fails with [`Error::Invalid`] as soon as
/// the dense stream would outgrow the caller's capacity. Useful to abandon
/// the attempt early when the output must end up smaller than the input.
pub fn eliminate_zeros_bounded<T: Word>(input: &[T], max_dense_len: usize) -> Result<(Vec<T>, Vec<T>)> {
    let mut dense = Vec::with_capacity(max_dense_len.min(input.len()));
    let mut bitmap = Vec::with_capacity(bitmap_length::<T>(input.len()));

    for group in input.chunks(T::BIT_LENGTH) {
        let mut mask = T::default();

        for (bit, value) in group.iter().enumerate() {
            if *value != T::default() {
                if dense.len() == max_dense_len {
                    return Err(Error::invalid("dense stream capacity exceeded"));
                }

                mask.set_bit(bit, true);
                dense.push(*value);
            }
        }

        bitmap.push(mask);
    }

    Ok((dense, bitmap))
}

/// Expand the dense stream back into `count` words, reinserting a zero word
/// for every clear bitmap bit. With `pedantic`, additionally require that
/// the dense stream is consumed exactly.
pub fn restore_zeros<T: Word>(dense: &[T], bitmap: &[T], count: usize, pedantic: bool) -> Result<Vec<T>> {
    if bitmap.len() < bitmap_length::<T>(count) {
        return Err(Error::invalid("zero elimination bitmap length"));
    }

    let mut output = Vec::with_capacity(count);
    let mut position = 0;

    'groups: for mask in bitmap {
        for bit in 0 .. T::BIT_LENGTH {
            if output.len() == count { break 'groups; }

            output.push(if mask.get_bit(bit) {
                let value = *dense.get(position)
                    .ok_or_else(|| Error::invalid("zero elimination dense length"))?;

                position += 1;
                value
            }
            else {
                T::default()
            });
        }
    }

    if pedantic && position != dense.len() {
        return Err(Error::invalid("trailing zero elimination data"));
    }

    Ok(output)
}

/// Number of bitmap words required for the given input word count.
pub fn bitmap_length<T: Word>(count: usize) -> usize {
    (count + T::BIT_LENGTH - 1) / T::BIT_LENGTH
}
