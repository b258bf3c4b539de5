
//! Losslessly compress and decompress 24 bit uncompressed BMP images.
//!
//! The codec reshapes the raw BGR pixel data with a short pipeline of exactly
//! invertible transforms until the buffer consists mostly of zero bytes, and
//! then stores only the nonzero bytes together with a bitmap of their
//! positions. No entropy coding is involved.
//!
//! The pipeline, in encoding order:
//!
//! 1. Neutralise the BMP header by subtracting the constants every supported
//!    header contains ([`meta`]).
//! 2. Replace each pixel by its prediction residual, fold the sign into the
//!    least significant bit, and deinterleave the channels into column-major
//!    planes ([`compression::residual`]).
//! 3. Transpose every group of eight residual bytes as an 8×8 bit matrix, so
//!    that the mostly-zero high bits gather into whole zero bytes
//!    ([`compression::transpose`]).
//! 4. Drop all zero bytes, recording their positions in a bitmap
//!    ([`compression::zero`], applied over the whole buffer by [`container`]).

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,

    clippy::all,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    missing_copy_implementations,
    trivial_numeric_casts,
)]

#![forbid(unsafe_code)]


pub mod io;
pub mod error;
pub mod meta;
pub mod compression;
pub mod container;


/// Re-exports of the types commonly required for simple compressing and
/// decompressing of a bmp buffer or file.
pub mod prelude {

    // main exports
    pub use crate::container::{compress, decompress, compress_file, decompress_file};
    pub use crate::compression::{preprocess, postprocess};

    // secondary data types
    pub use crate::meta::Dimensions;
    pub use crate::error::{Result, Error};
}
