//! A decoder for FFV1 version 3, the lossless/mathematically-lossless
//! intra video codec described by draft-ietf-cellar-ffv1.
//!
//! The entry point is [`decoder::Decoder`]: construct one from a
//! container-provided configuration record plus the frame dimensions,
//! then feed it packets with [`decoder::Decoder::decode_frame`] to get
//! back a [`decoder::Frame`] of planar pixel data. Slices within a frame
//! decode independently and in parallel; see 9.1.1 of the draft.

pub mod golombcoder;
pub use golombcoder::*;

pub mod rangecoder;
pub use rangecoder::*;

pub mod constants;
pub mod crc32mpeg2;
pub mod decoder;
pub mod error;
pub mod jpeg2000rct;
pub mod pred;
pub mod record;
pub mod slice;
