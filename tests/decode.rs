// ffv1 crate
extern crate ffv1;

use ffv1::constants::YCBCR;
use ffv1::decoder::Decoder;
use ffv1::error::Error;

// A complete, minimal FFV1 version 3 bitstream: an 8-bit YCbCr (no
// chroma, no alpha), single-slice (1x1 grid), range-coded (default
// state transition table), error-concealment-disabled configuration
// record with a single all-zero quantization table (every context
// quantizes to 0, so every sample's prediction residual is read from
// the same state array). Bytes were produced with an independent
// carry-propagating range encoder and checked bit-for-bit against this
// crate's own range coder before being pasted in here.
//
// See: 9.1.1. Multi-threading Support and Independence of Slices
const CONFIG: [u8; 19] = [
    80, 170, 122, 224, 159, 62, 124, 249, 243, 231, 207, 112, 87, 0, 0, 67, 221, 191, 248,
];

// A single 4x4 keyframe slice coded against CONFIG above: every
// residual is coded as `sr(0)`, so with an all-zero quant table (every
// context is 0) and a zero-initialized border, every decoded sample
// stays zero.
const PACKET: [u8; 11] = [254, 255, 166, 105, 0, 0, 0, 0, 0, 0, 8];

#[test]
fn decodes_minimal_single_slice_frame_to_all_zero_samples() {
    let mut decoder = Decoder::new(&CONFIG, 4, 4).expect("valid config record");

    let frame = decoder.decode_frame(&PACKET).expect("valid packet");

    assert_eq!(frame.width, 4);
    assert_eq!(frame.height, 4);
    assert_eq!(frame.bit_depth, 8);
    assert_eq!(frame.color_space, YCBCR as isize);
    assert!(!frame.has_chroma);
    assert!(!frame.has_alpha);

    assert_eq!(frame.buf.len(), 1);
    assert_eq!(frame.buf[0], vec![0u8; 16]);
}

#[test]
fn decoding_the_same_frame_twice_is_independent() {
    // Intra-only (3.7 Coding of Frame Pixels / Non-goals: no inter
    // prediction), so re-decoding the same keyframe packet must
    // produce the same result every time rather than drifting through
    // carried-over slice state.
    let mut decoder = Decoder::new(&CONFIG, 4, 4).expect("valid config record");

    let first = decoder.decode_frame(&PACKET).expect("valid packet");
    let second = decoder.decode_frame(&PACKET).expect("valid packet");

    assert_eq!(first.buf[0], second.buf[0]);
}

#[test]
fn rejects_zero_dimensions() {
    let err = Decoder::new(&CONFIG, 0, 4).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn rejects_empty_config_record() {
    let err = Decoder::new(&[], 4, 4).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn rejects_truncated_packet() {
    let mut decoder = Decoder::new(&CONFIG, 4, 4).expect("valid config record");

    // Lopping off the footer leaves no valid (offset, size) slice
    // descriptor to scan backwards from.
    let truncated = &PACKET[..PACKET.len() - 3];
    let err = decoder.decode_frame(truncated).unwrap_err();
    assert!(matches!(err, Error::InvalidBitstream(_)));
}
