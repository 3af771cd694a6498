//! CRC-32/MPEG-2, as used for the configuration record and (optionally)
//! each slice footer.
//!
//! See: 4.10. CRC-32/MPEG-2 — polynomial 0x04C11DB7, init 0xFFFFFFFF, no
//! final XOR, non-reflected (MSB-first) input and output. A buffer
//! "passes" when the running CRC over all of its bytes, footer included,
//! equals zero.

use crc::{Crc, CRC_32_MPEG_2};

static MPEG2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Computes CRC-32/MPEG-2 over `buf`.
pub fn crc32_mpeg2(buf: &[u8]) -> u32 {
    MPEG2.checksum(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value_matches_catalog() {
        // The catalog "check" value for CRC-32/MPEG-2 is the CRC of the
        // ASCII string "123456789".
        assert_eq!(crc32_mpeg2(b"123456789"), 0x0376_E6E7);
    }

    #[test]
    fn buffer_with_appended_crc_is_zero() {
        let data = b"an arbitrary ffv1 configuration record payload";
        let crc = crc32_mpeg2(data);
        let mut buf = data.to_vec();
        buf.extend_from_slice(&crc.to_be_bytes());
        assert_eq!(crc32_mpeg2(&buf), 0);
    }

    #[test]
    fn empty_buffer_is_nonzero() {
        assert_ne!(crc32_mpeg2(b""), 0);
    }
}
