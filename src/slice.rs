use crate::constants::CONTEXT_SIZE;
use crate::crc32mpeg2::crc32_mpeg2;
use crate::error::{Error, Result};
use crate::golombcoder::State;
use crate::rangecoder::RangeCoder;

#[derive(Clone, Default)]
pub struct InternalFrame {
    pub keyframe: bool,
    pub slice_info: Vec<SliceInfo>,
    pub slices: Vec<Slice>,
}

#[derive(Clone, Default, Copy)]
pub struct SliceInfo {
    pub(crate) pos: usize,
    pub(crate) size: usize,
    pub(crate) error_status: u8,
}

#[derive(Clone, Default)]
pub struct Slice {
    pub(crate) header: SliceHeader,
    pub(crate) state: Vec<Vec<Vec<u8>>>,
    pub(crate) golomb_state: Vec<Vec<State>>,
    pub(crate) planes: Vec<SlicePlane>,
}

#[derive(Clone, Default)]
pub struct SliceHeader {
    pub(crate) slice_width_minus1: u32,
    pub(crate) slice_height_minus1: u32,
    pub(crate) slice_x: u32,
    pub(crate) slice_y: u32,
    pub(crate) quant_table_set_index: Vec<u8>,
    pub(crate) picture_structure: u8,
    pub(crate) sar_num: u32,
    pub(crate) sar_den: u32,
}

#[derive(Clone)]
pub struct SlicePlane {
    pub(crate) start_x: u32,
    pub(crate) start_y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) stride: u32,
    pub(crate) quant: u8,
}

/// Determines whether a given frame is a keyframe.
///
/// See: 4.3. Frame
pub fn is_keyframe(buf: &[u8]) -> bool {
    // 4. Bitstream
    let mut state: [u8; CONTEXT_SIZE] = [128; CONTEXT_SIZE];
    let mut coder = RangeCoder::new(buf);
    coder.br(&mut state)
}

/// Counts the number of slices in a frame and validates their footers,
/// as described in 9.1.1. Multi-threading Support and Independence of
/// Slices.
///
/// See: 4.8. Slice Footer
pub fn count_slices(buf: &[u8], ec: bool) -> Result<Vec<SliceInfo>> {
    let footer_size = if ec { 8 } else { 3 };

    if buf.len() < footer_size {
        return Err(Error::InvalidBitstream(
            "packet is too short to hold a single slice footer".to_owned(),
        ));
    }

    // Walk the packet from the end to the start, reading each footer, so
    // the slice positions within the packet can be derived up front and
    // each slice decoded independently (and in parallel).
    let mut end_pos = buf.len();
    let mut slice_info = Vec::new();
    while end_pos > 0 {
        if end_pos < footer_size {
            return Err(Error::InvalidBitstream(
                "slice footer walk ran past the start of the packet".to_owned(),
            ));
        }

        let mut info = SliceInfo::default();

        // 4.8.1. slice_size
        let mut size = (buf[end_pos - footer_size] as u32) << 16;
        size |= (buf[end_pos - footer_size + 1] as u32) << 8;
        size |= buf[end_pos - footer_size + 2] as u32;
        info.size = size as usize;

        if footer_size + info.size > end_pos {
            return Err(Error::InvalidBitstream(
                "slice_size overshoots the start of the packet".to_owned(),
            ));
        }
        let pos = end_pos - info.size - footer_size;

        // 4.8.2. error_status and slice CRC, only present when ec == 1.
        if ec {
            info.error_status = buf[end_pos - footer_size + 3];
            if info.error_status != 0 {
                return Err(Error::IntegrityFailure(format!(
                    "slice at offset {} reported error_status {}",
                    pos, info.error_status
                )));
            }
            if crc32_mpeg2(&buf[pos..end_pos]) != 0 {
                return Err(Error::IntegrityFailure(format!(
                    "slice at offset {} failed its CRC-32/MPEG-2 check",
                    pos
                )));
            }
        }

        info.pos = pos;
        slice_info.push(info);
        end_pos = pos;
    }

    slice_info.reverse();
    Ok(slice_info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer(size: u32) -> [u8; 3] {
        [(size >> 16) as u8, (size >> 8) as u8, size as u8]
    }

    #[test]
    fn single_slice_with_no_error_concealment() {
        let mut buf = vec![0xAB; 10];
        buf.extend_from_slice(&footer(10));
        let info = count_slices(&buf, false).unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].pos, 0);
        assert_eq!(info[0].size, 10);
    }

    #[test]
    fn two_slices_positions_are_increasing_and_cover_the_packet() {
        let mut buf = vec![0x11; 4];
        buf.extend_from_slice(&footer(4));
        let first_len = buf.len();
        buf.extend(vec![0x22; 6]);
        buf.extend_from_slice(&footer(6));

        let info = count_slices(&buf, false).unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].pos, 0);
        assert_eq!(info[0].size, 4);
        assert_eq!(info[1].pos, first_len);
        assert_eq!(info[1].size, 6);

        let last = info.last().unwrap();
        assert_eq!(last.pos + last.size + 3, buf.len());
    }

    #[test]
    fn truncated_packet_is_rejected() {
        let buf = vec![0u8; 2];
        assert!(count_slices(&buf, false).is_err());
    }

    #[test]
    fn oversized_slice_size_is_rejected() {
        let mut buf = vec![0u8; 5];
        buf.extend_from_slice(&footer(100));
        assert!(matches!(
            count_slices(&buf, false),
            Err(Error::InvalidBitstream(_))
        ));
    }

    #[test]
    fn nonzero_error_status_is_an_integrity_failure() {
        let mut buf = vec![0x33; 4];
        buf.extend_from_slice(&footer(4));
        buf.push(1); // error_status
        buf.extend_from_slice(&[0, 0, 0, 0]); // crc, irrelevant here
        assert!(matches!(
            count_slices(&buf, true),
            Err(Error::IntegrityFailure(_))
        ));
    }
}
