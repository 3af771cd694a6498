use crate::constants::{CONTEXT_SIZE, MAX_CONTEXT_INPUTS, MAX_QUANT_TABLES};
use crate::crc32mpeg2::crc32_mpeg2;
use crate::error::{Error, Result};
use crate::rangecoder::RangeCoder;

/// The FFV1 configuration record, carried out-of-band by the container
/// (e.g. as Matroska `CodecPrivate`) and parsed once per stream.
///
/// See: * 4.1. Parameters
///      * 4.2. Configuration Record
pub struct ConfigRecord {
    pub version: u8,
    pub micro_version: u8,
    pub coder_type: u8,
    pub state_transition_delta: [i16; 256],
    pub colorspace_type: u8,
    pub bits_per_raw_sample: u8,
    pub chroma_planes: bool,
    pub log2_h_chroma_subsample: u8,
    pub log2_v_chroma_subsample: u8,
    pub extra_plane: bool,
    pub num_h_slices_minus1: u8,
    pub num_v_slices_minus1: u8,
    pub quant_table_set_count: usize,
    pub context_count: [i32; MAX_QUANT_TABLES],
    pub quant_tables: [[[i16; 256]; MAX_CONTEXT_INPUTS]; MAX_QUANT_TABLES],
    pub initial_states: Vec<Vec<Vec<u8>>>,
    pub ec: u8,
    pub intra: u8,
    pub width: u32,
    pub height: u32,
}

impl ConfigRecord {
    /// Parses the configuration record from the codec private data
    /// and stores the width and height provided by the container.
    ///
    /// See: * 4.1. Parameters
    ///      * 4.2. Configuration Record
    pub fn parse_config_record(buf: &[u8], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(
                "frame width and height must be nonzero".to_owned(),
            ));
        }

        // Before we do anything, CRC check.
        //
        // See: 4.2.2. configuration_record_crc_parity
        if crc32_mpeg2(buf) != 0 {
            return Err(Error::InvalidConfig(
                "failed CRC check for configuration record".to_owned(),
            ));
        }

        let mut coder = RangeCoder::new(buf);
        let mut state_transition_delta: [i16; 256] = [0; 256];
        let mut context_count: [i32; MAX_QUANT_TABLES] = [0; MAX_QUANT_TABLES];
        let mut quant_tables: [[[i16; 256]; MAX_CONTEXT_INPUTS]; MAX_QUANT_TABLES] =
            [[[0; 256]; MAX_CONTEXT_INPUTS]; MAX_QUANT_TABLES];

        // 4. Bitstream
        let mut state: [u8; CONTEXT_SIZE] = [128; CONTEXT_SIZE];

        // 4.1.1. version
        let version = coder.ur(&mut state)? as u8;
        if version != 3 {
            return Err(Error::Unsupported(format!(
                "only FFV1 version 3 is supported, got version {}",
                version
            )));
        }

        // 4.1.2. micro_version
        let micro_version = coder.ur(&mut state)? as u8;
        if micro_version < 1 {
            return Err(Error::InvalidConfig(
                "only FFV1 micro version >=1 supported".to_owned(),
            ));
        }

        // 4.1.3. coder_type
        let coder_type = coder.ur(&mut state)? as u8;
        if coder_type > 2 {
            return Err(Error::InvalidConfig(format!(
                "invalid coder_type: {}",
                coder_type
            )));
        }

        // 4.1.4. state_transition_delta
        if coder_type > 1 {
            for delta in state_transition_delta.iter_mut().skip(1) {
                *delta = coder.sr(&mut state)? as i16;
            }
        }

        // 4.1.5. colorspace_type
        let colorspace_type = coder.ur(&mut state)? as u8;
        if colorspace_type > 1 {
            return Err(Error::InvalidConfig(format!(
                "invalid colorspace_type: {}",
                colorspace_type
            )));
        }

        // 4.1.7. bits_per_raw_sample
        let mut bits_per_raw_sample = coder.ur(&mut state)? as u8;
        if bits_per_raw_sample == 0 {
            bits_per_raw_sample = 8;
        }
        if coder_type == 0 && bits_per_raw_sample != 8 {
            return Err(Error::Unsupported(
                "golomb-rice mode cannot have >8bit per sample".to_owned(),
            ));
        }

        // 4.1.6. chroma_planes
        let chroma_planes = coder.br(&mut state);
        if colorspace_type == 1 && !chroma_planes {
            return Err(Error::InvalidConfig(
                "RGB must contain chroma planes".to_owned(),
            ));
        }

        // 4.1.8. log2_h_chroma_subsample
        let log2_h_chroma_subsample = coder.ur(&mut state)? as u8;
        if colorspace_type == 1 && log2_h_chroma_subsample != 0 {
            return Err(Error::InvalidConfig("RGB cannot be subsampled".to_owned()));
        }

        // 4.1.9. log2_v_chroma_subsample
        let log2_v_chroma_subsample = coder.ur(&mut state)? as u8;
        if colorspace_type == 1 && log2_v_chroma_subsample != 0 {
            return Err(Error::InvalidConfig("RGB cannot be subsampled".to_owned()));
        }

        // 4.1.10. extra_plane
        let extra_plane = coder.br(&mut state);
        // 4.1.11. num_h_slices
        let num_h_slices_minus1 = coder.ur(&mut state)? as u8;
        // 4.1.12. num_v_slices
        let num_v_slices_minus1 = coder.ur(&mut state)? as u8;

        // 4.1.13. quant_table_set_count
        let quant_table_set_count = coder.ur(&mut state)? as usize;
        if quant_table_set_count == 0 {
            return Err(Error::InvalidConfig(
                "quant_table_set_count may not be zero".to_owned(),
            ));
        } else if quant_table_set_count > MAX_QUANT_TABLES {
            return Err(Error::InvalidConfig(format!(
                "too many quant tables: {} > {}",
                quant_table_set_count, MAX_QUANT_TABLES
            )));
        }

        for i in 0..quant_table_set_count {
            // 4.9. Quantization Table Set
            let mut scale = 1;
            for j in 0..MAX_CONTEXT_INPUTS {
                // Each table has its own state table.
                let mut quant_state: [u8; CONTEXT_SIZE] = [128; CONTEXT_SIZE];
                let mut v = 0;
                let mut k = 0;
                while k < 128 {
                    let len_minus1 = coder.ur(&mut quant_state)?;
                    for _ in 0..(len_minus1 + 1) as usize {
                        quant_tables[i][j][k] = (scale * v) as i16;
                        k += 1;
                    }
                    v += 1;
                }
                for k in 1..128 {
                    quant_tables[i][j][256 - k] = -quant_tables[i][j][k];
                }
                quant_tables[i][j][128] = -quant_tables[i][j][127];
                scale *= 2 * v - 1;
            }
            context_count[i] = (scale + 1) as i32 / 2;
        }

        // The bitstream nests a variable-length buffer in the middle
        // dimension of what is otherwise a fixed 3D array.
        let mut initial_state_delta: Vec<Vec<Vec<i16>>> = vec![Vec::new(); quant_table_set_count];
        for i in 0..quant_table_set_count {
            initial_state_delta[i] = vec![Vec::new(); context_count[i] as usize];
            for j in 0..context_count[i] as usize {
                initial_state_delta[i][j] = vec![0; CONTEXT_SIZE];
            }
            let states_coded = coder.br(&mut state);
            if states_coded {
                for j in 0..context_count[i] as usize {
                    for k in 0..CONTEXT_SIZE {
                        initial_state_delta[i][j][k] = coder.sr(&mut state)? as i16;
                    }
                }
            }
        }

        let mut initial_states = vec![Vec::new(); initial_state_delta.len()];
        for i in 0..initial_state_delta.len() {
            initial_states[i] = vec![Vec::new(); initial_state_delta[i].len()];
            for j in 0..initial_state_delta[i].len() {
                initial_states[i][j] = vec![0; initial_state_delta[i][j].len()];
                for k in 0..initial_state_delta[i][j].len() {
                    let pred = if j != 0 {
                        initial_states[i][j - 1][k] as i16
                    } else {
                        128
                    };
                    initial_states[i][j][k] = ((pred + initial_state_delta[i][j][k]) & 255) as u8;
                }
            }
        }

        // 4.1.16. ec
        let ec = coder.ur(&mut state)? as u8;
        // 4.1.17. intra
        let intra = coder.ur(&mut state)? as u8;

        Ok(ConfigRecord {
            version,
            micro_version,
            coder_type,
            state_transition_delta,
            colorspace_type,
            bits_per_raw_sample,
            chroma_planes,
            log2_h_chroma_subsample,
            log2_v_chroma_subsample,
            extra_plane,
            num_h_slices_minus1,
            num_v_slices_minus1,
            quant_table_set_count,
            context_count,
            quant_tables,
            initial_states,
            ec,
            intra,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected_before_crc_check() {
        let err = ConfigRecord::parse_config_record(&[], 0, 10).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn bad_crc_is_rejected() {
        let buf = [0u8, 0, 0, 0];
        let err = ConfigRecord::parse_config_record(&buf, 16, 16).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn quant_table_is_antisymmetric() {
        // Build a minimal record by hand-decoding is impractical here; this
        // exercises the antisymmetry invariant directly on a table shaped
        // the way parse_config_record would have produced one.
        let mut table = [0i16; 256];
        for (v, slot) in table.iter_mut().take(128).enumerate() {
            *slot = v as i16;
        }
        for k in 1..128 {
            table[256 - k] = -table[k];
        }
        table[128] = -table[127];
        for k in 1..128 {
            assert_eq!(table[256 - k], -table[k]);
        }
    }
}
