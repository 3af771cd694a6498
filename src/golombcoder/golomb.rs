//! Implements a Golomb-Rice coder as per
//! Section 3.8.2. Golomb Rice Mode of draft-ietf-cellar-ffv1.

use crate::golombcoder::bitreader::BitReader;
use crate::golombcoder::tables::LOG2_RUN;

/// Coder is an instance of a Golomb-Rice coder
/// as described in 3.8.2. Golomb Rice Mode.
pub struct Coder<'a> {
    r: BitReader<'a>,
    run_mode: isize,
    run_count: isize,
    run_index: usize,
    x: u32,
    w: u32,
}

/// State contains a single set of states for a Golomb-Rice coder as
/// defined in 3.8.2.4.
///
/// Initial Values for the VLC context state.
#[derive(Debug, Clone)]
pub struct State {
    drift: i32,
    error_sum: i32,
    bias: i32,
    count: i32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            drift: 0,
            error_sum: 4,
            bias: 0,
            count: 1,
        }
    }
}

/// Simple sign extension.
pub fn sign_extend(n: i32, bits: usize) -> i32 {
    if bits == 8 {
        n as i8 as i32
    } else {
        let mut ret = n;
        ret <<= 32 - bits;
        ret >>= 32 - bits;
        ret
    }
}

impl<'a> Coder<'a> {
    /// Creates a new Golomb-Rice coder.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: BitReader::new(buf),
            run_mode: 0,
            run_count: 0,
            run_index: 0,
            x: 0,
            w: 0,
        }
    }

    /// Should be called on a given Coder as each new plane is processed.
    /// Resets the run index and sets the slice's plane width.
    ///
    /// See: 3.8.2.2.1. Run Length Coding
    pub fn new_plane(&mut self, width: u32) {
        self.w = width;
        self.run_index = 0;
    }

    /// Starts a new run.
    fn new_run(&mut self) {
        self.run_mode = 0;
        self.run_count = 0;
    }

    /// Resets the x position and starts a new run, since runs can only
    /// span a single line.
    pub fn new_line(&mut self) {
        self.new_run();
        self.x = 0;
    }

    /// Number of bytes read as zero past the end of the underlying buffer.
    pub fn overread_bytes(&self) -> u32 {
        self.r.overread_bytes()
    }

    /// Gets the next Golomb-Rice coded signed scalar symbol.
    ///
    /// See: * 3.8.2. Golomb Rice Mode
    ///      * 4. Bitstream
    pub fn sg(&mut self, context: i32, state: &mut State, bits: usize) -> i32 {
        // Section 3.8.2.2. Run Mode
        if context == 0 && self.run_mode == 0 {
            self.run_mode = 1;
        }

        // Section 3.8.2.2.1. Run Length Coding
        if self.run_mode != 0 {
            if self.run_count == 0 && self.run_mode == 1 {
                if self.r.u(1) == 1 {
                    self.run_count = 1 << LOG2_RUN[self.run_index];
                    if self.x + self.run_count as u32 <= self.w && self.run_index < 40 {
                        self.run_index += 1;
                    }
                } else {
                    if LOG2_RUN[self.run_index] != 0 {
                        self.run_count = self.r.u(LOG2_RUN[self.run_index] as u32) as isize;
                    } else {
                        self.run_count = 0;
                    }
                    if self.run_index != 0 {
                        self.run_index -= 1;
                    }
                    // This is in the spec but how it works is... non-obvious.
                    self.run_mode = 2;
                }
            }

            self.run_count -= 1;
            // No more repeats; the run is over. Read a new symbol.
            if self.run_count < 0 {
                self.new_run();
                let mut diff = self.get_vlc_symbol(state, bits);
                // 3.8.2.2.2. Level Coding
                if diff >= 0 {
                    diff += 1;
                }
                self.x += 1;
                diff
            } else {
                // The run is still going; return a difference of zero.
                self.x += 1;
                0
            }
        } else {
            // We aren't in run mode; get a new symbol.
            self.x += 1;
            self.get_vlc_symbol(state, bits)
        }
    }

    /// Gets the next Golomb-Rice coded symbol.
    ///
    /// See: 3.8.2.3. Scalar Mode
    fn get_vlc_symbol(&mut self, state: &mut State, bits: usize) -> i32 {
        let mut i = state.count;
        let mut k = 0u32;

        while i < state.error_sum {
            k += 1;
            i += i;
        }

        let mut v = self.get_sr_golomb(k, bits);

        if 2 * state.drift < -state.count {
            v = -1 - v;
        }

        let ret = sign_extend(v + state.bias, bits);

        state.error_sum += v.abs();
        state.drift += v;

        if state.count == 128 {
            state.count >>= 1;
            state.drift >>= 1;
            state.error_sum >>= 1;
        }
        state.count += 1;
        if state.drift <= -state.count {
            state.bias = (state.bias - 1).max(-128);
            state.drift = (state.drift + state.count).max(-state.count + 1);
        } else if state.drift > 0 {
            state.bias = (state.bias + 1).min(127);
            state.drift = (state.drift - state.count).min(0);
        }

        ret
    }

    /// Gets the next signed Golomb-Rice code.
    ///
    /// See: 3.8.2.1. Signed Golomb Rice Codes
    fn get_sr_golomb(&mut self, k: u32, bits: usize) -> i32 {
        let v = self.get_ur_golomb(k, bits);
        if v & 1 == 1 {
            -(v >> 1) - 1
        } else {
            v >> 1
        }
    }

    /// Gets the next unsigned Golomb-Rice code.
    ///
    /// See: 3.8.2.1. Signed Golomb Rice Codes
    fn get_ur_golomb(&mut self, k: u32, bits: usize) -> i32 {
        for prefix in 0..12i32 {
            if self.r.u(1) == 1 {
                return self.r.u(k) as i32 + (prefix << k);
            }
        }
        self.r.u(bits as u32) as i32 + 11
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_default_matches_spec() {
        let s = State::default();
        assert_eq!(s.drift, 0);
        assert_eq!(s.error_sum, 4);
        assert_eq!(s.bias, 0);
        assert_eq!(s.count, 1);
    }

    #[test]
    fn sign_extend_8_bit_round_trip() {
        assert_eq!(sign_extend(0xFF, 8), -1);
        assert_eq!(sign_extend(0x80, 8), -128);
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(0x00, 8), 0);
    }

    #[test]
    fn sign_extend_non_8_bit_width() {
        assert_eq!(sign_extend(0x1FF, 9), -1);
        assert_eq!(sign_extend(0x100, 9), -256);
        assert_eq!(sign_extend(0x0FF, 9), 255);
    }

    #[test]
    fn new_line_resets_run_state_but_not_run_index() {
        let mut coder = Coder::new(&[0u8; 4]);
        coder.new_plane(16);
        coder.run_index = 3;
        coder.run_mode = 2;
        coder.run_count = 5;
        coder.new_line();
        assert_eq!(coder.run_mode, 0);
        assert_eq!(coder.run_count, 0);
        assert_eq!(coder.run_index, 3);
        assert_eq!(coder.x, 0);
    }

    #[test]
    fn ur_golomb_short_prefix_decodes_literal_bits() {
        // A single set bit followed by the k-bit payload picks prefix=0.
        let mut coder = Coder::new(&[0b1_010_0000]);
        let v = coder.get_ur_golomb(3, 8);
        assert_eq!(v, 0b010);
    }

    #[test]
    fn vlc_symbol_updates_count_by_one() {
        let mut coder = Coder::new(&[0xAA, 0x55, 0x0F, 0xF0]);
        let mut state = State::default();
        let before_count = state.count;
        let _ = coder.get_vlc_symbol(&mut state, 8);
        assert_eq!(state.count, before_count + 1);
    }
}
