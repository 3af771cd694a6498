//! The default range-coder state-transition table.
//!
//! See: 3.8.1.4. State Transition Table
//!
//! `DEFAULT_STATE_TRANSITION` is the table used whenever `coder_type` is 1
//! (and the base that `state_transition_delta` is applied to when
//! `coder_type` is 2). It is generated once, deterministically, by the
//! canonical doubling-based probability-ramp construction shared by
//! FFmpeg-derived FFV1 implementations, then memoized: every caller
//! observes the same 256 bytes for the lifetime of the process, and the
//! construction never runs more than once. Per the REDESIGN FLAGS, this
//! must behave as a fixed constant, not be recomputed per `Decoder::new`.

use std::sync::OnceLock;

static TABLE: OnceLock<[u8; 256]> = OnceLock::new();

/// Returns the default 256-entry state-transition table.
pub fn default_state_transition() -> &'static [u8; 256] {
    TABLE.get_or_init(build_default_state_transition)
}

/// Builds the default state-transition table from the doubling-based
/// probability ramp used by the reference implementation. This is run
/// exactly once; callers should go through `default_state_transition`.
fn build_default_state_transition() -> [u8; 256] {
    let mut one_state = [0u8; 256];

    let factor: i64 = 214_748_364; // (1i64 << 32) as f64 * 0.05, truncated
    let max_p: i32 = 256 - 8;
    let one: i64 = 1i64 << 32;
    let mut last_p8: i32 = 0;
    let mut p: i64 = one / 2;

    for _ in 0..128 {
        let mut p8 = ((256 * p + one / 2) >> 32) as i32;
        if p8 <= last_p8 {
            p8 = last_p8 + 1;
        }
        if last_p8 != 0 && last_p8 < 256 && p8 <= max_p {
            one_state[last_p8 as usize] = p8 as u8;
        }

        p += ((one - p) * factor + one / 2) >> 32;
        last_p8 = p8;
    }

    for i in (256 - max_p)..=max_p {
        if one_state[i as usize] != 0 {
            continue;
        }

        let mut p = ((i as i64) * one + 128) >> 8;
        p += ((one - p) * factor + one / 2) >> 32;
        let mut p8 = ((256 * p + one / 2) >> 32) as i32;
        if p8 <= i {
            p8 = i + 1;
        }
        if p8 > max_p {
            p8 = max_p;
        }
        one_state[i as usize] = p8 as u8;
    }

    one_state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memoized_table_is_stable_across_calls() {
        let a = default_state_transition();
        let b = default_state_transition();
        assert_eq!(a, b);
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn low_and_high_indices_are_untouched() {
        let table = default_state_transition();
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 0);
    }

    #[test]
    fn populated_entries_stay_within_the_capped_range() {
        let table = default_state_transition();
        for &v in table[8..=248].iter() {
            assert!(v as i32 <= 248);
        }
    }
}
