//! The fixed Golomb-Rice run-length table.
//!
//! See: 3.8.2.2.1. Run Length Coding

/// `log2_run[i]` is the log2 of the run length associated with run-index
/// `i`. 41 entries, fixed by the specification.
pub const LOG2_RUN: [u8; 41] = [
    0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8,
    9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
];
