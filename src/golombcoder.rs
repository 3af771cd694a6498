pub mod bitreader;
pub mod golomb;
pub mod tables;

pub use golomb::{sign_extend, Coder, State};
