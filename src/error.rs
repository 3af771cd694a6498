use thiserror::Error;

/// General decoding errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Zero or otherwise nonsensical frame dimensions.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The configuration record failed its CRC, named an unsupported
    /// version, or combined flags in a contradictory way.
    #[error("invalid configuration record: {0}")]
    InvalidConfig(String),
    /// The bitstream itself is malformed: a footer walk overshot the
    /// packet, a range-coded exponent exceeded 31, or a slice's byte
    /// range doesn't fit inside the packet.
    #[error("invalid bitstream: {0}")]
    InvalidBitstream(String),
    /// A slice declared `error_status != 0`, or its CRC-32/MPEG-2 did
    /// not check out.
    #[error("integrity failure: {0}")]
    IntegrityFailure(String),
    /// A field names a feature this decoder does not implement (e.g.
    /// Golomb-Rice coding above 8 bits per sample).
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// A specialised `Result` type for decoding operations.
pub type Result<T> = ::std::result::Result<T, Error>;
