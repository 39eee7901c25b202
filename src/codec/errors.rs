use thiserror::Error;

/// Errors raised while encoding or decoding query results
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The type tag after the padding is not a hex digit (or is missing)
    #[error("Result type encoding is not a valid hex string ({0}).")]
    InvalidTypeEncoding(String),

    /// The body after the type tag is not well-formed for its type
    #[error("Result value encoding is not a valid hex string ({0}).")]
    InvalidValueEncoding(String),

    /// The type tag is a hex digit outside the known set
    #[error("Unknown query result type: {0}.")]
    UnknownResultType(u8),

    /// A decimal precision that does not fit in one byte
    #[error("The precision is too big: {0} (max. 255)")]
    PrecisionTooLarge(u64),

    /// A decimal literal that cannot be represented
    #[error("Invalid decimal literal: {0}")]
    InvalidDecimal(String),

    /// A legacy envelope whose prefix or score table is malformed
    #[error("Invalid result envelope: {0}")]
    InvalidEnvelope(String),
}
