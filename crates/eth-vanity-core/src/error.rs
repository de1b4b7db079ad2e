use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("derivation index {index} out of range: must be below 2^31")]
    IndexOutOfRange { index: u64 },

    #[error("derived child key is invalid (IL >= n or key == 0)")]
    InvalidChildKey,

    #[error("invalid curve point: {0}")]
    InvalidPoint(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid match predicate: {0}")]
    InvalidPredicate(String),

    #[error("mnemonic is not available")]
    MissingMnemonic,

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid entropy length {got}: expected one of 16, 20, 24, 28, or 32 bytes")]
    InvalidEntropyLength { got: usize },

    #[error("invalid key: {0}")]
    InvalidKey(String),
}
