use super::{SlotAddress, StorageWord};
use alloy_primitives::Address;
use thiserror::Error;

/// Errors raised while resolving or decoding contract storage
#[derive(Debug, Error)]
pub enum StorageError {
    /// A slot address does not fit in a 32-byte storage key
    #[error("Address too large to fit in a 32 bytes hex representation: occupies {len} bytes (max. 32 bytes)")]
    AddressTooLarge {
        /// Byte length of the rejected address
        len: usize,
    },

    /// The word carries the long-form flag; the caller must follow the long-string path
    #[error("Word {word} is not a short-form string")]
    NotShortString {
        /// The root word, handed back so the caller can decode its length
        word: StorageWord,
    },

    /// The word holds a value that does not fit in 64 bits
    #[error("Word {word} does not fit in a 64-bit unsigned integer")]
    IntegerOverflow {
        /// The offending word
        word: StorageWord,
    },

    /// Storage contents contradict the declared layout
    #[error("Corrupt storage layout: {0}")]
    CorruptStorageLayout(String),

    /// The raw-word accessor failed; the source error is passed through untouched
    #[error("Failed to read slot {slot} of {account}: {source}")]
    Transport {
        /// Account whose storage was being read
        account: Address,
        /// Slot being read
        slot: SlotAddress,
        /// Underlying transport failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap an accessor failure for `account`/`slot`.
    pub fn transport(
        account: Address,
        slot: SlotAddress,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport { account, slot, source: source.into() }
    }
}
