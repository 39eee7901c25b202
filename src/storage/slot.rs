use super::errors::StorageError;
use crate::constants::WORD_SIZE;
use alloy_primitives::{keccak256, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte big-endian storage key.
///
/// Every slot handed to a [`StorageReader`](super::StorageReader) goes through this type,
/// so the fixed-width requirement of `eth_getStorageAt` holds no matter how small the
/// numeric slot index is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SlotAddress(B256);

impl SlotAddress {
    /// Slot 0.
    pub const ZERO: Self = Self(B256::ZERO);

    /// Left-pad `bytes` with zeros to 32 bytes.
    ///
    /// Fails with [`StorageError::AddressTooLarge`] instead of truncating longer input.
    pub fn pad(bytes: &[u8]) -> Result<Self, StorageError> {
        if bytes.len() > WORD_SIZE {
            return Err(StorageError::AddressTooLarge { len: bytes.len() });
        }
        let mut padded = [0u8; WORD_SIZE];
        padded[WORD_SIZE - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(B256::from(padded)))
    }

    /// Slot of a variable declared at `index`.
    pub fn from_index(index: u64) -> Self {
        Self::from_u256(U256::from(index))
    }

    /// Slot whose key is the big-endian encoding of `value`.
    pub fn from_u256(value: U256) -> Self {
        Self(B256::from(value.to_be_bytes()))
    }

    /// The slot key as a 256-bit integer.
    pub fn as_u256(&self) -> U256 {
        U256::from_be_bytes(self.0 .0)
    }

    /// The raw 32-byte key.
    pub const fn as_b256(&self) -> B256 {
        self.0
    }

    /// The slot `i` positions after this one. Wraps modulo 2^256 like the VM.
    pub fn offset(&self, i: u64) -> Self {
        Self::from_u256(self.as_u256().wrapping_add(U256::from(i)))
    }

    /// `keccak256(self)`: where the data of a dynamic array or long string rooted here begins.
    pub fn hashed(&self) -> Self {
        Self(keccak256(self.0))
    }
}

impl From<B256> for SlotAddress {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<SlotAddress> for B256 {
    fn from(value: SlotAddress) -> Self {
        value.0
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
