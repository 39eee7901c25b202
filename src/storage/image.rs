//! Storage image builder.
//!
//! The inverse of the readers: lays values out the way the compiler would, so a
//! contract's storage can be pre-populated in a genesis alloc and read back.

use super::collections::contiguous_slots;
use super::errors::StorageError;
use super::helpers::PackedField;
use super::{SlotAddress, StorageWord};
use crate::constants::WORD_SIZE;
use alloy_primitives::{Address, B256, U256};
use std::collections::BTreeMap;

/// Encode a u64 value into a storage word.
pub fn encode_u64(value: u64) -> StorageWord {
    B256::from(U256::from(value).to_be_bytes())
}

/// Encode a bool into a storage word.
pub fn encode_bool(value: bool) -> StorageWord {
    encode_u64(u64::from(value))
}

/// Encode an address into a storage word (left-padded).
pub fn encode_address(addr: Address) -> StorageWord {
    addr.into_word()
}

/// Lay out a `string` rooted at `root`.
///
/// Short strings (< 32 bytes) produce one inline word. Longer ones produce the
/// `len * 2 + 1` root word followed by the zero-padded data words at `keccak256(root) + i`.
pub fn encode_string(root: SlotAddress, value: &str) -> Vec<(SlotAddress, StorageWord)> {
    let bytes = value.as_bytes();
    if bytes.len() < WORD_SIZE {
        let mut word = [0u8; WORD_SIZE];
        word[..bytes.len()].copy_from_slice(bytes);
        word[WORD_SIZE - 1] = (bytes.len() * 2) as u8;
        return vec![(root, B256::from(word))];
    }

    let root_word = B256::from((U256::from(bytes.len()) * U256::from(2) + U256::from(1)).to_be_bytes());
    let chunks = bytes.chunks(WORD_SIZE);
    let slots = contiguous_slots(root.hashed(), chunks.len() as u64);

    let mut words = Vec::with_capacity(slots.len() + 1);
    words.push((root, root_word));
    for (slot, chunk) in slots.into_iter().zip(chunks) {
        let mut word = [0u8; WORD_SIZE];
        word[..chunk.len()].copy_from_slice(chunk);
        words.push((slot, B256::from(word)));
    }
    words
}

/// A contract's storage under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageImage {
    words: BTreeMap<SlotAddress, StorageWord>,
}

impl StorageImage {
    /// Create an empty image.
    pub fn new() -> Self {
        Self::default()
    }

    /// The word at `slot`; unset slots read as zero.
    pub fn get(&self, slot: SlotAddress) -> StorageWord {
        self.words.get(&slot).copied().unwrap_or(B256::ZERO)
    }

    /// Iterate over the populated slots in key order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotAddress, StorageWord)> + '_ {
        self.words.iter().map(|(slot, word)| (*slot, *word))
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Store a raw word.
    pub fn set(&mut self, slot: SlotAddress, word: StorageWord) -> &mut Self {
        self.words.insert(slot, word);
        self
    }

    /// Store a u64.
    pub fn set_u64(&mut self, slot: SlotAddress, value: u64) -> &mut Self {
        self.set(slot, encode_u64(value))
    }

    /// Store an address.
    pub fn set_address(&mut self, slot: SlotAddress, addr: Address) -> &mut Self {
        self.set(slot, encode_address(addr))
    }

    /// Store a string in short or long form.
    pub fn set_string(&mut self, root: SlotAddress, value: &str) -> &mut Self {
        for (slot, word) in encode_string(root, value) {
            self.set(slot, word);
        }
        self
    }

    /// Write a packed member into `slot`, keeping the members already packed there.
    pub fn set_packed(
        &mut self,
        slot: SlotAddress,
        field: PackedField,
        value: U256,
    ) -> Result<&mut Self, StorageError> {
        let word = field.insert(self.get(slot), value)?;
        Ok(self.set(slot, word))
    }

    /// Store a dynamic array: its length at `root`, elements from `keccak256(root)`.
    ///
    /// Returns the element slots so the caller can fill them.
    pub fn set_array_length(&mut self, root: SlotAddress, length: u64) -> Vec<SlotAddress> {
        self.set_u64(root, length);
        contiguous_slots(root.hashed(), length)
    }

    /// Convert to a genesis-style storage map. Zero words are left out, as the VM does.
    pub fn into_storage(self) -> BTreeMap<B256, B256> {
        self.words
            .into_iter()
            .filter(|(_, word)| !word.is_zero())
            .map(|(slot, word)| (slot.as_b256(), word))
            .collect()
    }
}
