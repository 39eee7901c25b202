//! Typed reads of arbitrary variables, given only their declaration slot and type.

use super::collections::{array_element_addresses, mapping_value_address};
use super::errors::StorageError;
use super::helpers::{decode_bool, decode_short_string, decode_u64};
use super::strings::read_long_string;
use super::{SlotAddress, StorageReader, StorageWord};
use crate::constants::WORD_SIZE;
use alloy_primitives::Address;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

/// Declared type of a variable, as the caller knows it from the contract source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    /// `bool`
    Boolean,
    /// `uintN` (up to 64 bits of value)
    Number,
    /// `string`
    String,
    /// Any other one-word value, returned raw
    Hex,
}

/// How a fetched word is decoded.
///
/// `ShortString` vs `LongStringHandle` comes from the word itself (its low bit),
/// not from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Nonzero word ⇒ true
    Boolean,
    /// Big-endian integer
    UnsignedInteger,
    /// Inline string
    ShortString,
    /// Root word of a long-form string
    LongStringHandle,
    /// Raw word
    OpaqueHex,
}

impl VariableKind {
    /// Pick the decoder for a word read from a variable of type `slot_type`.
    pub fn classify(slot_type: SlotType, word: StorageWord) -> Self {
        match slot_type {
            SlotType::Boolean => Self::Boolean,
            SlotType::Number => Self::UnsignedInteger,
            SlotType::Hex => Self::OpaqueHex,
            SlotType::String if word[WORD_SIZE - 1] & 1 == 1 => Self::LongStringHandle,
            SlotType::String => Self::ShortString,
        }
    }
}

/// A decoded variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageValue {
    /// A `bool`
    Bool(bool),
    /// An unsigned integer
    Number(u64),
    /// A string
    Text(String),
    /// The raw word
    Hex(StorageWord),
}

/// Read and decode the variable at `slot`.
pub async fn read_variable<R: StorageReader + ?Sized>(
    reader: &R,
    account: Address,
    slot: SlotAddress,
    slot_type: SlotType,
) -> Result<StorageValue, StorageError> {
    let word = reader.read_storage(account, slot).await?;
    match VariableKind::classify(slot_type, word) {
        VariableKind::Boolean => Ok(StorageValue::Bool(decode_bool(word))),
        VariableKind::UnsignedInteger => decode_u64(word).map(StorageValue::Number),
        VariableKind::ShortString => decode_short_string(word).map(StorageValue::Text),
        VariableKind::LongStringHandle => {
            read_long_string(reader, account, slot, word).await.map(StorageValue::Text)
        }
        VariableKind::OpaqueHex => Ok(StorageValue::Hex(word)),
    }
}

/// Read every element of the dynamic array `T[]` rooted at `slot`, in order.
pub async fn read_array<R: StorageReader + ?Sized>(
    reader: &R,
    account: Address,
    slot: SlotAddress,
    element: SlotType,
) -> Result<Vec<StorageValue>, StorageError> {
    let slots = array_element_addresses(reader, account, slot).await?;
    try_join_all(slots.into_iter().map(|slot| read_variable(reader, account, slot, element))).await
}

/// Read a struct whose members each occupy one whole slot, starting at `base`.
///
/// Packed members sharing a slot need [`PackedField`](super::PackedField) instead.
pub async fn read_struct<R: StorageReader + ?Sized>(
    reader: &R,
    account: Address,
    base: SlotAddress,
    members: &[SlotType],
) -> Result<Vec<StorageValue>, StorageError> {
    try_join_all(
        members
            .iter()
            .enumerate()
            .map(|(i, member)| read_variable(reader, account, base.offset(i as u64), *member)),
    )
    .await
}

/// Read `mapping(K => V)` at `slot` for each of `keys`.
///
/// Keys must already be in the byte form the contract hashes (see
/// [`mapping_value_address`]). The result pairs each input key with its value, in input order.
pub async fn read_mapping<R, K>(
    reader: &R,
    account: Address,
    slot: SlotAddress,
    keys: &[K],
    value_type: SlotType,
) -> Result<Vec<(K, StorageValue)>, StorageError>
where
    R: StorageReader + ?Sized,
    K: AsRef<[u8]> + Clone,
{
    let slots: Vec<SlotAddress> =
        keys.iter().map(|key| mapping_value_address(slot, key.as_ref())).collect();
    let values =
        try_join_all(slots.into_iter().map(|slot| read_variable(reader, account, slot, value_type)))
            .await?;
    Ok(keys.iter().cloned().zip(values).collect())
}
