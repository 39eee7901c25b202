use super::errors::StorageError;
use super::helpers::decode_u64;
use super::{SlotAddress, StorageReader};
use crate::constants::MAX_ARRAY_ELEMENTS;
use alloy_primitives::{Address, Keccak256, B256, U256};
use tracing::trace;

/// Compute the base slot for a dynamic array's data.
///
/// For `address[] registeredAddresses` at slot 2:
///   base = keccak256(abi.encode(2))
///   registeredAddresses[0] lives at base + 0
///   registeredAddresses[1] lives at base + 1
///   etc.
pub fn dynamic_array_base_slot(array_slot: SlotAddress) -> SlotAddress {
    array_slot.hashed()
}

/// `count` consecutive slots starting at `base`.
pub fn contiguous_slots(base: SlotAddress, count: u64) -> Vec<SlotAddress> {
    (0..count).map(|i| base.offset(i)).collect()
}

/// Slots of every element of the dynamic array rooted at `array_slot`, in declaration order.
///
/// Reads the length word first. Struct-valued elements yield only their base slot.
pub async fn array_element_addresses<R: StorageReader + ?Sized>(
    reader: &R,
    account: Address,
    array_slot: SlotAddress,
) -> Result<Vec<SlotAddress>, StorageError> {
    let length = decode_u64(reader.read_storage(account, array_slot).await?)?;
    if length > MAX_ARRAY_ELEMENTS {
        return Err(StorageError::CorruptStorageLayout(format!(
            "array at slot {array_slot} declares {length} elements (max. {MAX_ARRAY_ELEMENTS})"
        )));
    }
    trace!(target: "desmo::storage", %array_slot, length, "resolved array elements");
    Ok(contiguous_slots(dynamic_array_base_slot(array_slot), length))
}

/// Compute the slot of a mapping value: `keccak256(key . mapping_slot)`.
///
/// `key` is hashed verbatim. Solidity ABI-encodes value-type keys to 32 bytes before
/// hashing, so callers must hand in the encoded form (see [`abi_key_address`],
/// [`abi_key_u256`]); no other key encoding is derived here.
pub fn mapping_value_address(mapping_slot: SlotAddress, key: &[u8]) -> SlotAddress {
    let mut hasher = Keccak256::new();
    hasher.update(key);
    hasher.update(mapping_slot.as_b256());
    SlotAddress::from(hasher.finalize())
}

/// ABI encoding of an address mapping key (left-padded to 32 bytes).
pub fn abi_key_address(key: Address) -> B256 {
    key.into_word()
}

/// ABI encoding of a `uint256` mapping key.
pub fn abi_key_u256(key: U256) -> B256 {
    B256::from(key.to_be_bytes())
}
