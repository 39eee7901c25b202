//! Direct contract storage reader.
//!
//! Reads contract state straight from its storage slots instead of calling the
//! contract's getters. Slot derivation follows the compiler's storage layout rules:
//!
//! ```text
//!   value types      slot = declaration index
//!   T[] at p         length at p, element i at keccak256(p) + i
//!   mapping at p     value for key k at keccak256(k . p)
//!   string at p      < 32 bytes: inline at p, low byte = len * 2
//!                    >= 32 bytes: p holds len * 2 + 1, data at keccak256(p) + i
//! ```
//!
//! Every fetch goes through [`StorageReader`], the single capability supplied by the caller.

pub mod collections;
pub mod errors;
pub mod helpers;
pub mod image;
pub mod providers;
pub mod slot;
pub mod strings;
pub mod variables;

pub use collections::{
    abi_key_address, abi_key_u256, array_element_addresses, contiguous_slots,
    dynamic_array_base_slot, mapping_value_address,
};
pub use errors::StorageError;
pub use helpers::{
    decode_address, decode_bool, decode_hex, decode_short_string, decode_u64, PackedField,
};
pub use image::StorageImage;
pub use providers::{GenesisStorageReader, RpcStorageReader};
pub use slot::SlotAddress;
pub use strings::{read_long_string, read_string};
pub use variables::{
    read_array, read_mapping, read_struct, read_variable, SlotType, StorageValue, VariableKind,
};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

/// One raw 32-byte storage value.
pub type StorageWord = B256;

/// Trait for reading contract storage slots.
///
/// In production: implemented over JSON-RPC (`eth_getStorageAt`).
/// In tests: implemented by an in-memory map or by [`GenesisStorageReader`].
///
/// Implementations may be called concurrently for independent slots; results are
/// always reassembled by index or key, never by completion order.
#[async_trait]
pub trait StorageReader: Send + Sync {
    /// Read the word stored at `slot` of `account`. Unset slots read as zero.
    async fn read_storage(
        &self,
        account: Address,
        slot: SlotAddress,
    ) -> Result<StorageWord, StorageError>;
}
