use super::slots::{tdd_fields, HubLayout};
use super::TddRecord;
use crate::storage::collections::mapping_value_address;
use crate::storage::image::StorageImage;
use crate::storage::{SlotAddress, StorageError};
use alloy_genesis::GenesisAccount;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hub state to lay out in storage.
///
/// Mapping keys are the 32-byte ABI encodings the contract hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HubSnapshot {
    pub tdd_subset_size: u64,
    pub tdd_counter: u64,
    pub registered_addresses: Vec<Address>,
    pub tdd_storager: BTreeMap<B256, TddRecord>,
    pub selected_tdds: BTreeMap<B256, Vec<String>>,
}

/// Build the hub's storage for `snapshot` under `layout`.
///
/// `tddStoragerLength` is written as the number of records.
pub fn hub_storage_image(
    layout: &HubLayout,
    snapshot: &HubSnapshot,
) -> Result<StorageImage, StorageError> {
    let mut image = StorageImage::new();

    // counters
    image.set_u64(SlotAddress::from_index(layout.tdd_subset_size), snapshot.tdd_subset_size);
    image.set_u64(SlotAddress::from_index(layout.tdd_counter), snapshot.tdd_counter);
    image.set_u64(
        SlotAddress::from_index(layout.tdd_storager_length),
        snapshot.tdd_storager.len() as u64,
    );

    // registeredAddresses: length at the root, elements from keccak256(root)
    let registered = image.set_array_length(
        SlotAddress::from_index(layout.registered_addresses),
        snapshot.registered_addresses.len() as u64,
    );
    for (slot, addr) in registered.into_iter().zip(&snapshot.registered_addresses) {
        image.set_address(slot, *addr);
    }

    // tddStorager: url at base, owner|disabled packed at base + 1, score at base + 2
    let tdd_mapping = SlotAddress::from_index(layout.tdd_storager);
    for (key, record) in &snapshot.tdd_storager {
        let base = mapping_value_address(tdd_mapping, key.as_slice());
        let packed = base.offset(tdd_fields::OWNER_DISABLED);
        image.set_string(base.offset(tdd_fields::URL), &record.url);
        image.set_packed(packed, tdd_fields::OWNER, U256::from_be_slice(record.owner.as_slice()))?;
        image.set_packed(packed, tdd_fields::DISABLED, U256::from(u8::from(record.disabled)))?;
        image.set_u64(base.offset(tdd_fields::SCORE), record.score);
    }

    // selectedTdds: one string[] per request
    let selected_mapping = SlotAddress::from_index(layout.selected_tdds);
    for (key, urls) in &snapshot.selected_tdds {
        let root = mapping_value_address(selected_mapping, key.as_slice());
        let slots = image.set_array_length(root, urls.len() as u64);
        for (slot, url) in slots.into_iter().zip(urls) {
            image.set_string(slot, url);
        }
    }

    Ok(image)
}

/// Returns a genesis alloc entry for the hub contract holding `snapshot`.
///
/// No bytecode is attached: the account exists only so its storage can be read back.
pub fn hub_contract_alloc(
    layout: &HubLayout,
    snapshot: &HubSnapshot,
) -> Result<GenesisAccount, StorageError> {
    let storage = hub_storage_image(layout, snapshot)?.into_storage();
    Ok(GenesisAccount {
        balance: U256::ZERO,
        nonce: Some(1),
        code: None,
        storage: Some(storage),
        private_key: None,
    })
}
