//! Desmo LD hub storage facade
//!
//! Reads the hub's registry state straight from contract storage:
//!
//!   tddSubsetSize / tddCounter / tddStoragerLength   plain counters
//!   registeredAddresses                              address[]
//!   tddStorager[key]                                 packed TDD record
//!   selectedTdds[requestId]                          string[]
//!
//! Multi-key lookups compute every slot first, then fetch them all concurrently.
//! Results are keyed by the caller's key, never by arrival order.

pub mod genesis;
pub mod slots;

pub use genesis::{hub_contract_alloc, hub_storage_image, HubSnapshot};
pub use slots::{hub_slots, tdd_fields, HubLayout};

use crate::storage::{
    array_element_addresses, decode_address, decode_u64, mapping_value_address, read_string,
    SlotAddress, StorageError, StorageReader,
};
use alloy_primitives::{Address, B256};
use futures_util::future::{try_join3, try_join_all};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A Thing Description Directory registered in the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TddRecord {
    /// Directory endpoint
    pub url: String,
    /// Registering account
    pub owner: Address,
    /// Whether the owner disabled the directory
    pub disabled: bool,
    /// Reputation score
    pub score: u64,
}

/// Typed, named reads over one hub deployment.
pub struct HubStorage<R> {
    reader: R,
    layout: HubLayout,
}

impl<R: StorageReader> HubStorage<R> {
    /// Create a facade reading `layout` through `reader`.
    pub fn new(reader: R, layout: HubLayout) -> Self {
        Self { reader, layout }
    }

    /// The layout in use.
    pub fn layout(&self) -> &HubLayout {
        &self.layout
    }

    /// The underlying reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    async fn read_u64(&self, index: u64) -> Result<u64, StorageError> {
        let word = self.reader.read_storage(self.layout.contract, SlotAddress::from_index(index)).await?;
        decode_u64(word)
    }

    /// `tddSubsetSize`: how many directories a query selects.
    pub async fn tdd_subset_size(&self) -> Result<u64, StorageError> {
        self.read_u64(self.layout.tdd_subset_size).await
    }

    /// `tddCounter`
    pub async fn tdd_counter(&self) -> Result<u64, StorageError> {
        self.read_u64(self.layout.tdd_counter).await
    }

    /// `tddStoragerLength`
    pub async fn tdd_storager_length(&self) -> Result<u64, StorageError> {
        self.read_u64(self.layout.tdd_storager_length).await
    }

    /// Every address in `registeredAddresses`, in array order.
    pub async fn registered_addresses(&self) -> Result<Vec<Address>, StorageError> {
        let contract = self.layout.contract;
        let root = SlotAddress::from_index(self.layout.registered_addresses);
        let slots = array_element_addresses(&self.reader, contract, root).await?;
        let words =
            try_join_all(slots.iter().map(|slot| self.reader.read_storage(contract, *slot))).await?;
        Ok(words.into_iter().map(decode_address).collect())
    }

    /// Look up `tddStorager[key]` for each key.
    ///
    /// Keys are the 32-byte ABI encoding of the mapping key (for an address, see
    /// [`abi_key_address`](crate::storage::abi_key_address)). Unregistered keys come back as
    /// an all-default record, as the contract itself would return.
    pub async fn tdd_storager(&self, keys: &[B256]) -> Result<BTreeMap<B256, TddRecord>, StorageError> {
        let mapping = SlotAddress::from_index(self.layout.tdd_storager);
        let bases: Vec<SlotAddress> =
            keys.iter().map(|key| mapping_value_address(mapping, key.as_slice())).collect();
        debug!(target: "desmo::hub", keys = keys.len(), %mapping, "reading TDD records");

        let records = try_join_all(bases.into_iter().map(|base| self.read_tdd(base))).await?;
        Ok(keys.iter().copied().zip(records).collect())
    }

    async fn read_tdd(&self, base: SlotAddress) -> Result<TddRecord, StorageError> {
        let contract = self.layout.contract;
        let (url, packed, score) = try_join3(
            read_string(&self.reader, contract, base.offset(tdd_fields::URL)),
            self.reader.read_storage(contract, base.offset(tdd_fields::OWNER_DISABLED)),
            self.reader.read_storage(contract, base.offset(tdd_fields::SCORE)),
        )
        .await?;

        let owner = tdd_fields::OWNER.extract(packed)?;
        Ok(TddRecord {
            url,
            owner: decode_address(B256::from(owner.to_be_bytes())),
            disabled: !tdd_fields::DISABLED.extract(packed)?.is_zero(),
            score: decode_u64(score)?,
        })
    }

    /// Look up `selectedTdds[key]` (the directory URLs chosen for a request) for each key.
    pub async fn selected_tdds(
        &self,
        keys: &[B256],
    ) -> Result<BTreeMap<B256, Vec<String>>, StorageError> {
        let mapping = SlotAddress::from_index(self.layout.selected_tdds);
        let roots: Vec<SlotAddress> =
            keys.iter().map(|key| mapping_value_address(mapping, key.as_slice())).collect();
        debug!(target: "desmo::hub", keys = keys.len(), %mapping, "reading selected TDD lists");

        let lists = try_join_all(roots.into_iter().map(|root| self.read_string_array(root))).await?;
        Ok(keys.iter().copied().zip(lists).collect())
    }

    async fn read_string_array(&self, root: SlotAddress) -> Result<Vec<String>, StorageError> {
        let contract = self.layout.contract;
        let slots = array_element_addresses(&self.reader, contract, root).await?;
        try_join_all(slots.into_iter().map(|slot| read_string(&self.reader, contract, slot))).await
    }
}
