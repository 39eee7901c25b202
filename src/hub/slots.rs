use crate::constants::DEFAULT_HUB_ADDRESS;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// DesmoLDHub contract storage layout.
///
/// Matches the compiler's storage layout output for `DesmoLDHub.sol`.
pub mod hub_slots {
    /// slot 0: tddSubsetSize (uint256)
    pub const TDD_SUBSET_SIZE: u64 = 0;
    /// slot 1: tddCounter (uint256)
    pub const TDD_COUNTER: u64 = 1;
    /// slot 2: registeredAddresses (address[])
    pub const REGISTERED_ADDRESSES: u64 = 2;
    /// slot 3: tddStoragerLength (uint256)
    pub const TDD_STORAGER_LENGTH: u64 = 3;
    /// slot 4: tddStorager (mapping(address => TDD))
    pub const TDD_STORAGER: u64 = 4;
    /// slot 5: selectedTdds (mapping(uint256 => string[]))
    pub const SELECTED_TDDS: u64 = 5;
}

/// `struct TDD { string url; address owner; bool disabled; uint256 score; }`, 96 bytes.
pub mod tdd_fields {
    use crate::storage::PackedField;

    /// base + 0: url (string, short or long form)
    pub const URL: u64 = 0;
    /// base + 1: owner and disabled, packed
    pub const OWNER_DISABLED: u64 = 1;
    /// base + 2: score (uint256)
    pub const SCORE: u64 = 2;
    /// owner: low 20 bytes of base + 1
    pub const OWNER: PackedField = PackedField::new(0, 20);
    /// disabled: byte 20 of base + 1
    pub const DISABLED: PackedField = PackedField::new(20, 1);
}

/// Where the hub lives and where each of its variables is declared.
///
/// Defaults to the known deployment; any field can be overridden from a JSON file so the
/// facade can be pointed at other deployments or test layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HubLayout {
    /// Hub contract address
    pub contract: Address,
    /// Slot of `tddSubsetSize`
    pub tdd_subset_size: u64,
    /// Slot of `tddCounter`
    pub tdd_counter: u64,
    /// Slot of `registeredAddresses`
    pub registered_addresses: u64,
    /// Slot of `tddStoragerLength`
    pub tdd_storager_length: u64,
    /// Slot of the `tddStorager` mapping
    pub tdd_storager: u64,
    /// Slot of the `selectedTdds` mapping
    pub selected_tdds: u64,
}

impl Default for HubLayout {
    fn default() -> Self {
        Self {
            contract: DEFAULT_HUB_ADDRESS,
            tdd_subset_size: hub_slots::TDD_SUBSET_SIZE,
            tdd_counter: hub_slots::TDD_COUNTER,
            registered_addresses: hub_slots::REGISTERED_ADDRESSES,
            tdd_storager_length: hub_slots::TDD_STORAGER_LENGTH,
            tdd_storager: hub_slots::TDD_STORAGER,
            selected_tdds: hub_slots::SELECTED_TDDS,
        }
    }
}

impl HubLayout {
    /// Point the layout at another deployment.
    pub fn with_contract(mut self, contract: Address) -> Self {
        self.contract = contract;
        self
    }

    /// Load a layout from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_hub_slot_values() {
        let layout = HubLayout::default();
        assert_eq!(layout.contract, DEFAULT_HUB_ADDRESS);
        assert_eq!(layout.tdd_subset_size, 0);
        assert_eq!(layout.tdd_counter, 1);
        assert_eq!(layout.registered_addresses, 2);
        assert_eq!(layout.tdd_storager_length, 3);
        assert_eq!(layout.tdd_storager, 4);
        assert_eq!(layout.selected_tdds, 5);
    }

    #[test]
    fn test_tdd_packing_fits_one_slot() {
        assert!(tdd_fields::OWNER.width + tdd_fields::DISABLED.width <= 32);
        assert_eq!(tdd_fields::DISABLED.offset, tdd_fields::OWNER.offset + tdd_fields::OWNER.width);
    }

    #[test]
    fn test_layout_partial_json_keeps_defaults() {
        let layout: HubLayout = serde_json::from_str(
            r#"{ "contract": "0x579afd382e18c9bb5fddd26f99dd5ae093ca5ff9", "tddStorager": 9 }"#,
        )
        .unwrap();
        assert_eq!(layout.contract, address!("0x579afd382e18c9bb5fddd26f99dd5ae093ca5ff9"));
        assert_eq!(layout.tdd_storager, 9);
        assert_eq!(layout.selected_tdds, hub_slots::SELECTED_TDDS);
    }

    #[test]
    fn test_with_contract_overrides_address() {
        let other = Address::repeat_byte(0x99);
        assert_eq!(HubLayout::default().with_contract(other).contract, other);
    }
}
