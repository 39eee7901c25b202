use super::errors::StorageError;
use super::{SlotAddress, StorageReader, StorageWord};
use alloy_genesis::{Genesis, GenesisAccount};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::trace;

/// Reads storage from a node over JSON-RPC (`eth_getStorageAt`).
///
/// This is the production adapter. Every call is independent, so the readers above can
/// fan out over many slots at once.
///
/// # Usage
/// ```ignore
/// let reader = RpcStorageReader::new("http://localhost:8545")?;
/// let hub = HubStorage::new(reader, HubLayout::default());
/// let counter = hub.tdd_counter().await?;
/// ```
pub struct RpcStorageReader {
    client: HttpClient,
    block: String,
}

impl RpcStorageReader {
    /// Connect to `url`, reading at the `latest` block.
    pub fn new(url: &str) -> Result<Self, ClientError> {
        Ok(Self { client: HttpClientBuilder::default().build(url)?, block: "latest".to_string() })
    }

    /// Read at another block tag or number (e.g. `"safe"`, `"0x10"`).
    pub fn at_block(mut self, block: impl Into<String>) -> Self {
        self.block = block.into();
        self
    }
}

#[async_trait]
impl StorageReader for RpcStorageReader {
    async fn read_storage(
        &self,
        account: Address,
        slot: SlotAddress,
    ) -> Result<StorageWord, StorageError> {
        trace!(target: "desmo::rpc", %account, %slot, block = %self.block, "eth_getStorageAt");
        // Decoded as a quantity so nodes that strip leading zeros are handled too.
        let value: U256 = self
            .client
            .request("eth_getStorageAt", rpc_params![account, slot.as_b256(), self.block.as_str()])
            .await
            .map_err(|err| StorageError::transport(account, slot, err))?;
        Ok(B256::from(value.to_be_bytes()))
    }
}

/// A StorageReader that reads from a genesis configuration's alloc.
///
/// Lets the readers run against pre-populated storage without a running node.
/// Unset slots read as zero; accounts missing from the alloc are a transport error.
pub struct GenesisStorageReader {
    /// The genesis alloc to read from
    alloc: BTreeMap<Address, GenesisAccount>,
}

impl GenesisStorageReader {
    /// Create a reader from a genesis configuration.
    pub fn from_genesis(genesis: &Genesis) -> Self {
        Self { alloc: genesis.alloc.clone() }
    }

    /// Load a genesis JSON file.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let genesis: Genesis = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(Self::from_genesis(&genesis))
    }
}

#[async_trait]
impl StorageReader for GenesisStorageReader {
    async fn read_storage(
        &self,
        account: Address,
        slot: SlotAddress,
    ) -> Result<StorageWord, StorageError> {
        let entry = self.alloc.get(&account).ok_or_else(|| {
            StorageError::transport(account, slot, format!("account {account} is not in the genesis alloc"))
        })?;
        Ok(entry
            .storage
            .as_ref()
            .and_then(|storage| storage.get(&slot.as_b256()).copied())
            .unwrap_or(B256::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::image::{encode_u64, StorageImage};

    const ACCOUNT: Address = Address::new([0x04; 20]);

    fn genesis_with(image: StorageImage) -> Genesis {
        let mut genesis = Genesis::default();
        genesis.alloc.insert(
            ACCOUNT,
            GenesisAccount {
                balance: U256::ZERO,
                nonce: Some(1),
                code: None,
                storage: Some(image.into_storage()),
                private_key: None,
            },
        );
        genesis
    }

    #[tokio::test]
    async fn test_genesis_reader_reads_populated_slot() {
        let mut image = StorageImage::new();
        image.set_u64(SlotAddress::from_index(1), 42);
        let reader = GenesisStorageReader::from_genesis(&genesis_with(image));

        let word = reader.read_storage(ACCOUNT, SlotAddress::from_index(1)).await.unwrap();
        assert_eq!(word, encode_u64(42));
    }

    #[tokio::test]
    async fn test_genesis_reader_unset_slot_is_zero() {
        let reader = GenesisStorageReader::from_genesis(&genesis_with(StorageImage::new()));
        let word = reader.read_storage(ACCOUNT, SlotAddress::from_index(77)).await.unwrap();
        assert_eq!(word, B256::ZERO);
    }

    #[tokio::test]
    async fn test_genesis_reader_unknown_account_is_transport_error() {
        let reader = GenesisStorageReader::from_genesis(&Genesis::default());
        let err = reader.read_storage(ACCOUNT, SlotAddress::ZERO).await.unwrap_err();
        assert!(matches!(err, StorageError::Transport { account, .. } if account == ACCOUNT));
    }

    #[tokio::test]
    async fn test_genesis_reader_from_json_file() {
        let mut image = StorageImage::new();
        image.set_string(SlotAddress::from_index(2), "from disk");
        let genesis = genesis_with(image);

        let path = std::env::temp_dir().join(format!("desmo-genesis-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string_pretty(&genesis).unwrap()).unwrap();
        let reader = GenesisStorageReader::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let text = crate::storage::read_string(&reader, ACCOUNT, SlotAddress::from_index(2)).await.unwrap();
        assert_eq!(text, "from disk");
    }

    #[tokio::test]
    async fn test_rpc_reader_rejects_malformed_url() {
        assert!(RpcStorageReader::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_rpc_reader_block_tag() {
        let reader = RpcStorageReader::new("http://127.0.0.1:8545").unwrap().at_block("safe");
        assert_eq!(reader.block, "safe");
    }
}
