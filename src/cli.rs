use crate::storage::{abi_key_address, abi_key_u256};
use alloy_primitives::{Address, B256, U256};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the hub reader
#[derive(Parser, Debug)]
#[command(name = "desmo-hub", about = "Desmo LD hub storage reader and query result codec")]
pub struct Cli {
    /// Enable structured JSON logging instead of human-readable output.
    ///
    /// Log level comes from `RUST_LOG`; logs go to stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a compact query result
    Decode(DecodeArgs),
    /// Encode a query result
    Encode(EncodeArgs),
    /// Read the hub contract's state from storage
    Hub(HubArgs),
    /// Print a genesis alloc entry laying out a hub snapshot
    Alloc(AllocArgs),
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex payload, with or without `0x`
    pub payload: String,

    /// Treat the input as a legacy envelope (request id and score table in front)
    #[arg(long, conflicts_with = "callback")]
    pub envelope: bool,

    /// Treat the input as callback data and decode its last comma-separated segment
    #[arg(long)]
    pub callback: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Wrap the result in a legacy envelope for this request id
    #[arg(long)]
    pub request_id: Option<B256>,

    /// Source reward as `INDEX:REWARD` (repeatable, envelope only, at most 16)
    #[arg(long = "source", value_parser = parse_source_reward, requires = "request_id")]
    pub sources: Vec<(u32, u8)>,

    #[command(subcommand)]
    pub value: EncodeValue,
}

#[derive(Subcommand, Debug)]
pub enum EncodeValue {
    /// A signed integer
    Integer {
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },
    /// A decimal literal; its fractional digits set the precision (e.g. `-57.00364`)
    Decimal {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// A text value
    Text { value: String },
}

#[derive(Args, Debug)]
pub struct HubArgs {
    /// JSON-RPC endpoint to read storage from
    #[arg(long, env = "DESMO_RPC_URL", required_unless_present = "genesis")]
    pub rpc_url: Option<String>,

    /// Block tag or number for RPC reads
    #[arg(long, default_value = "latest")]
    pub block: String,

    /// Read storage from a genesis JSON file instead of a node
    #[arg(long, conflicts_with = "rpc_url")]
    pub genesis: Option<PathBuf>,

    /// Hub contract address (overrides the layout file)
    #[arg(long, env = "DESMO_HUB_ADDRESS")]
    pub hub_address: Option<Address>,

    /// JSON file overriding the hub's contract address and slot indices
    #[arg(long)]
    pub layout: Option<PathBuf>,

    #[command(subcommand)]
    pub query: HubQuery,
}

#[derive(Subcommand, Debug)]
pub enum HubQuery {
    /// Counters: subset size, TDD counter, storager length
    Summary,
    /// Every registered address
    Registered,
    /// TDD records for the given keys (addresses, 32-byte words or decimal integers)
    Tdd {
        #[arg(required = true, value_parser = parse_mapping_key)]
        keys: Vec<B256>,
    },
    /// Selected TDD lists for the given request ids
    Selected {
        #[arg(required = true, value_parser = parse_mapping_key)]
        keys: Vec<B256>,
    },
}

#[derive(Args, Debug)]
pub struct AllocArgs {
    /// JSON hub snapshot to lay out
    pub snapshot: PathBuf,

    /// Hub contract address (overrides the layout file)
    #[arg(long)]
    pub hub_address: Option<Address>,

    /// JSON file overriding the hub's contract address and slot indices
    #[arg(long)]
    pub layout: Option<PathBuf>,
}

/// Parse a mapping key into the 32 bytes the contract hashes.
///
/// `0x` + 40 hex digits is an address, `0x` + 64 hex digits a raw word, anything else a
/// decimal `uint256`.
pub fn parse_mapping_key(input: &str) -> Result<B256, String> {
    match input.strip_prefix("0x") {
        Some(digits) if digits.len() == 40 => {
            input.parse::<Address>().map(abi_key_address).map_err(|err| format!("{input}: {err}"))
        }
        Some(_) => input.parse::<B256>().map_err(|err| format!("{input}: {err}")),
        None => U256::from_str_radix(input, 10)
            .map(abi_key_u256)
            .map_err(|err| format!("{input}: {err}")),
    }
}

fn parse_source_reward(input: &str) -> Result<(u32, u8), String> {
    let (index, reward) =
        input.split_once(':').ok_or_else(|| format!("expected INDEX:REWARD, got {input}"))?;
    let index = index.parse().map_err(|_| format!("invalid source index in {input}"))?;
    let reward = reward.parse().map_err(|_| format!("invalid reward in {input}"))?;
    Ok((index, reward))
}
