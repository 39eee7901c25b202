use alloy_primitives::{address, Address};

/// Width of a storage word and of a slot key (32 bytes)
pub const WORD_SIZE: usize = 32;
/// Ethereum address length (20 bytes)
pub const ADDRESS_LENGTH: usize = 20;
/// Longest long-form string the reader will follow (1 MiB).
/// Anything larger is treated as a corrupt root word instead of an unbounded read.
pub const MAX_LONG_STRING_BYTES: u64 = 1 << 20;
/// Longest dynamic array the reader will expand into element slots
pub const MAX_ARRAY_ELEMENTS: u64 = 1 << 20;
/// Default Desmo LD hub deployment
pub const DEFAULT_HUB_ADDRESS: Address = address!("0x7f1402c8b7220d4439335ace702472cc65e7ddf1");
