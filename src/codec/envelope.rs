//! Legacy result envelope.
//!
//! Older callbacks carry the request id and per-source rewards in front of the result:
//!
//! ```text
//!   "20" | request id (64 hex) | count (2 hex) | reward (2 hex) * count | payload
//! ```
//!
//! Rewards are ordered by source index. New code sends the bare payload.

use super::errors::CodecError;
use super::{decode_query_result, encode_query_result, QueryResult};
use alloy_primitives::B256;

/// Byte length of the request id, as written in front of it.
const REQUEST_ID_SIZE: &str = "20";

/// Most sources a score table can list.
pub const MAX_SOURCES: usize = 16;

/// A result together with the request it answers and the rewards of its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope {
    pub request_id: B256,
    /// Rewards in ascending source-index order
    pub rewards: Vec<u8>,
    pub result: QueryResult,
}

impl ResultEnvelope {
    /// Build an envelope from `(source index, reward)` pairs in any order.
    pub fn new(
        request_id: B256,
        sources: impl IntoIterator<Item = (u32, u8)>,
        result: QueryResult,
    ) -> Result<Self, CodecError> {
        let mut sources: Vec<(u32, u8)> = sources.into_iter().collect();
        if sources.len() > MAX_SOURCES {
            return Err(CodecError::InvalidEnvelope(format!(
                "{} sources given (max. {MAX_SOURCES})",
                sources.len()
            )));
        }
        sources.sort_by_key(|(index, _)| *index);
        let rewards = sources.into_iter().map(|(_, reward)| reward).collect();
        Ok(Self { request_id, rewards, result })
    }

    /// Encode as lowercase hex without `0x`.
    pub fn encode(&self) -> String {
        let mut out =
            format!("{REQUEST_ID_SIZE}{}{:02x}", hex::encode(self.request_id), self.rewards.len());
        for reward in &self.rewards {
            out.push_str(&format!("{reward:02x}"));
        }
        out.push_str(&encode_query_result(&self.result));
        out
    }

    /// Decode an envelope, with or without `0x`.
    pub fn decode(encoded: &str) -> Result<Self, CodecError> {
        let encoded = encoded.strip_prefix("0x").unwrap_or(encoded);
        let invalid = |reason: &str| CodecError::InvalidEnvelope(format!("{reason} in {encoded}"));

        let rest =
            encoded.strip_prefix(REQUEST_ID_SIZE).ok_or_else(|| invalid("missing request id size"))?;
        let id_hex = rest.get(..64).ok_or_else(|| invalid("truncated request id"))?;
        let mut request_id = [0u8; 32];
        hex::decode_to_slice(id_hex, &mut request_id).map_err(|_| invalid("malformed request id"))?;

        let rest = &rest[64..];
        let count = rest
            .get(..2)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(|| invalid("malformed source count"))?;
        let count = usize::from(count);
        if count > MAX_SOURCES {
            return Err(invalid("too many sources"));
        }

        let table = rest.get(2..2 + count * 2).ok_or_else(|| invalid("truncated score table"))?;
        let rewards = hex::decode(table).map_err(|_| invalid("malformed score table"))?;
        let result = decode_query_result(&rest[2 + count * 2..])?;

        Ok(Self { request_id: B256::from(request_id), rewards, result })
    }
}

/// Decode the result carried by a callback: the last comma-separated segment.
pub fn decode_callback(callback: &str) -> Result<QueryResult, CodecError> {
    let payload = callback.rsplit(',').next().unwrap_or(callback);
    decode_query_result(payload.trim())
}
