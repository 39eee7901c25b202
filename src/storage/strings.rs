use super::collections::contiguous_slots;
use super::errors::StorageError;
use super::helpers::decode_short_string;
use super::{SlotAddress, StorageReader, StorageWord};
use crate::constants::{MAX_LONG_STRING_BYTES, WORD_SIZE};
use alloy_primitives::{Address, U256};
use futures_util::future::try_join_all;
use tracing::{debug, warn};

/// Read a `string` variable, inline or long form.
///
/// The root word decides the form: the short decoder runs first and its
/// [`StorageError::NotShortString`] signal switches to [`read_long_string`].
pub async fn read_string<R: StorageReader + ?Sized>(
    reader: &R,
    account: Address,
    slot: SlotAddress,
) -> Result<String, StorageError> {
    let word = reader.read_storage(account, slot).await?;
    match decode_short_string(word) {
        Err(StorageError::NotShortString { word }) => {
            debug!(target: "desmo::storage", %slot, "string is stored in long form");
            read_long_string(reader, account, slot, word).await
        }
        decoded => decoded,
    }
}

/* Long string layout:
 *   [root]  -->  [keccak256(root)] [keccak256(root) + 1] ... [keccak256(root) + n - 1]
 *   len*2+1      (                    utf-8 payload, zero padded                     )
 */

/// Decode a long-form string whose root word `root_word` has already been read from `root`.
///
/// Issues exactly `ceil(len / 32)` further reads, concurrently, and trims the zero padding
/// of the last word.
pub async fn read_long_string<R: StorageReader + ?Sized>(
    reader: &R,
    account: Address,
    root: SlotAddress,
    root_word: StorageWord,
) -> Result<String, StorageError> {
    let encoded_length = U256::from_be_bytes(root_word.0) >> 1;
    let length = u64::try_from(encoded_length)
        .ok()
        .filter(|length| *length <= MAX_LONG_STRING_BYTES)
        .ok_or_else(|| {
            warn!(target: "desmo::storage", %root, %encoded_length, "implausible long string length");
            StorageError::CorruptStorageLayout(format!(
                "long string at slot {root} declares {encoded_length} bytes (max. {MAX_LONG_STRING_BYTES})"
            ))
        })?;

    let total_words = length.div_ceil(WORD_SIZE as u64);
    let slots = contiguous_slots(root.hashed(), total_words);
    let words = try_join_all(slots.iter().map(|slot| reader.read_storage(account, *slot))).await?;

    let mut bytes = Vec::with_capacity(words.len() * WORD_SIZE);
    for word in &words {
        bytes.extend_from_slice(word.as_slice());
    }
    while bytes.last() == Some(&0) {
        bytes.pop();
    }

    String::from_utf8(bytes).map_err(|err| {
        StorageError::CorruptStorageLayout(format!("long string at slot {root} is not UTF-8: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::image::{encode_u64, StorageImage};
    use crate::storage::test_utils::MockStorage;
    use alloy_primitives::B256;

    const ACCOUNT: Address = Address::new([0x02; 20]);

    async fn roundtrip(text: &str) -> (String, usize) {
        let root = SlotAddress::from_index(9);
        let mut image = StorageImage::new();
        image.set_string(root, text);
        let mut mock = MockStorage::new();
        mock.load(ACCOUNT, &image);
        let read = read_string(&mock, ACCOUNT, root).await.unwrap();
        (read, mock.reads())
    }

    #[tokio::test]
    async fn test_short_string_single_read() {
        let (read, reads) = roundtrip("tdd.example").await;
        assert_eq!(read, "tdd.example");
        assert_eq!(reads, 1);
    }

    #[tokio::test]
    async fn test_string_roundtrip_across_word_boundaries() {
        // (byte length, words read including the root)
        let cases = [(31, 1), (32, 2), (33, 3), (63, 3), (64, 3), (65, 4)];
        for (len, expected_reads) in cases {
            let text = "x".repeat(len);
            let (read, reads) = roundtrip(&text).await;
            assert_eq!(read, text, "roundtrip failed for {len} bytes");
            assert_eq!(reads, expected_reads, "unexpected read count for {len} bytes");
        }
    }

    #[tokio::test]
    async fn test_long_string_multibyte_across_words() {
        let text = "ü".repeat(40);
        let (read, _) = roundtrip(&text).await;
        assert_eq!(read, text);
    }

    #[tokio::test]
    async fn test_long_string_of_45_bytes_reads_two_words_and_trims() {
        let root = SlotAddress::from_index(4);
        let text = "https://desmo.example/things/0123456789abcdef"; // 45 bytes
        assert_eq!(text.len(), 45);

        let mut mock = MockStorage::new();
        mock.set(ACCOUNT, root, encode_u64(45 * 2 + 1));
        let base = root.hashed();
        let mut first = [0u8; 32];
        first.copy_from_slice(&text.as_bytes()[..32]);
        let mut second = [0u8; 32];
        second[..13].copy_from_slice(&text.as_bytes()[32..]);
        mock.set(ACCOUNT, base, B256::from(first));
        mock.set(ACCOUNT, base.offset(1), B256::from(second));

        let read = read_string(&mock, ACCOUNT, root).await.unwrap();
        assert_eq!(read, text);
        assert_eq!(mock.reads(), 3);
    }

    #[tokio::test]
    async fn test_long_string_implausible_length_is_corrupt() {
        let root = SlotAddress::from_index(4);
        let mut mock = MockStorage::new();
        let root_word = encode_u64(((MAX_LONG_STRING_BYTES + 1) * 2) + 1);
        mock.set(ACCOUNT, root, root_word);

        let err = read_string(&mock, ACCOUNT, root).await.unwrap_err();
        assert!(matches!(err, StorageError::CorruptStorageLayout(_)));
        // only the root was touched
        assert_eq!(mock.reads(), 1);
    }

    #[tokio::test]
    async fn test_long_string_transport_failure_propagates() {
        let root = SlotAddress::from_index(4);
        let mut mock = MockStorage::new();
        mock.set(ACCOUNT, root, encode_u64(40 * 2 + 1));
        mock.fail_on(root.hashed().offset(1));

        let err = read_string(&mock, ACCOUNT, root).await.unwrap_err();
        assert!(matches!(err, StorageError::Transport { slot, .. } if slot == root.hashed().offset(1)));
    }
}
