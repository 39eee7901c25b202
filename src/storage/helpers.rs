use super::errors::StorageError;
use super::StorageWord;
use crate::constants::{ADDRESS_LENGTH, WORD_SIZE};
use alloy_primitives::{Address, B256, U256};

/// Decode a bool: true iff the word is nonzero.
pub fn decode_bool(word: StorageWord) -> bool {
    !word.is_zero()
}

/// Decode a u64 from a storage word.
///
/// Values above `u64::MAX` are reported, never truncated.
pub fn decode_u64(word: StorageWord) -> Result<u64, StorageError> {
    u64::try_from(U256::from_be_bytes(word.0)).map_err(|_| StorageError::IntegerOverflow { word })
}

/// Decode an address from a storage word (low 20 bytes).
pub fn decode_address(word: StorageWord) -> Address {
    Address::from_slice(&word[WORD_SIZE - ADDRESS_LENGTH..])
}

/// The raw word as `0x`-prefixed lowercase hex.
pub fn decode_hex(word: StorageWord) -> String {
    format!("0x{}", hex::encode(word))
}

/// Decode a short-form string stored inline in one word.
///
/// Layout: payload left-aligned, low-order byte = `length * 2` with `length < 32`.
/// A set low bit marks the long form, reported as [`StorageError::NotShortString`] so the
/// caller can switch to [`read_long_string`](super::strings::read_long_string).
pub fn decode_short_string(word: StorageWord) -> Result<String, StorageError> {
    let flag = word[WORD_SIZE - 1];
    if flag & 1 == 1 {
        return Err(StorageError::NotShortString { word });
    }

    let length = usize::from(flag >> 1);
    if length >= WORD_SIZE {
        return Err(StorageError::CorruptStorageLayout(format!(
            "short string in word {word} declares {length} bytes (max. 31)"
        )));
    }

    std::str::from_utf8(&word[..length]).map(str::to_owned).map_err(|err| {
        StorageError::CorruptStorageLayout(format!("short string in word {word} is not UTF-8: {err}"))
    })
}

/// Location of a struct member packed into a shared word.
///
/// `offset` counts bytes from the low-order end, as the compiler's storage layout reports it:
/// an address at offset 0 takes the low 20 bytes, a bool at offset 20 the byte above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedField {
    /// Byte offset from the low-order end of the word
    pub offset: usize,
    /// Width in bytes
    pub width: usize,
}

impl PackedField {
    /// Describe a field of `width` bytes at `offset`.
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.width == 0 || self.offset + self.width > WORD_SIZE {
            return Err(StorageError::CorruptStorageLayout(format!(
                "field of {} bytes at offset {} does not fit in a 32-byte slot",
                self.width, self.offset
            )));
        }
        Ok(())
    }

    fn mask(&self) -> U256 {
        if self.width == WORD_SIZE {
            U256::MAX
        } else {
            (U256::from(1) << (self.width * 8)) - U256::from(1)
        }
    }

    /// Extract the field from `word`, right-aligned.
    pub fn extract(&self, word: StorageWord) -> Result<U256, StorageError> {
        self.check()?;
        Ok((U256::from_be_bytes(word.0) >> (self.offset * 8)) & self.mask())
    }

    /// Write `value` into the field's bytes of `word`, leaving the other bytes untouched.
    pub fn insert(&self, word: StorageWord, value: U256) -> Result<StorageWord, StorageError> {
        self.check()?;
        let mask = self.mask();
        if value > mask {
            return Err(StorageError::CorruptStorageLayout(format!(
                "value {value} does not fit in a {}-byte field",
                self.width
            )));
        }
        let shift = self.offset * 8;
        let cleared = U256::from_be_bytes(word.0) & !(mask << shift);
        Ok(B256::from((cleared | (value << shift)).to_be_bytes()))
    }
}
