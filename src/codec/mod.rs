//! Compact query-result codec.
//!
//! A result travels as a short hex string:
//!
//! ```text
//!   [0x] padding tag body
//!
//!   padding   "1" when tag+body has odd length, "00" when even
//!   tag       0 positive integer   1 positive decimal
//!             2 negative integer   3 negative decimal
//!             4 text
//!   body      integer  magnitude in hex
//!             decimal  digits(precision) | precision | scaled magnitude
//!             text     UTF-16 code units, 4 hex digits each
//! ```
//!
//! Output is lowercase without `0x`; input accepts either case and an optional prefix.

pub mod envelope;
pub mod errors;

pub use envelope::{decode_callback, ResultEnvelope};
pub use errors::CodecError;

use std::fmt;

/// Type tag of an encoded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultType {
    PositiveInteger = 0,
    PositiveDecimal = 1,
    NegativeInteger = 2,
    NegativeDecimal = 3,
    Text = 4,
}

impl ResultType {
    /// Map a decoded tag digit to its type.
    pub fn from_tag(tag: u8) -> Result<Self, CodecError> {
        match tag {
            0 => Ok(Self::PositiveInteger),
            1 => Ok(Self::PositiveDecimal),
            2 => Ok(Self::NegativeInteger),
            3 => Ok(Self::NegativeDecimal),
            4 => Ok(Self::Text),
            other => Err(CodecError::UnknownResultType(other)),
        }
    }

    /// The tag digit.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A typed query result.
///
/// Decimals are `mantissa / 10^precision`, kept exact; the sign lives in the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    PositiveInteger(u64),
    NegativeInteger(u64),
    PositiveDecimal { mantissa: u64, precision: u8 },
    NegativeDecimal { mantissa: u64, precision: u8 },
    Text(String),
}

impl QueryResult {
    /// Wrap a signed integer, picking the variant from its sign.
    pub fn integer(value: i64) -> Self {
        if value < 0 {
            Self::NegativeInteger(value.unsigned_abs())
        } else {
            Self::PositiveInteger(value.unsigned_abs())
        }
    }

    /// The tag this value is encoded with.
    pub fn result_type(&self) -> ResultType {
        match self {
            Self::PositiveInteger(_) => ResultType::PositiveInteger,
            Self::NegativeInteger(_) => ResultType::NegativeInteger,
            Self::PositiveDecimal { .. } => ResultType::PositiveDecimal,
            Self::NegativeDecimal { .. } => ResultType::NegativeDecimal,
            Self::Text(_) => ResultType::Text,
        }
    }

    /// Numeric value as a float; `None` for text.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::PositiveInteger(v) => Some(*v as f64),
            Self::NegativeInteger(v) => Some(-(*v as f64)),
            Self::PositiveDecimal { mantissa, precision } => {
                Some(*mantissa as f64 / 10f64.powi(i32::from(*precision)))
            }
            Self::NegativeDecimal { mantissa, precision } => {
                Some(-(*mantissa as f64) / 10f64.powi(i32::from(*precision)))
            }
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositiveInteger(v) => write!(f, "{v}"),
            Self::NegativeInteger(v) => write!(f, "-{v}"),
            Self::PositiveDecimal { mantissa, precision } => {
                f.write_str(&format_scaled(*mantissa, *precision))
            }
            Self::NegativeDecimal { mantissa, precision } => {
                write!(f, "-{}", format_scaled(*mantissa, *precision))
            }
            Self::Text(text) => f.write_str(text),
        }
    }
}

fn format_scaled(mantissa: u64, precision: u8) -> String {
    let digits = mantissa.to_string();
    let precision = usize::from(precision);
    if precision == 0 {
        return digits;
    }
    if digits.len() <= precision {
        return format!("0.{}{digits}", "0".repeat(precision - digits.len()));
    }
    let (int, frac) = digits.split_at(digits.len() - precision);
    format!("{int}.{frac}")
}

/// Parse a decimal literal such as `-57.00364` into an exact decimal result.
///
/// The precision is the number of fractional digits written, so `1.50` keeps precision 2.
pub fn parse_decimal(literal: &str) -> Result<QueryResult, CodecError> {
    let invalid = || CodecError::InvalidDecimal(literal.to_string());
    let trimmed = literal.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(invalid());
    }

    let precision =
        u8::try_from(frac.len()).map_err(|_| CodecError::PrecisionTooLarge(frac.len() as u64))?;
    let mantissa: u64 = format!("{int}{frac}").parse().map_err(|_| invalid())?;
    Ok(if negative {
        QueryResult::NegativeDecimal { mantissa, precision }
    } else {
        QueryResult::PositiveDecimal { mantissa, precision }
    })
}

/// Prefix `body` with its padding indicator.
pub fn compute_padding(body: &str) -> String {
    if body.len() % 2 == 1 {
        format!("1{body}")
    } else {
        format!("00{body}")
    }
}

/// Encode a result into the compact wire form.
pub fn encode_query_result(value: &QueryResult) -> String {
    let tag = value.result_type().tag();
    let body = match value {
        QueryResult::PositiveInteger(v) | QueryResult::NegativeInteger(v) => format!("{v:x}"),
        QueryResult::PositiveDecimal { mantissa, precision }
        | QueryResult::NegativeDecimal { mantissa, precision } => {
            let precision_hex = format!("{precision:x}");
            format!("{:x}{precision_hex}{mantissa:x}", precision_hex.len())
        }
        QueryResult::Text(text) => text.encode_utf16().map(|unit| format!("{unit:04x}")).collect(),
    };
    compute_padding(&format!("{tag:x}{body}"))
}

/// Decode a result from its wire form.
pub fn decode_query_result(payload: &str) -> Result<QueryResult, CodecError> {
    let payload = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("0X"))
        .unwrap_or(payload);
    let padding = if payload.starts_with('1') { 1 } else { 2 };

    let (tag_at, tag_char) = payload
        .char_indices()
        .nth(padding)
        .ok_or_else(|| CodecError::InvalidTypeEncoding(String::new()))?;
    let tag = tag_char
        .to_digit(16)
        .ok_or_else(|| CodecError::InvalidTypeEncoding(tag_char.to_string()))?;

    let body = &payload[tag_at + tag_char.len_utf8()..];
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidValueEncoding(body.to_string()));
    }

    match ResultType::from_tag(tag as u8)? {
        ResultType::PositiveInteger => decode_magnitude(body).map(QueryResult::PositiveInteger),
        ResultType::NegativeInteger => decode_magnitude(body).map(QueryResult::NegativeInteger),
        ResultType::PositiveDecimal => {
            let (mantissa, precision) = decode_decimal(body)?;
            Ok(QueryResult::PositiveDecimal { mantissa, precision })
        }
        ResultType::NegativeDecimal => {
            let (mantissa, precision) = decode_decimal(body)?;
            Ok(QueryResult::NegativeDecimal { mantissa, precision })
        }
        ResultType::Text => decode_text(body).map(QueryResult::Text),
    }
}

// `body` is already known to be ASCII hex digits below.

fn decode_magnitude(body: &str) -> Result<u64, CodecError> {
    if body.is_empty() {
        return Err(CodecError::InvalidValueEncoding(String::new()));
    }
    u64::from_str_radix(body, 16).map_err(|_| CodecError::InvalidValueEncoding(body.to_string()))
}

fn decode_decimal(body: &str) -> Result<(u64, u8), CodecError> {
    let invalid = || CodecError::InvalidValueEncoding(body.to_string());
    let size = body
        .get(..1)
        .and_then(|digit| usize::from_str_radix(digit, 16).ok())
        .ok_or_else(invalid)?;
    if size == 0 || body.len() <= 1 + size {
        return Err(invalid());
    }

    let precision = u64::from_str_radix(&body[1..1 + size], 16).map_err(|_| invalid())?;
    let precision = u8::try_from(precision).map_err(|_| CodecError::PrecisionTooLarge(precision))?;
    let mantissa = decode_magnitude(&body[1 + size..])?;
    Ok((mantissa, precision))
}

fn decode_text(body: &str) -> Result<String, CodecError> {
    let invalid = || CodecError::InvalidValueEncoding(body.to_string());
    if body.len() % 4 != 0 {
        return Err(invalid());
    }
    let units = body
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            std::str::from_utf8(chunk)
                .ok()
                .and_then(|digits| u16::from_str_radix(digits, 16).ok())
                .ok_or_else(invalid)
        })
        .collect::<Result<Vec<u16>, _>>()?;
    char::decode_utf16(units).collect::<Result<String, _>>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOREM: &str = "0x14004c006f00720065006d00200069007000730075006d00200064006f006c006f0072002000730069007400200061006d00650074";

    // =========================================================================
    // Known payloads
    // =========================================================================

    #[test]
    fn test_decode_positive_integer() {
        let value = decode_query_result("0x00025110f013").unwrap();
        assert_eq!(value, QueryResult::PositiveInteger(9_949_999_123));
        assert_eq!(value.result_type(), ResultType::PositiveInteger);
    }

    #[test]
    fn test_decode_negative_integer() {
        let value = decode_query_result("0x12d431").unwrap();
        assert_eq!(value, QueryResult::NegativeInteger(54_321));
        assert_eq!(value.to_string(), "-54321");
    }

    #[test]
    fn test_decode_positive_decimal() {
        let value = decode_query_result("0x11153039").unwrap();
        assert_eq!(value, QueryResult::PositiveDecimal { mantissa: 12_345, precision: 5 });
        assert_eq!(value.to_f64(), Some(0.12345));
        assert_eq!(value.to_string(), "0.12345");
    }

    #[test]
    fn test_decode_negative_decimal() {
        let value = decode_query_result("0x131556fb0c").unwrap();
        assert_eq!(value, QueryResult::NegativeDecimal { mantissa: 5_700_364, precision: 5 });
        assert_eq!(value.to_f64(), Some(-57.00364));
        assert_eq!(value.to_string(), "-57.00364");
    }

    #[test]
    fn test_decode_text() {
        let value = decode_query_result(LOREM).unwrap();
        assert_eq!(value, QueryResult::Text("Lorem ipsum dolor sit amet".to_string()));
        assert_eq!(value.to_f64(), None);
    }

    #[test]
    fn test_encode_matches_known_payloads() {
        assert_eq!(encode_query_result(&QueryResult::PositiveInteger(9_949_999_123)), "00025110f013");
        assert_eq!(encode_query_result(&QueryResult::integer(-54_321)), "12d431");
        assert_eq!(
            encode_query_result(&QueryResult::PositiveDecimal { mantissa: 12_345, precision: 5 }),
            "11153039"
        );
        assert_eq!(encode_query_result(&parse_decimal("-57.00364").unwrap()), "131556fb0c");
        assert_eq!(
            format!("0x{}", encode_query_result(&QueryResult::Text("Lorem ipsum dolor sit amet".into()))),
            LOREM
        );
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = decode_query_result("0x1f00000000").unwrap_err();
        assert_eq!(err, CodecError::UnknownResultType(15));
        assert_eq!(err.to_string(), "Unknown query result type: 15.");
        for tag in 5..=9 {
            let payload = format!("0x1{tag}00000000");
            assert_eq!(decode_query_result(&payload), Err(CodecError::UnknownResultType(tag)));
        }
    }

    #[test]
    fn test_invalid_type_encoding() {
        let err = decode_query_result("0x1X000000").unwrap_err();
        assert_eq!(err.to_string(), "Result type encoding is not a valid hex string (X).");
        assert_eq!(decode_query_result("00"), Err(CodecError::InvalidTypeEncoding(String::new())));
        assert_eq!(decode_query_result(""), Err(CodecError::InvalidTypeEncoding(String::new())));
    }

    #[test]
    fn test_invalid_value_encoding() {
        let err = decode_query_result("0x11a5L.7/+21R").unwrap_err();
        assert_eq!(err.to_string(), "Result value encoding is not a valid hex string (a5L.7/+21R).");
    }

    #[test]
    fn test_empty_numeric_body_is_rejected() {
        assert!(matches!(decode_query_result("10"), Err(CodecError::InvalidValueEncoding(_))));
        assert!(matches!(decode_query_result("0032"), Err(CodecError::InvalidValueEncoding(_))));
    }

    #[test]
    fn test_integer_overflow_is_rejected() {
        // 17 hex digits
        let payload = compute_padding(&format!("0{}", "f".repeat(17)));
        assert!(matches!(decode_query_result(&payload), Err(CodecError::InvalidValueEncoding(_))));
    }

    #[test]
    fn test_decimal_precision_out_of_range() {
        // three precision digits: 0x100 = 256
        assert_eq!(decode_query_result(&compute_padding("131001")), Err(CodecError::PrecisionTooLarge(256)));
        // zero precision digits
        assert!(matches!(decode_query_result(&compute_padding("1001")), Err(CodecError::InvalidValueEncoding(_))));
    }

    #[test]
    fn test_text_body_must_be_whole_units() {
        assert!(matches!(decode_query_result("14004c00"), Err(CodecError::InvalidValueEncoding(_))));
        // lone high surrogate
        assert!(matches!(decode_query_result("14d83d"), Err(CodecError::InvalidValueEncoding(_))));
    }

    // =========================================================================
    // Round trips and formatting
    // =========================================================================

    #[test]
    fn test_round_trip_representative_values() {
        let values = [
            QueryResult::PositiveInteger(0),
            QueryResult::PositiveInteger(u64::MAX),
            QueryResult::NegativeInteger(1),
            QueryResult::PositiveDecimal { mantissa: 0, precision: 0 },
            QueryResult::NegativeDecimal { mantissa: 42, precision: 200 },
            QueryResult::Text(String::new()),
            QueryResult::Text("temperature 21.5°C 🌡".to_string()),
        ];
        for value in values {
            let encoded = encode_query_result(&value);
            assert_eq!(decode_query_result(&encoded).unwrap(), value, "payload {encoded}");
        }
    }

    #[test]
    fn test_padding_keeps_payload_even() {
        assert_eq!(compute_padding("abc"), "1abc");
        assert_eq!(compute_padding("ab"), "00ab");
        for value in [QueryResult::integer(7), QueryResult::integer(300), QueryResult::Text("é".into())] {
            assert_eq!(encode_query_result(&value).len() % 2, 0);
        }
    }

    #[test]
    fn test_decode_accepts_uppercase_and_prefix() {
        assert_eq!(decode_query_result("0X12D431").unwrap(), QueryResult::NegativeInteger(54_321));
        assert_eq!(decode_query_result("12D431").unwrap(), QueryResult::NegativeInteger(54_321));
    }

    #[test]
    fn test_text_uses_surrogate_pairs() {
        let encoded = encode_query_result(&QueryResult::Text("🌡".into()));
        assert_eq!(encoded, "14d83cdf21");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0.12345").unwrap(), QueryResult::PositiveDecimal { mantissa: 12_345, precision: 5 });
        assert_eq!(parse_decimal("+1.50").unwrap(), QueryResult::PositiveDecimal { mantissa: 150, precision: 2 });
        assert_eq!(parse_decimal("-3").unwrap(), QueryResult::NegativeDecimal { mantissa: 3, precision: 0 });
        assert_eq!(parse_decimal(".5").unwrap(), QueryResult::PositiveDecimal { mantissa: 5, precision: 1 });
        for bad in ["", "-", ".", "1.2.3", "1e5", "abc", "99999999999999999999"] {
            assert!(matches!(parse_decimal(bad), Err(CodecError::InvalidDecimal(_))), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_display_pads_small_decimals() {
        assert_eq!(QueryResult::PositiveDecimal { mantissa: 5, precision: 3 }.to_string(), "0.005");
        assert_eq!(QueryResult::PositiveDecimal { mantissa: 1500, precision: 2 }.to_string(), "15.00");
        assert_eq!(QueryResult::NegativeDecimal { mantissa: 7, precision: 0 }.to_string(), "-7");
    }

    #[test]
    fn test_result_type_tags() {
        for tag in 0..=4 {
            assert_eq!(ResultType::from_tag(tag).unwrap().tag(), tag);
        }
        assert_eq!(ResultType::from_tag(5), Err(CodecError::UnknownResultType(5)));
    }
}
