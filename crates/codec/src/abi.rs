//! Calldata encoding and return-value decoding.

use crate::{method::MethodHashes, CodecError, Method};
use alloy_primitives::{hex, B256, U256};

const WORD: usize = 32;

/// A fixed-width call parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// 32-byte account or contract key
    Address(B256),
    Uint(U256),
}

impl Param {
    fn word_hex(&self) -> String {
        match self {
            Self::Address(key) => hex::encode(key),
            Self::Uint(value) => hex::encode(value.to_be_bytes::<WORD>()),
        }
    }
}

/// Build `0x`-prefixed calldata: the method selector followed by each
/// parameter left-padded to one 32-byte word.
pub fn encode_function_call(
    method: Method,
    params: &[Param],
    hashes: &MethodHashes,
) -> Result<String, CodecError> {
    let selector = hashes.selector(method)?;

    let mut data = String::with_capacity(2 + selector.len() + params.len() * WORD * 2);
    data.push_str("0x");
    data.push_str(selector);
    for param in params {
        data.push_str(&param.word_hex());
    }

    Ok(data)
}

/// A decoded return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    String(String),
    Uint8(u8),
    Uint256(U256),
    Bool(bool),
    /// Undecoded hex (without `0x`) for return types the codec does not know
    Raw(String),
}

impl DecodedValue {
    const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Uint8(_) => "uint8",
            Self::Uint256(_) => "uint256",
            Self::Bool(_) => "bool",
            Self::Raw(_) => "raw",
        }
    }

    pub fn into_string(self) -> Result<String, CodecError> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(unexpected("string", &other)),
        }
    }

    pub fn into_u8(self) -> Result<u8, CodecError> {
        match self {
            Self::Uint8(v) => Ok(v),
            other => Err(unexpected("uint8", &other)),
        }
    }

    pub fn into_u256(self) -> Result<U256, CodecError> {
        match self {
            Self::Uint256(v) => Ok(v),
            other => Err(unexpected("uint256", &other)),
        }
    }

    pub fn into_bool(self) -> Result<bool, CodecError> {
        match self {
            Self::Bool(v) => Ok(v),
            other => Err(unexpected("bool", &other)),
        }
    }
}

fn unexpected(expected: &'static str, actual: &DecodedValue) -> CodecError {
    CodecError::UnexpectedType {
        expected,
        actual: actual.kind(),
    }
}

/// Decode raw call output according to a declared return type.
///
/// Known types are `string`, `uint8`, `uint256` and `bool`. Anything else
/// is returned as raw hex. Empty output decodes to the type's zero value.
pub fn decode_return_value(hex_value: &str, return_type: &str) -> Result<DecodedValue, CodecError> {
    let digits = hex_value.strip_prefix("0x").unwrap_or(hex_value);

    if digits.is_empty() {
        return Ok(match return_type {
            "string" => DecodedValue::String(String::new()),
            "uint8" => DecodedValue::Uint8(0),
            "uint256" => DecodedValue::Uint256(U256::ZERO),
            "bool" => DecodedValue::Bool(false),
            _ => DecodedValue::Raw(String::new()),
        });
    }

    let decode = || hex::decode(digits).map_err(|e| CodecError::InvalidHex(e.to_string()));

    match return_type {
        "string" => decode_string(&decode()?).map(DecodedValue::String),
        "uint8" => small_uint(&decode()?, u8::MAX).map(DecodedValue::Uint8),
        "uint256" => decode_uint(&decode()?).map(DecodedValue::Uint256),
        "bool" => small_uint(&decode()?, 1).map(|v| DecodedValue::Bool(v == 1)),
        _ => Ok(DecodedValue::Raw(digits.to_string())),
    }
}

/// Human-readable reason from a revert payload (`Error(string)`,
/// `Panic(uint256)` or bare UTF-8).
pub fn revert_reason(data: &str) -> Option<String> {
    let bytes = hex::decode(data).ok()?;
    alloy_sol_types::decode_revert_reason(&bytes)
}

fn decode_uint(bytes: &[u8]) -> Result<U256, CodecError> {
    if bytes.len() > WORD {
        return Err(CodecError::InvalidEncoding(format!(
            "expected one word, got {} bytes",
            bytes.len()
        )));
    }
    Ok(U256::from_be_slice(bytes))
}

/// Decode a word that must fit in a byte and not exceed `max`.
fn small_uint(bytes: &[u8], max: u8) -> Result<u8, CodecError> {
    decode_uint(bytes)?;
    let (high, low) = bytes.split_at(bytes.len() - 1);

    if high.iter().any(|b| *b != 0) || low[0] > max {
        return Err(CodecError::InvalidEncoding(format!(
            "value 0x{} out of range",
            hex::encode(bytes)
        )));
    }
    Ok(low[0])
}

/// Decode a single ABI-encoded dynamic string: offset word, length word, data.
fn decode_string(bytes: &[u8]) -> Result<String, CodecError> {
    let offset = word_at(bytes, 0)?;
    let length = word_at(bytes, offset)?;
    let start = offset + WORD;

    let data = start
        .checked_add(length)
        .and_then(|end| bytes.get(start..end))
        .ok_or_else(|| {
            CodecError::InvalidEncoding(format!(
                "string of {length} bytes at {start} exceeds {} bytes of output",
                bytes.len()
            ))
        })?;

    String::from_utf8(data.to_vec()).map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}

/// Read the word at byte `position` as an offset or length.
fn word_at(bytes: &[u8], position: usize) -> Result<usize, CodecError> {
    let word = position
        .checked_add(WORD)
        .and_then(|end| bytes.get(position..end))
        .ok_or_else(|| CodecError::InvalidEncoding(format!("no word at byte {position}")))?;

    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(CodecError::InvalidEncoding(format!(
            "word at byte {position} is too large"
        )));
    }

    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf))
        .map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}
