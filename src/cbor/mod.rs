//! Minimal CBOR codec for COSE structures
//!
//! Only the data items COSE_Sign1 and COSE_Key actually use are accepted:
//! integers, byte/text strings, definite-length arrays and maps, booleans and null.
//! Tags, floats, undefined and indefinite-length items are rejected rather than
//! coerced, so every accepted input has exactly one [`CborValue`] reading.

pub mod decode;
pub mod encode;

pub use encode::{encode_array_header, encode_bytes, encode_int, encode_text};

use crate::error::{Error, Result};
use minicbor::Decoder;

/// A decoded CBOR data item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CborValue {
    /// Major type 0
    UnsignedInt(u64),
    /// Major type 1
    NegativeInt(i64),
    /// Major type 2
    ByteString(Vec<u8>),
    /// Major type 3
    TextString(String),
    /// Major type 4 (definite length)
    Array(Vec<CborValue>),
    /// Major type 5 (definite length), entries in wire order
    Map(Vec<(CborValue, CborValue)>),
    /// Simple values 20 / 21
    Bool(bool),
    /// Simple value 22
    Null,
}

impl CborValue {
    /// Borrow the contents of a byte string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CborValue::ByteString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Borrow the contents of a text string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CborValue::TextString(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the elements of an array
    pub fn as_array(&self) -> Option<&[CborValue]> {
        match self {
            CborValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries of a map
    pub fn as_map(&self) -> Option<&[(CborValue, CborValue)]> {
        match self {
            CborValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Integer value of either integer major type, if it fits in an `i64`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CborValue::UnsignedInt(n) => i64::try_from(*n).ok(),
            CborValue::NegativeInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a map value by integer key.
    ///
    /// Duplicate keys resolve to the last occurrence. Non-map values have no entries.
    pub fn get_int(&self, key: i64) -> Option<&CborValue> {
        self.as_map()?
            .iter()
            .rev()
            .find(|(k, _)| k.as_int() == Some(key))
            .map(|(_, v)| v)
    }

    /// Short name of the data item kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            CborValue::UnsignedInt(_) => "unsigned integer",
            CborValue::NegativeInt(_) => "negative integer",
            CborValue::ByteString(_) => "byte string",
            CborValue::TextString(_) => "text string",
            CborValue::Array(_) => "array",
            CborValue::Map(_) => "map",
            CborValue::Bool(_) => "bool",
            CborValue::Null => "null",
        }
    }

    /// Encode this value back to canonical CBOR
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        minicbor::to_vec(self).map_err(|e| Error::Other(format!("CBOR encode failed: {}", e)))
    }
}

/// Decode one data item from the front of `bytes`.
///
/// Returns the value and the number of bytes it occupied; anything after that is left
/// for the caller.
pub fn decode(bytes: &[u8]) -> Result<(CborValue, usize)> {
    if bytes.is_empty() {
        return Err(Error::MalformedCbor("empty input".to_string()));
    }

    let mut decoder = Decoder::new(bytes);
    let value = decoder.decode::<CborValue>()?;
    Ok((value, decoder.position()))
}

/// Decode a buffer that must contain exactly one data item
pub fn from_bytes(bytes: &[u8]) -> Result<CborValue> {
    let (value, consumed) = decode(bytes)?;
    if consumed != bytes.len() {
        return Err(Error::MalformedCbor(format!(
            "{} trailing bytes after top-level item",
            bytes.len() - consumed
        )));
    }
    Ok(value)
}
