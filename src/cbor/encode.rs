//! CBOR encoding helpers
//!
//! minicbor always picks the shortest length prefix, which is the canonical form the
//! Sig_structure needs: 0-23 inline, then 1, 2, 4 or 8 extra big-endian bytes.

use super::CborValue;
use crate::error::{Error, Result};
use minicbor::Encoder;
use minicbor::encode::Write;
use std::convert::Infallible;

impl minicbor::Encode<()> for CborValue {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        ctx: &mut (),
    ) -> std::result::Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            CborValue::UnsignedInt(n) => {
                e.u64(*n)?;
            }
            CborValue::NegativeInt(n) => {
                e.i64(*n)?;
            }
            CborValue::ByteString(bytes) => {
                e.bytes(bytes)?;
            }
            CborValue::TextString(text) => {
                e.str(text)?;
            }
            CborValue::Array(items) => {
                e.array(items.len() as u64)?;
                for item in items {
                    item.encode(e, ctx)?;
                }
            }
            CborValue::Map(entries) => {
                e.map(entries.len() as u64)?;
                for (key, value) in entries {
                    key.encode(e, ctx)?;
                    value.encode(e, ctx)?;
                }
            }
            CborValue::Bool(b) => {
                e.bool(*b)?;
            }
            CborValue::Null => {
                e.null()?;
            }
        }
        Ok(())
    }
}

fn encode_failed(e: minicbor::encode::Error<Infallible>) -> Error {
    Error::Other(format!("CBOR encode failed: {}", e))
}

/// Append a signed integer (major type 0 or 1)
pub fn encode_int(out: &mut Vec<u8>, value: i64) -> Result<()> {
    Encoder::new(out).i64(value).map_err(encode_failed)?;
    Ok(())
}

/// Append a byte string (major type 2)
pub fn encode_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    Encoder::new(out).bytes(bytes).map_err(encode_failed)?;
    Ok(())
}

/// Append a text string (major type 3)
pub fn encode_text(out: &mut Vec<u8>, text: &str) -> Result<()> {
    Encoder::new(out).str(text).map_err(encode_failed)?;
    Ok(())
}

/// Append the header of a definite-length array (major type 4)
pub fn encode_array_header(out: &mut Vec<u8>, len: u64) -> Result<()> {
    Encoder::new(out).array(len).map_err(encode_failed)?;
    Ok(())
}
