//! CBOR decoding into [`CborValue`]

use super::CborValue;
use minicbor::Decoder;
use minicbor::data::Type;
use minicbor::decode::Error;

/// Nesting limit for arrays and maps; COSE structures are at most a few levels deep.
const MAX_DEPTH: usize = 16;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

impl<'b> minicbor::Decode<'b, ()> for CborValue {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut ()) -> Result<Self, Error> {
        decode_value(d, 0)
    }
}

fn decode_value(d: &mut Decoder<'_>, depth: usize) -> Result<CborValue, Error> {
    let initial = *d
        .input()
        .get(d.position())
        .ok_or_else(|| Error::message("unexpected end of input"))?;

    match initial >> 5 {
        MAJOR_UNSIGNED => Ok(CborValue::UnsignedInt(d.u64()?)),
        MAJOR_NEGATIVE => Ok(CborValue::NegativeInt(d.i64()?)),
        MAJOR_BYTES => Ok(CborValue::ByteString(d.bytes()?.to_vec())),
        MAJOR_TEXT => Ok(CborValue::TextString(d.str()?.to_string())),
        MAJOR_ARRAY => {
            let declared = d.array()?;
            let len = definite_len(d, declared, 1)?;
            let nested = enter(depth)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_value(d, nested)?);
            }
            Ok(CborValue::Array(items))
        }
        MAJOR_MAP => {
            let declared = d.map()?;
            let len = definite_len(d, declared, 2)?;
            let nested = enter(depth)?;
            let mut entries = Vec::with_capacity(len);
            for _ in 0..len {
                let key = decode_value(d, nested)?;
                let value = decode_value(d, nested)?;
                entries.push((key, value));
            }
            Ok(CborValue::Map(entries))
        }
        MAJOR_TAG => Err(Error::message("CBOR tags are not supported")),
        _ => match d.datatype()? {
            Type::Bool => Ok(CborValue::Bool(d.bool()?)),
            Type::Null => {
                d.null()?;
                Ok(CborValue::Null)
            }
            other => Err(Error::message(format!(
                "unsupported simple/float item: {:?}",
                other
            ))),
        },
    }
}

/// Validate a container length against what is left in the buffer.
///
/// Every element occupies at least one byte, so a count larger than the remaining input
/// is rejected before anything is allocated.
fn definite_len(d: &Decoder<'_>, len: Option<u64>, min_item_bytes: u64) -> Result<usize, Error> {
    let len = len.ok_or_else(|| Error::message("indefinite-length items are not supported"))?;
    let remaining = (d.input().len() - d.position()) as u64;
    if len.saturating_mul(min_item_bytes) > remaining {
        return Err(Error::message(format!(
            "declared length {} exceeds remaining {} bytes",
            len, remaining
        )));
    }
    Ok(len as usize)
}

fn enter(depth: usize) -> Result<usize, Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::message("CBOR nesting too deep"));
    }
    Ok(depth + 1)
}
