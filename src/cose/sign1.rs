use crate::cbor::{self, CborValue};
use crate::crypto::SIGNATURE_LENGTH;
use crate::error::{Error, Result};

/// Context string of the Sig_structure for single-signer messages
pub const SIG_STRUCTURE_CONTEXT_SIGNATURE1: &str = "Signature1";

/// A decoded COSE_Sign1 envelope
///
/// The protected header is kept as the serialized map bytes it arrived as, because the
/// signature covers exactly those bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseSign1 {
    protected: Vec<u8>,
    unprotected: CborValue,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

impl CoseSign1 {
    /// Assemble an envelope from its parts
    pub fn new(
        protected: Vec<u8>,
        unprotected: CborValue,
        payload: Vec<u8>,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            protected,
            unprotected,
            payload,
            signature,
        }
    }

    /// Decode from CBOR bytes
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        parse_cose_sign1(bytes)
    }

    /// Encode back to a CBOR array
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        CborValue::Array(vec![
            CborValue::ByteString(self.protected.clone()),
            self.unprotected.clone(),
            CborValue::ByteString(self.payload.clone()),
            CborValue::ByteString(self.signature.clone()),
        ])
        .to_bytes()
    }

    /// Serialized protected header map
    pub fn protected(&self) -> &[u8] {
        &self.protected
    }

    /// Unprotected header, as decoded
    pub fn unprotected(&self) -> &CborValue {
        &self.unprotected
    }

    /// Signed payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Raw signature bytes, any length
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Signature as a fixed-size Ed25519 signature
    pub fn ed25519_signature(&self) -> Result<&[u8; SIGNATURE_LENGTH]> {
        self.signature
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidSignatureLength {
                actual: self.signature.len(),
                expected: SIGNATURE_LENGTH,
            })
    }

    /// The Sig_structure bytes this envelope's signature was computed over
    pub fn sig_structure(&self) -> Result<Vec<u8>> {
        create_sig_structure(&self.protected, &self.payload)
    }
}

/// Decode a COSE_Sign1 envelope: `[protected: bstr, unprotected, payload: bstr, signature: bstr]`.
///
/// The untagged form is the only one accepted. The unprotected header is passed through
/// without inspection.
pub fn parse_cose_sign1(bytes: &[u8]) -> Result<CoseSign1> {
    let value = cbor::from_bytes(bytes)?;

    let items = match value {
        CborValue::Array(items) => items,
        other => {
            return Err(Error::MalformedCose(format!(
                "top-level item is a {}, expected a 4-element array",
                other.kind()
            )));
        }
    };

    let [protected, unprotected, payload, signature]: [CborValue; 4] =
        items.try_into().map_err(|items: Vec<CborValue>| {
            Error::MalformedCose(format!(
                "array length was {}, expected 4",
                items.len()
            ))
        })?;

    Ok(CoseSign1 {
        protected: byte_string(protected, "protected header")?,
        unprotected,
        payload: byte_string(payload, "payload")?,
        signature: byte_string(signature, "signature")?,
    })
}

fn byte_string(value: CborValue, field: &str) -> Result<Vec<u8>> {
    match value {
        CborValue::ByteString(bytes) => Ok(bytes),
        other => Err(Error::MalformedCose(format!(
            "{field} must be a byte string, found {}",
            other.kind()
        ))),
    }
}

/// Build the RFC 9052 Sig_structure for a COSE_Sign1 message with empty external AAD:
/// `["Signature1", protected, h'', payload]`.
pub fn create_sig_structure(protected: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(16 + protected.len() + payload.len());
    cbor::encode_array_header(&mut out, 4)?;
    cbor::encode_text(&mut out, SIG_STRUCTURE_CONTEXT_SIGNATURE1)?;
    cbor::encode_bytes(&mut out, protected)?;
    cbor::encode_bytes(&mut out, &[])?;
    cbor::encode_bytes(&mut out, payload)?;
    Ok(out)
}
