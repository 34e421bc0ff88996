use crate::cbor::{self, CborValue};
use crate::crypto::PUBLIC_KEY_LENGTH;
use crate::error::{Error, Result};
use std::fmt;

/// COSE_Key map labels (RFC 9052 §7.1, RFC 9053 §7.2)
pub mod labels {
    /// Key type
    pub const KTY: i64 = 1;
    /// Algorithm
    pub const ALG: i64 = 3;
    /// OKP curve
    pub const CRV: i64 = -1;
    /// OKP public key
    pub const X: i64 = -2;
}

/// An Ed25519 public key, always exactly 32 bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Wrap raw key bytes. Any length other than 32 is an error; keys are never
    /// truncated or padded.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; PUBLIC_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| Error::InvalidPublicKeyLength {
                    actual: bytes.len(),
                    expected: PUBLIC_KEY_LENGTH,
                })?;
        Ok(Self(key))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; PUBLIC_KEY_LENGTH]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Pull the Ed25519 public key out of a CBOR-encoded COSE_Key (label `-2`).
///
/// The key type and curve labels are not checked; wallets emit OKP/Ed25519 keys and the
/// subsequent signature check rejects anything else.
pub fn extract_public_key(cose_key: &[u8]) -> Result<PublicKey> {
    let value = cbor::from_bytes(cose_key)?;

    if value.as_map().is_none() {
        return Err(Error::MalformedCoseKey(format!(
            "expected a map, found a {}",
            value.kind()
        )));
    }

    match value.get_int(labels::X) {
        Some(CborValue::ByteString(bytes)) => PublicKey::from_slice(bytes),
        Some(other) => Err(Error::MalformedCoseKey(format!(
            "label -2 must be a byte string, found a {}",
            other.kind()
        ))),
        None => Err(Error::MalformedCoseKey(
            "missing public key (label -2)".to_string(),
        )),
    }
}
