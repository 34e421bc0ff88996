//! Error types for CIP-8 verification

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for verification operations
///
/// Every variant describes malformed input or an environment failure. A wallet that
/// signed the wrong challenge, or a signature that simply does not verify, is reported
/// through [`crate::VerificationOutcome`] booleans and never through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// Input was not valid hexadecimal
    #[error("Malformed hex: {0}")]
    MalformedHex(String),

    /// Structural CBOR violation (truncated item, unsupported major type, bad UTF-8)
    #[error("Malformed CBOR: {0}")]
    MalformedCbor(String),

    /// CBOR decoded but did not have the COSE_Sign1 shape
    #[error("Malformed COSE_Sign1: {0}")]
    MalformedCose(String),

    /// COSE_Key is missing the public key or holds the wrong type at `-2`
    #[error("Malformed COSE_Key: {0}")]
    MalformedCoseKey(String),

    /// Ed25519 signatures are exactly 64 bytes
    #[error("Invalid signature length: {actual} bytes, expected {expected}")]
    InvalidSignatureLength {
        /// Length found in the envelope
        actual: usize,
        /// Required length
        expected: usize,
    },

    /// Ed25519 public keys are exactly 32 bytes
    #[error("Invalid public key length: {actual} bytes, expected {expected}")]
    InvalidPublicKeyLength {
        /// Length found in the COSE_Key
        actual: usize,
        /// Required length
        expected: usize,
    },

    /// Hash primitive rejected the requested output size
    #[error("Hash error: {0}")]
    Hash(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::MalformedHex(e.to_string())
    }
}

// minicbor's error only implements std::error::Error with its `std` feature,
// so the conversion goes through Display.
impl From<minicbor::decode::Error> for Error {
    fn from(e: minicbor::decode::Error) -> Self {
        Error::MalformedCbor(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_messages() {
        let err = Error::InvalidSignatureLength {
            actual: 32,
            expected: 64,
        };
        assert_eq!(
            err.to_string(),
            "Invalid signature length: 32 bytes, expected 64"
        );

        let err = Error::InvalidPublicKeyLength {
            actual: 16,
            expected: 32,
        };
        assert_eq!(
            err.to_string(),
            "Invalid public key length: 16 bytes, expected 32"
        );
    }

    #[test]
    fn test_hex_conversion() {
        let err: Error = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, Error::MalformedHex(_)));
    }
}
