//! cip8-verify - CIP-8 wallet signature verification for Cardano
//!
//! A Cardano wallet proves control of a stake address by signing a server-issued challenge
//! with CIP-8 `signData`, returning a COSE_Sign1 envelope and the COSE_Key it was signed with.
//! This crate checks such a response end to end.
//!
//! # Features
//!
//! - **Stake address check**: Blake2b-224 key hash, Shelley reward header, bech32 encoding
//! - **Challenge check**: raw challenge (software wallets) or its Blake2b-224 hash (hardware wallets)
//! - **Signature check**: Ed25519 over the RFC 9052 Sig_structure
//! - **Total**: malformed input becomes an error outcome, never a panic or an `Err`
//! - **Batching**: concurrent verification of many requests on Tokio
//!
//! # Example
//!
//! ```no_run
//! use cip8_verify::{VerificationRequest, verify};
//!
//! let request = VerificationRequest::new(
//!     "84582aa2...",                  // COSE_Sign1 hex from the wallet
//!     "a4010103272006215820...",      // COSE_Key hex from the wallet
//!     "31633364...",                  // challenge hex issued by the backend
//!     "stake_test1upafv37jqjy8pgrjdauxyxrruqme0hqhh9ryww34mm297agc0f3vc",
//!     0,
//! );
//!
//! let outcome = verify(&request);
//! if outcome.is_valid {
//!     println!("wallet owns the stake address");
//! } else if let Some(error) = &outcome.error {
//!     println!("rejected: {error}");
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
pub mod batch;
pub mod bech32;
pub mod cbor;
pub mod config;
pub mod cose;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod verifier;

// Re-exports for convenience
pub use error::{Error, Result};

pub use address::derive_stake_address;
pub use batch::{BatchItem, verify_all};
pub use cbor::CborValue;
pub use config::{Cip8Config, LogRotation, LoggingOptions, MetricsOptions, VerifyOptions};
pub use cose::{CoseSign1, PublicKey, create_sig_structure, extract_public_key, parse_cose_sign1};
pub use verifier::{
    VerificationOutcome, VerificationRequest, challenge_matches, signature_matches, verify,
    verify_signature,
};
