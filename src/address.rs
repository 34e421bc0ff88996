//! Stake address derivation from an Ed25519 public key
//!
//! A Shelley reward address is a header byte (`0xe0 | network`) followed by the
//! Blake2b-224 hash of the staking key, bech32-encoded under `stake` / `stake_test`.

use crate::bech32;
use crate::cose::PublicKey;
use crate::crypto::{self, KEY_HASH_LENGTH};

/// Network mode selecting the mainnet prefix
pub const NETWORK_MAINNET: i64 = 1;

/// Network mode for testnets (any value other than 1 selects the testnet prefix)
pub const NETWORK_TESTNET: i64 = 0;

/// Human-readable part for mainnet stake addresses
pub const MAINNET_PREFIX: &str = "stake";

/// Human-readable part for testnet stake addresses
pub const TESTNET_PREFIX: &str = "stake_test";

const STAKE_HEADER_BASE: u8 = 0xe0;

/// Header byte plus key hash
pub const STAKE_KEY_LENGTH: usize = 1 + KEY_HASH_LENGTH;

/// Bech32 prefix for a network mode. Only exactly `1` is mainnet.
pub fn stake_prefix(network_mode: i64) -> &'static str {
    if network_mode == NETWORK_MAINNET {
        MAINNET_PREFIX
    } else {
        TESTNET_PREFIX
    }
}

/// Address header byte. Only the lowest bit of the network mode is folded in.
pub fn stake_header(network_mode: i64) -> u8 {
    STAKE_HEADER_BASE | (network_mode & 0x1) as u8
}

/// Raw 29-byte stake address: header followed by `Blake2b224(public_key)`
pub fn stake_key_bytes(public_key: &PublicKey, network_mode: i64) -> [u8; STAKE_KEY_LENGTH] {
    let mut out = [0u8; STAKE_KEY_LENGTH];
    out[0] = stake_header(network_mode);
    out[1..].copy_from_slice(&crypto::blake2b_224(public_key.as_bytes()));
    out
}

/// Bech32 stake address a wallet holding `public_key` would report.
///
/// Network modes other than 0 and 1 are not rejected: the prefix is testnet unless the
/// mode is exactly 1, and the header takes the mode's low bit.
pub fn derive_stake_address(public_key: &PublicKey, network_mode: i64) -> String {
    let stake_key = stake_key_bytes(public_key, network_mode);
    let address = bech32::encode(stake_prefix(network_mode), &stake_key);
    tracing::debug!(
        target: "cip8_verify::address",
        network_mode,
        stake_key = %hex::encode(stake_key),
        %address,
        "derived stake address"
    );
    address
}
