//! Adapters over the external hash and signature primitives

use crate::error::{Error, Result};
use blake2::digest::consts::{U28, U32};
use blake2::digest::{Update, VariableOutput};
use blake2::{Blake2b, Blake2bVar, Digest};
use ed25519_dalek::{Signature, VerifyingKey};

/// Ed25519 signature size in bytes
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// Ed25519 public key size in bytes
pub const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

/// Blake2b-224 digest size, the Cardano key-hash width
pub const KEY_HASH_LENGTH: usize = 28;

type Blake2b224 = Blake2b<U28>;
type Blake2b256 = Blake2b<U32>;

/// Blake2b with an explicit output length in bytes (1..=64).
pub fn blake2b(input: &[u8], output_len: usize) -> Result<Vec<u8>> {
    let mut hasher = Blake2bVar::new(output_len)
        .map_err(|_| Error::Hash(format!("unsupported Blake2b output length {output_len}")))?;
    hasher.update(input);

    let mut out = vec![0u8; output_len];
    hasher
        .finalize_variable(&mut out)
        .map_err(|e| Error::Hash(format!("Blake2b finalize failed: {e}")))?;
    Ok(out)
}

/// Blake2b-224, used for stake key hashes and hardware-wallet challenge hashing
pub fn blake2b_224(input: &[u8]) -> [u8; KEY_HASH_LENGTH] {
    let digest = Blake2b224::digest(input);
    let mut out = [0u8; KEY_HASH_LENGTH];
    out.copy_from_slice(&digest);
    out
}

/// Blake2b-256
pub fn blake2b_256(input: &[u8]) -> [u8; 32] {
    let digest = Blake2b256::digest(input);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Detached Ed25519 verification.
///
/// Strict verification rejects non-canonical and small-order encodings. A key that does
/// not decode to a curve point cannot have produced the signature, so it verifies as
/// `false` rather than erroring.
pub fn verify_ed25519(
    signature: &[u8; SIGNATURE_LENGTH],
    message: &[u8],
    public_key: &[u8; PUBLIC_KEY_LENGTH],
) -> bool {
    let key = match VerifyingKey::from_bytes(public_key) {
        Ok(key) => key,
        Err(err) => {
            tracing::debug!(target: "cip8_verify::crypto", error = %err, "public key is not a valid Ed25519 point");
            return false;
        }
    };

    let signature = Signature::from_bytes(signature);
    key.verify_strict(message, &signature).is_ok()
}
