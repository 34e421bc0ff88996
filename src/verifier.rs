//! CIP-8 signature verification pipeline
//!
//! A verification answers three independent questions about a wallet's `signData` response:
//! does the signing key belong to the expected stake address, does the signed payload match
//! the issued challenge, and is the COSE signature valid for that key. Malformed input never
//! escapes as an `Err`; it is folded into a [`VerificationOutcome`] with every check `false`.

use crate::address;
use crate::cose::{self, CoseSign1, PublicKey};
use crate::crypto;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Inputs of a single verification, all as the wallet and backend exchanged them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Hex-encoded COSE_Sign1 envelope returned by the wallet
    pub signature_cbor: String,
    /// Hex-encoded COSE_Key returned by the wallet
    pub signature_key: String,
    /// Hex-encoded challenge the wallet was asked to sign
    #[serde(alias = "walletAuthChallengeHex")]
    pub challenge_hex: String,
    /// Bech32 stake address the signer claims to own
    #[serde(alias = "stakeKeyAddress", alias = "expectedSignerStakeAddress")]
    pub expected_stake_address: String,
    /// 0 for testnets, 1 for mainnet
    #[serde(default)]
    pub network_mode: i64,
}

impl VerificationRequest {
    /// Build a request from its five inputs
    pub fn new(
        signature_cbor: impl Into<String>,
        signature_key: impl Into<String>,
        challenge_hex: impl Into<String>,
        expected_stake_address: impl Into<String>,
        network_mode: i64,
    ) -> Self {
        Self {
            signature_cbor: signature_cbor.into(),
            signature_key: signature_key.into(),
            challenge_hex: challenge_hex.into(),
            expected_stake_address: expected_stake_address.into(),
            network_mode,
        }
    }
}

/// Result of a verification
///
/// When `error` is set the input could not be processed and all three checks are `false`.
/// A `false` check without an error is an ordinary mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    /// Derived stake address equals the expected one
    pub address_matches: bool,
    /// Signed payload equals the challenge, or its Blake2b-224 hash
    pub challenge_matches: bool,
    /// Ed25519 signature over the Sig_structure verified
    pub signature_valid: bool,
    /// All three checks passed
    pub is_valid: bool,
    /// Diagnostic for input that could not be processed
    #[serde(default)]
    pub error: Option<String>,
}

impl VerificationOutcome {
    /// Outcome of a completed pipeline
    pub fn from_checks(address_matches: bool, challenge_matches: bool, signature_valid: bool) -> Self {
        Self {
            address_matches,
            challenge_matches,
            signature_valid,
            is_valid: address_matches && challenge_matches && signature_valid,
            error: None,
        }
    }

    /// Outcome of a pipeline that stopped on malformed input
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            address_matches: false,
            challenge_matches: false,
            signature_valid: false,
            is_valid: false,
            error: Some(message.into()),
        }
    }

    /// Whether the input could not be processed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Verify a CIP-8 signature. Never fails; see [`VerificationOutcome`].
pub fn verify(request: &VerificationRequest) -> VerificationOutcome {
    let started = Instant::now();

    let outcome = match run_checks(request) {
        Ok(outcome) => {
            tracing::debug!(
                target: "cip8_verify::verifier",
                address_matches = outcome.address_matches,
                challenge_matches = outcome.challenge_matches,
                signature_valid = outcome.signature_valid,
                is_valid = outcome.is_valid,
                "verification finished"
            );
            outcome
        }
        Err(err) => {
            tracing::warn!(target: "cip8_verify::verifier", error = %err, "verification input rejected");
            VerificationOutcome::failed(err.to_string())
        }
    };

    crate::metrics::record(&outcome, started.elapsed());
    outcome
}

/// Positional form of [`verify`]
pub fn verify_signature(
    signature_cbor: &str,
    signature_key: &str,
    challenge_hex: &str,
    expected_stake_address: &str,
    network_mode: i64,
) -> VerificationOutcome {
    verify(&VerificationRequest::new(
        signature_cbor,
        signature_key,
        challenge_hex,
        expected_stake_address,
        network_mode,
    ))
}

fn run_checks(request: &VerificationRequest) -> Result<VerificationOutcome> {
    let public_key = cose::extract_public_key(&hex::decode(&request.signature_key)?)?;

    let derived = address::derive_stake_address(&public_key, request.network_mode);
    let address_matches = derived == request.expected_stake_address;
    if !address_matches {
        tracing::debug!(
            target: "cip8_verify::verifier",
            %derived,
            expected = %request.expected_stake_address,
            "stake address mismatch"
        );
    }

    let envelope = cose::parse_cose_sign1(&hex::decode(&request.signature_cbor)?)?;
    let signature_valid = signature_matches(&envelope, &public_key)?;
    let challenge_matches = challenge_matches(envelope.payload(), &request.challenge_hex);

    Ok(VerificationOutcome::from_checks(
        address_matches,
        challenge_matches,
        signature_valid,
    ))
}

/// Verify the envelope's Ed25519 signature over its Sig_structure.
///
/// A signature that is not exactly 64 bytes is an error, not a failed check.
pub fn signature_matches(envelope: &CoseSign1, public_key: &PublicKey) -> Result<bool> {
    let signature = envelope.ed25519_signature()?;
    let sig_structure = envelope.sig_structure()?;
    tracing::trace!(
        target: "cip8_verify::verifier",
        sig_structure = %hex::encode(&sig_structure),
        public_key = %public_key,
        "checking signature"
    );
    Ok(crypto::verify_ed25519(
        signature,
        &sig_structure,
        public_key.as_bytes(),
    ))
}

/// Whether a signed payload answers a challenge.
///
/// Software wallets sign the challenge bytes as-is; hardware wallets sign their
/// Blake2b-224 hash. The raw form compares the payload's lowercase hex with
/// `challenge_hex` as given. A challenge that is not valid hex can only fail the
/// hashed form, so it is a mismatch rather than an error.
pub fn challenge_matches(payload: &[u8], challenge_hex: &str) -> bool {
    if hex::encode(payload) == challenge_hex {
        return true;
    }
    match hex::decode(challenge_hex) {
        Ok(challenge) => payload == crypto::blake2b_224(&challenge).as_slice(),
        Err(err) => {
            tracing::debug!(target: "cip8_verify::verifier", error = %err, "challenge is not hex");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SIGNATURE_CBOR: &str = "84582aa201276761646472657373581de07a9647d2048870a0726f78621863e03797dc17b946473a35ded45f75a166686173686564f4582431633364353630312d386563632d343264662d623162302d3061323934643061346564355840d40e65ebb258bd48d04092f485b845a6c0c9b1728e896c8364e51e1b6d67cd2c36dc17ad52409671a8ac8e2376e3bf138869621d03c28841a50cd68bc34fa108";
    const SIGNATURE_KEY: &str =
        "a4010103272006215820eb59d52fbd257d3f8f8f51dd59b2013092763fc9cbc109d32d837920be5e62be";
    const CHALLENGE_HEX: &str =
        "31633364353630312d386563632d343264662d623162302d306132393464306134656435";
    const STAKE_ADDRESS: &str = "stake_test1upafv37jqjy8pgrjdauxyxrruqme0hqhh9ryww34mm297agc0f3vc";

    fn vector() -> VerificationRequest {
        VerificationRequest::new(SIGNATURE_CBOR, SIGNATURE_KEY, CHALLENGE_HEX, STAKE_ADDRESS, 0)
    }

    #[test]
    fn test_known_vector_is_valid() {
        let outcome = verify(&vector());
        assert_eq!(outcome, VerificationOutcome::from_checks(true, true, true));
        assert!(outcome.is_valid);
        assert!(!outcome.is_error());
    }

    #[test]
    fn test_positional_entry_point() {
        assert_eq!(
            verify_signature(SIGNATURE_CBOR, SIGNATURE_KEY, CHALLENGE_HEX, STAKE_ADDRESS, 0),
            verify(&vector())
        );
    }

    #[test]
    fn test_wrong_address_leaves_other_checks() {
        let mut request = vector();
        request.expected_stake_address = "stake_test1uqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqdd4srp".into();
        assert_eq!(verify(&request), VerificationOutcome::from_checks(false, true, true));
    }

    #[test]
    fn test_mainnet_mode_mismatches_testnet_address() {
        let mut request = vector();
        request.network_mode = 1;
        let outcome = verify(&request);
        assert!(!outcome.address_matches);
        assert!(outcome.challenge_matches);
        assert!(outcome.signature_valid);
        assert!(!outcome.is_valid);
    }

    #[test]
    fn test_malformed_inputs_zero_all_checks() {
        let mut request = vector();
        request.signature_cbor = "ff".into();
        let outcome = verify(&request);
        assert!(outcome.is_error());
        assert!(!outcome.address_matches && !outcome.challenge_matches && !outcome.signature_valid);

        let mut request = vector();
        request.signature_key = "not hex".into();
        assert!(verify(&request).is_error());
    }

    #[test]
    fn test_non_hex_challenge_is_a_mismatch() {
        for challenge_hex in ["zz", "313"] {
            let mut request = vector();
            request.challenge_hex = challenge_hex.into();
            assert_eq!(verify(&request), VerificationOutcome::from_checks(true, false, true));
        }
    }

    #[test]
    fn test_uppercase_challenge_does_not_match() {
        let mut request = vector();
        request.challenge_hex = CHALLENGE_HEX.to_uppercase();
        let outcome = verify(&request);
        assert_eq!(outcome, VerificationOutcome::from_checks(true, false, true));
        assert!(!outcome.is_error());
    }

    #[test]
    fn test_short_signature_is_an_error() {
        let envelope = CoseSign1::new(vec![], crate::cbor::CborValue::Null, vec![], vec![0u8; 63]);
        let key = PublicKey::from([0u8; 32]);
        assert!(matches!(
            signature_matches(&envelope, &key),
            Err(Error::InvalidSignatureLength { actual: 63, expected: 64 })
        ));
    }

    #[test]
    fn test_error_message_wording() {
        // 16-byte key under label -2
        let mut request = vector();
        request.signature_key = format!("a12150{}", "00".repeat(16));
        let outcome = verify(&request);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Invalid public key length: 16 bytes, expected 32")
        );
    }

    #[test]
    fn test_challenge_matches_raw_and_hashed() {
        let challenge = b"wallet-auth-challenge";
        let challenge_hex = hex::encode(challenge);
        assert!(challenge_matches(challenge, &challenge_hex));
        assert!(challenge_matches(&crypto::blake2b_224(challenge), &challenge_hex));
        assert!(!challenge_matches(b"something else", &challenge_hex));
        // the raw form is a string comparison against lowercase hex
        assert!(!challenge_matches(challenge, &challenge_hex.to_uppercase()));
        // the hashed form compares decoded bytes
        assert!(challenge_matches(
            &crypto::blake2b_224(challenge),
            &challenge_hex.to_uppercase()
        ));
        assert!(!challenge_matches(challenge, "abc"));
    }

    #[test]
    fn test_request_field_aliases() {
        let request: VerificationRequest = serde_json::from_value(serde_json::json!({
            "signatureCbor": SIGNATURE_CBOR,
            "signatureKey": SIGNATURE_KEY,
            "walletAuthChallengeHex": CHALLENGE_HEX,
            "stakeKeyAddress": STAKE_ADDRESS,
        }))
        .unwrap();
        assert_eq!(request, vector());

        let request: VerificationRequest = serde_json::from_value(serde_json::json!({
            "signatureCbor": SIGNATURE_CBOR,
            "signatureKey": SIGNATURE_KEY,
            "challengeHex": CHALLENGE_HEX,
            "expectedSignerStakeAddress": STAKE_ADDRESS,
            "networkMode": 1,
        }))
        .unwrap();
        assert_eq!(request.network_mode, 1);
        assert_eq!(request.expected_stake_address, STAKE_ADDRESS);
    }

    #[test]
    fn test_outcome_serialises_camel_case() {
        let value = serde_json::to_value(VerificationOutcome::from_checks(true, false, true)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "addressMatches": true,
                "challengeMatches": false,
                "signatureValid": true,
                "isValid": false,
                "error": null,
            })
        );
    }
}
