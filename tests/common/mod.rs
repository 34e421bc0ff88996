#![allow(dead_code)]

use cip8_verify::address::stake_key_bytes;
use cip8_verify::cose::labels;
use cip8_verify::{CborValue, CoseSign1, PublicKey, VerificationRequest, create_sig_structure, crypto};
use ed25519_dalek::{Signer, SigningKey};

/// Response captured from a testnet wallet
pub const SIGNATURE_CBOR: &str = "84582aa201276761646472657373581de07a9647d2048870a0726f78621863e03797dc17b946473a35ded45f75a166686173686564f4582431633364353630312d386563632d343264662d623162302d3061323934643061346564355840d40e65ebb258bd48d04092f485b845a6c0c9b1728e896c8364e51e1b6d67cd2c36dc17ad52409671a8ac8e2376e3bf138869621d03c28841a50cd68bc34fa108";
pub const SIGNATURE_KEY: &str =
    "a4010103272006215820eb59d52fbd257d3f8f8f51dd59b2013092763fc9cbc109d32d837920be5e62be";
pub const CHALLENGE_HEX: &str =
    "31633364353630312d386563632d343264662d623162302d306132393464306134656435";
pub const STAKE_ADDRESS: &str = "stake_test1upafv37jqjy8pgrjdauxyxrruqme0hqhh9ryww34mm297agc0f3vc";
pub const MAINNET_STAKE_ADDRESS: &str = "stake1u9afv37jqjy8pgrjdauxyxrruqme0hqhh9ryww34mm297agl9rng9";

pub fn wallet_request() -> VerificationRequest {
    VerificationRequest::new(SIGNATURE_CBOR, SIGNATURE_KEY, CHALLENGE_HEX, STAKE_ADDRESS, 0)
}

fn int(value: i64) -> CborValue {
    if value < 0 {
        CborValue::NegativeInt(value)
    } else {
        CborValue::UnsignedInt(value as u64)
    }
}

/// OKP / EdDSA / Ed25519 COSE_Key as wallets emit it
pub fn cose_key(public_key: &PublicKey) -> Vec<u8> {
    CborValue::Map(vec![
        (int(labels::KTY), int(1)),
        (int(labels::ALG), int(-8)),
        (int(labels::CRV), int(6)),
        (int(labels::X), CborValue::ByteString(public_key.as_bytes().to_vec())),
    ])
    .to_bytes()
    .unwrap()
}

/// A freshly signed CIP-8 response
pub struct SignedFixture {
    pub signing_key: SigningKey,
    pub public_key: PublicKey,
    pub envelope: CoseSign1,
}

impl SignedFixture {
    /// Sign `challenge` the way a software wallet does, or its Blake2b-224 hash when `hashed`
    pub fn new(seed: u8, challenge: &[u8], network_mode: i64, hashed: bool) -> Self {
        let signing_key = SigningKey::from_bytes(&[seed; 32]);
        let public_key = PublicKey::from(signing_key.verifying_key().to_bytes());

        let protected = CborValue::Map(vec![
            (int(1), int(-8)),
            (
                CborValue::TextString("address".to_string()),
                CborValue::ByteString(stake_key_bytes(&public_key, network_mode).to_vec()),
            ),
        ])
        .to_bytes()
        .unwrap();

        let payload = if hashed {
            crypto::blake2b_224(challenge).to_vec()
        } else {
            challenge.to_vec()
        };

        let sig_structure = create_sig_structure(&protected, &payload).unwrap();
        let signature = signing_key.sign(&sig_structure).to_bytes().to_vec();

        let unprotected = CborValue::Map(vec![(
            CborValue::TextString("hashed".to_string()),
            CborValue::Bool(hashed),
        )]);

        Self {
            signing_key,
            public_key,
            envelope: CoseSign1::new(protected, unprotected, payload, signature),
        }
    }

    pub fn signature_cbor(&self) -> String {
        hex::encode(self.envelope.to_cbor().unwrap())
    }

    pub fn signature_key(&self) -> String {
        hex::encode(cose_key(&self.public_key))
    }

    pub fn request(&self, challenge: &[u8], network_mode: i64) -> VerificationRequest {
        VerificationRequest::new(
            self.signature_cbor(),
            self.signature_key(),
            hex::encode(challenge),
            cip8_verify::derive_stake_address(&self.public_key, network_mode),
            network_mode,
        )
    }
}
