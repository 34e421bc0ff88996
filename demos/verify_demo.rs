//! Verify a real wallet's CIP-8 signature, then a few tampered variants
//!
//! Usage: cargo run --example verify_demo

use cip8_verify::{VerificationRequest, batch, output, verify};
use tracing_subscriber::EnvFilter;

const SIGNATURE_CBOR: &str = "84582aa201276761646472657373581de07a9647d2048870a0726f78621863e03797dc17b946473a35ded45f75a166686173686564f4582431633364353630312d386563632d343264662d623162302d3061323934643061346564355840d40e65ebb258bd48d04092f485b845a6c0c9b1728e896c8364e51e1b6d67cd2c36dc17ad52409671a8ac8e2376e3bf138869621d03c28841a50cd68bc34fa108";
const SIGNATURE_KEY: &str =
    "a4010103272006215820eb59d52fbd257d3f8f8f51dd59b2013092763fc9cbc109d32d837920be5e62be";
const CHALLENGE_HEX: &str =
    "31633364353630312d386563632d343264662d623162302d306132393464306134656435";
const STAKE_ADDRESS: &str = "stake_test1upafv37jqjy8pgrjdauxyxrruqme0hqhh9ryww34mm297agc0f3vc";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("CIP-8 signature verification");
    println!("============================\n");

    let request = VerificationRequest::new(
        SIGNATURE_CBOR,
        SIGNATURE_KEY,
        CHALLENGE_HEX,
        STAKE_ADDRESS,
        0,
    );
    let outcome = verify(&request);
    for line in output::render_outcome(&request, &outcome).human {
        println!("{line}");
    }
    anyhow::ensure!(outcome.is_valid, "known-good signature failed to verify");

    println!("\nTampered variants:");

    let mut tampered_signature = request.clone();
    tampered_signature.signature_cbor = format!("{}0000", &SIGNATURE_CBOR[..SIGNATURE_CBOR.len() - 4]);

    let mut wrong_challenge = request.clone();
    wrong_challenge.challenge_hex = hex::encode("wrong_challenge");

    let mut mainnet = request.clone();
    mainnet.network_mode = 1;

    let mut garbage = request.clone();
    garbage.signature_cbor = "ff".to_string();

    let variants = vec![tampered_signature, wrong_challenge, mainnet, garbage];
    let items = batch::verify_all(variants.clone(), 4).await;
    println!("{}", serde_json::to_string_pretty(&output::render_batch(&variants, &items).json)?);

    Ok(())
}
