mod common;

use common::*;
use std::io::Write;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    let config_home = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_cip8-verify"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("CIP8_LOG_LEVEL", "error")
        .env_remove("CIP8_NETWORK_MODE")
        .env_remove("CIP8_METRICS")
        .output()
        .unwrap()
}

fn flags(stake_address: &str) -> Vec<&str> {
    vec![
        "--signature-cbor",
        SIGNATURE_CBOR,
        "--signature-key",
        SIGNATURE_KEY,
        "--challenge",
        CHALLENGE_HEX,
        "--stake-address",
        stake_address,
    ]
}

#[test]
fn valid_signature_exits_zero() {
    let mut args = flags(STAKE_ADDRESS);
    args.push("--json");
    let output = run(&args);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["isValid"], true);
    assert_eq!(json["status"], "valid");
}

#[test]
fn invalid_signature_exits_one() {
    let output = run(&flags(MAINNET_STAKE_ADDRESS));

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CIP-8 signature: INVALID"));
    assert!(stdout.contains("Address matches: no"));
}

#[test]
fn network_mode_flag_selects_mainnet() {
    let mut args = flags(MAINNET_STAKE_ADDRESS);
    args.extend(["--network-mode", "1"]);

    assert!(run(&args).status.success());
}

#[test]
fn request_file_batch() {
    let mut tampered = wallet_request();
    tampered.signature_cbor = format!("{}0000", &SIGNATURE_CBOR[..SIGNATURE_CBOR.len() - 4]);
    let body = serde_json::to_string(&vec![wallet_request(), tampered]).unwrap();

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap();

    let output = run(&["--request", path, "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["isValid"], true);
    assert_eq!(json[1]["signatureValid"], false);
    assert_eq!(json[1]["index"], 1);
}

#[test]
fn request_file_uses_network_mode_flag() {
    let entry = serde_json::json!({
        "signatureCbor": SIGNATURE_CBOR,
        "signatureKey": SIGNATURE_KEY,
        "challengeHex": CHALLENGE_HEX,
        "expectedStakeAddress": MAINNET_STAKE_ADDRESS,
    });
    let body = serde_json::to_string(&vec![entry.clone(), entry]).unwrap();

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap();

    let output = run(&["--request", path, "--network-mode", "1", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[1]["addressMatches"], true);
    assert_eq!(json[0]["request"]["networkMode"], 1);

    assert_eq!(run(&["--request", path]).status.code(), Some(1));
}

#[test]
fn missing_arguments_are_rejected() {
    let output = run(&["--signature-cbor", SIGNATURE_CBOR]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
}
