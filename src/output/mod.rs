//! Helpers for rendering verification outcomes

use crate::address;
use crate::batch::BatchItem;
use crate::verifier::{VerificationOutcome, VerificationRequest};
use serde_json::{Map, Value, json};

/// Combined structured and human-readable representation of an outcome
#[derive(Debug, Clone)]
pub struct RenderedOutcome {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render one verification into both JSON and human-readable forms.
pub fn render_outcome(request: &VerificationRequest, outcome: &VerificationOutcome) -> RenderedOutcome {
    RenderedOutcome {
        json: outcome_value(request, outcome),
        human: human_lines(request, outcome),
    }
}

/// Render a batch. The JSON form is an array of per-request objects carrying their index.
pub fn render_batch(requests: &[VerificationRequest], items: &[BatchItem]) -> RenderedOutcome {
    let mut json = Vec::with_capacity(items.len());
    let mut human = Vec::new();

    for item in items {
        let Some(request) = requests.get(item.index) else {
            continue;
        };
        let mut value = outcome_value(request, &item.outcome);
        if let Value::Object(map) = &mut value {
            map.insert("index".to_string(), Value::from(item.index));
        }
        json.push(value);

        human.push(format!("[{}]", item.index));
        human.extend(human_lines(request, &item.outcome));
    }

    let valid = items.iter().filter(|item| item.outcome.is_valid).count();
    human.push(format!("{valid} of {} signatures valid", items.len()));

    RenderedOutcome {
        json: Value::Array(json),
        human,
    }
}

/// Produce a structured JSON representation of an outcome and the request it answers.
pub fn outcome_value(request: &VerificationRequest, outcome: &VerificationOutcome) -> Value {
    let mut root = match serde_json::to_value(outcome) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    root.insert("status".to_string(), Value::String(status_label(outcome).to_string()));
    root.insert(
        "request".to_string(),
        json!({
            "expectedStakeAddress": request.expected_stake_address,
            "networkMode": request.network_mode,
            "challengeHex": request.challenge_hex,
        }),
    );
    Value::Object(root)
}

/// `valid`, `invalid` or `error`
pub fn status_label(outcome: &VerificationOutcome) -> &'static str {
    if outcome.is_error() {
        "error"
    } else if outcome.is_valid {
        "valid"
    } else {
        "invalid"
    }
}

fn human_lines(request: &VerificationRequest, outcome: &VerificationOutcome) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "CIP-8 signature: {}",
        status_label(outcome).to_ascii_uppercase()
    ));
    lines.push(format!("  Stake address: {}", request.expected_stake_address));
    lines.push(format!(
        "  Network mode: {} ({})",
        request.network_mode,
        network_label(request.network_mode)
    ));
    lines.push(format!("  Challenge: {}", challenge_snippet(&request.challenge_hex)));

    if let Some(error) = &outcome.error {
        lines.push(format!("  Error: {error}"));
        return lines;
    }

    lines.push(format!("  Address matches: {}", yes_no(outcome.address_matches)));
    lines.push(format!("  Challenge matches: {}", yes_no(outcome.challenge_matches)));
    lines.push(format!("  Signature valid: {}", yes_no(outcome.signature_valid)));
    lines
}

fn network_label(network_mode: i64) -> &'static str {
    if address::stake_prefix(network_mode) == address::MAINNET_PREFIX {
        "mainnet"
    } else {
        "testnet"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn challenge_snippet(challenge_hex: &str) -> String {
    match hex::decode(challenge_hex) {
        Ok(bytes) => match std::str::from_utf8(&bytes) {
            Ok(text) if !text.is_empty() && text.chars().all(|c| !c.is_control()) => {
                format!("\"{}\"", format_text_snippet(text))
            }
            _ => format_hex_snippet(challenge_hex, bytes.len()),
        },
        Err(_) => format!("{} (not hex)", format_text_snippet(challenge_hex)),
    }
}

fn format_hex_snippet(hex: &str, byte_len: usize) -> String {
    if byte_len == 0 {
        return "empty".to_string();
    }

    const MAX: usize = 64;
    if hex.len() > MAX {
        format!("{}... ({} bytes)", &hex[..MAX], byte_len)
    } else {
        format!("{} ({} bytes)", hex, byte_len)
    }
}

fn format_text_snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let snippet: String = text.chars().take(MAX).collect();
        let total = text.chars().count();
        format!("{}... ({} chars)", snippet, total)
    }
}
