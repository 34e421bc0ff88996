//! Concurrent verification of independent requests
//!
//! Verifications share no state, so a batch is a plain fan-out: every request runs on the
//! blocking pool, bounded by a semaphore, and results are re-ordered by input position.

use crate::error::{Error, Result};
use crate::verifier::{self, VerificationOutcome, VerificationRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Table { requests: Vec<RequestEntry> },
    List(Vec<RequestEntry>),
    Single(RequestEntry),
}

/// A request as written in a file, where `networkMode` may be left out
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestEntry {
    signature_cbor: String,
    signature_key: String,
    #[serde(alias = "walletAuthChallengeHex")]
    challenge_hex: String,
    #[serde(alias = "stakeKeyAddress", alias = "expectedSignerStakeAddress")]
    expected_stake_address: String,
    network_mode: Option<i64>,
}

impl RequestFile {
    fn into_requests(self, default_network_mode: i64) -> Vec<VerificationRequest> {
        let entries = match self {
            Self::Table { requests } | Self::List(requests) => requests,
            Self::Single(request) => vec![request],
        };
        entries
            .into_iter()
            .map(|entry| {
                VerificationRequest::new(
                    entry.signature_cbor,
                    entry.signature_key,
                    entry.challenge_hex,
                    entry.expected_stake_address,
                    entry.network_mode.unwrap_or(default_network_mode),
                )
            })
            .collect()
    }
}

/// Read verification requests from a JSON, YAML or TOML file.
///
/// A file holds one request object, a list of them, or a `requests` list (the only
/// form TOML can express). Requests without a `networkMode` get `default_network_mode`.
pub fn load_requests(path: &Path, default_network_mode: i64) -> Result<Vec<VerificationRequest>> {
    let contents = fs::read_to_string(path)?;

    let parsed: RequestFile = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "json" => serde_json::from_str(&contents).map_err(|e| {
            Error::Other(format!("Failed to parse JSON {}: {e}", path.display()))
        })?,
        "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
            Error::Other(format!("Failed to parse YAML {}: {e}", path.display()))
        })?,
        "toml" => toml::from_str(&contents).map_err(|e| {
            Error::Other(format!("Failed to parse TOML {}: {e}", path.display()))
        })?,
        other => {
            return Err(Error::Other(format!(
                "Unsupported request file format '{}', expected json/yaml/toml",
                other
            )));
        }
    };

    let requests = parsed.into_requests(default_network_mode);
    tracing::debug!(target: "cip8_verify::batch", path = %path.display(), count = requests.len(), "loaded requests");
    Ok(requests)
}

/// Outcome of one request in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position of the request in the input
    pub index: usize,
    /// Its verification outcome
    pub outcome: VerificationOutcome,
}

/// Verify every request with at most `concurrency` running at once (minimum 1).
///
/// Always returns one item per request, sorted by `index`. A task that panics or is
/// cancelled yields an error outcome for its request instead of failing the batch.
pub async fn verify_all(requests: Vec<VerificationRequest>, concurrency: usize) -> Vec<BatchItem> {
    let total = requests.len();
    let parallel = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(parallel));
    let mut join_set = JoinSet::new();

    tracing::debug!(target: "cip8_verify::batch", total, parallel, "starting batch");

    for (index, request) in requests.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        join_set.spawn(async move { (index, verify_one(semaphore, request).await) });
    }

    let mut slots: Vec<Option<VerificationOutcome>> = vec![None; total];
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(err) => {
                tracing::warn!(target: "cip8_verify::batch", error = %err, "batch task failed");
            }
        }
    }

    let items: Vec<BatchItem> = slots
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| BatchItem {
            index,
            outcome: outcome
                .unwrap_or_else(|| VerificationOutcome::failed("verification task did not complete")),
        })
        .collect();

    let valid = items.iter().filter(|item| item.outcome.is_valid).count();
    tracing::info!(target: "cip8_verify::batch", total, valid, "batch finished");
    items
}

async fn verify_one(semaphore: Arc<Semaphore>, request: VerificationRequest) -> VerificationOutcome {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(err) => return VerificationOutcome::failed(format!("batch scheduler closed: {err}")),
    };

    match tokio::task::spawn_blocking(move || verifier::verify(&request)).await {
        Ok(outcome) => outcome,
        Err(err) => VerificationOutcome::failed(format!("verification task failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garbage(tag: usize) -> VerificationRequest {
        VerificationRequest::new("ff", "a0", "00", format!("stake_test1{tag}"), 0)
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(verify_all(Vec::new(), 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let items = verify_all(vec![garbage(0), garbage(1)], 0).await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.outcome.is_error()));
    }

    fn write_requests(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_single_json_request() {
        let file = write_requests(
            ".json",
            r#"{"signatureCbor":"84","signatureKey":"a4","challengeHex":"00","expectedStakeAddress":"stake1x","networkMode":1}"#,
        );
        let requests = load_requests(file.path(), 0).unwrap();
        assert_eq!(requests, vec![VerificationRequest::new("84", "a4", "00", "stake1x", 1)]);
    }

    #[test]
    fn test_load_yaml_list_with_legacy_keys() {
        let file = write_requests(
            ".yaml",
            "- signatureCbor: '84'\n  signatureKey: a4\n  walletAuthChallengeHex: '00'\n  stakeKeyAddress: stake_test1x\n  networkMode: 0\n- signatureCbor: ff\n  signatureKey: a0\n  challengeHex: '01'\n  expectedSignerStakeAddress: stake_test1y\n",
        );
        let requests = load_requests(file.path(), 0).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].challenge_hex, "00");
        assert_eq!(requests[1].expected_stake_address, "stake_test1y");
        assert_eq!(requests[1].network_mode, 0);
    }

    #[test]
    fn test_load_toml_requests_table() {
        let file = write_requests(
            ".toml",
            "[[requests]]\nsignatureCbor = \"84\"\nsignatureKey = \"a4\"\nchallengeHex = \"00\"\nexpectedStakeAddress = \"stake1x\"\nnetworkMode = 1\n",
        );
        let requests = load_requests(file.path(), 0).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].network_mode, 1);
    }

    #[test]
    fn test_missing_network_mode_takes_default() {
        let file = write_requests(
            ".json",
            r#"[{"signatureCbor":"84","signatureKey":"a4","challengeHex":"00","expectedStakeAddress":"stake1x"},
               {"signatureCbor":"84","signatureKey":"a4","challengeHex":"00","expectedStakeAddress":"stake_test1x","networkMode":0}]"#,
        );
        let requests = load_requests(file.path(), 1).unwrap();
        assert_eq!(requests[0].network_mode, 1);
        assert_eq!(requests[1].network_mode, 0);

        let requests = load_requests(file.path(), 0).unwrap();
        assert_eq!(requests[0].network_mode, 0);
    }

    #[test]
    fn test_load_rejects_unknown_format() {
        let file = write_requests(".csv", "signatureCbor,signatureKey");
        assert!(matches!(load_requests(file.path(), 0), Err(Error::Other(_))));
        assert!(matches!(
            load_requests(Path::new("/nonexistent/requests.json"), 0),
            Err(Error::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_items_sorted_by_index() {
        let requests: Vec<_> = (0..20).map(garbage).collect();
        let items = verify_all(requests, 3).await;
        let indices: Vec<usize> = items.iter().map(|item| item.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }
}
