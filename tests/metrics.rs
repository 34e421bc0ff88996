mod common;

use cip8_verify::config::MetricsFormat;
use cip8_verify::{metrics, verify, verify_all};
use common::*;

// Metrics are process-global, so everything touching them lives in this one test.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn verifications_are_counted_once_enabled() {
    assert!(!metrics::is_enabled());
    verify(&wallet_request());
    assert!(metrics::snapshot().is_none(), "disabled metrics should not be collected");

    metrics::enable();
    metrics::reset();
    assert!(metrics::is_enabled());

    let mut tampered = wallet_request();
    tampered.signature_cbor = format!("{}0000", &SIGNATURE_CBOR[..SIGNATURE_CBOR.len() - 4]);
    let mut garbage = wallet_request();
    garbage.signature_key = "aa".to_string();

    verify(&wallet_request());
    verify_all(vec![tampered, garbage], 2).await;

    let snapshot = metrics::snapshot().expect("metrics enabled");
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.valid, 1);
    assert_eq!(snapshot.invalid, 1);
    assert_eq!(snapshot.errored, 1);
    assert_eq!(snapshot.signature_failures, 1);
    assert_eq!(snapshot.address_mismatches, 0);

    let text = metrics::render(&snapshot, MetricsFormat::Prometheus).unwrap();
    assert!(text.contains("cip8_verifications_total{result=\"valid\"} 1"));

    let json: serde_json::Value =
        serde_json::from_str(&metrics::render(&snapshot, MetricsFormat::Json).unwrap()).unwrap();
    assert_eq!(json["errored"], 1);

    metrics::reset();
    assert_eq!(metrics::snapshot().map(|s| s.total), Some(0));
}
