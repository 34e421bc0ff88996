//! Lightweight in-process verification metrics
//!
//! Counters are global and disabled until [`enable`] is called; recording while disabled
//! is a no-op. Recording only touches atomic counters, so concurrent verifications never
//! wait on each other.

use crate::config::MetricsFormat;
use crate::error::Result;
use crate::verifier::VerificationOutcome;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use tracing::info;

static METRICS: OnceLock<MetricsState> = OnceLock::new();

/// Start collecting verification metrics. Calling it again keeps existing counters.
pub fn enable() {
    METRICS.get_or_init(MetricsState::new);
}

/// Whether [`enable`] has been called
pub fn is_enabled() -> bool {
    METRICS.get().is_some()
}

/// Record the outcome of one verification and how long it took.
pub fn record(outcome: &VerificationOutcome, duration: Duration) {
    if let Some(state) = METRICS.get() {
        state.record(outcome, duration);
    }
}

/// Current counters, or `None` when metrics are disabled
pub fn snapshot() -> Option<MetricsSnapshot> {
    METRICS.get().map(MetricsState::snapshot)
}

/// Zero all counters and restart the window
pub fn reset() {
    if let Some(state) = METRICS.get() {
        state.reset();
    }
}

#[derive(Default)]
struct Counter(AtomicU64);

impl Counter {
    fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

struct MetricsState {
    total: Counter,
    valid: Counter,
    invalid: Counter,
    errored: Counter,
    address_mismatches: Counter,
    challenge_mismatches: Counter,
    signature_failures: Counter,
    latency_total_nanos: AtomicU64,
    latency_max_nanos: AtomicU64,
    // only read by snapshot and written by reset
    started: Mutex<Instant>,
}

impl MetricsState {
    fn new() -> Self {
        Self {
            total: Counter::default(),
            valid: Counter::default(),
            invalid: Counter::default(),
            errored: Counter::default(),
            address_mismatches: Counter::default(),
            challenge_mismatches: Counter::default(),
            signature_failures: Counter::default(),
            latency_total_nanos: AtomicU64::new(0),
            latency_max_nanos: AtomicU64::new(0),
            started: Mutex::new(Instant::now()),
        }
    }

    fn record(&self, outcome: &VerificationOutcome, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total.incr();
        self.latency_total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.latency_max_nanos.fetch_max(nanos, Ordering::Relaxed);

        if outcome.is_error() {
            self.errored.incr();
            return;
        }

        if outcome.is_valid {
            self.valid.incr();
        } else {
            self.invalid.incr();
        }
        if !outcome.address_matches {
            self.address_mismatches.incr();
        }
        if !outcome.challenge_matches {
            self.challenge_mismatches.incr();
        }
        if !outcome.signature_valid {
            self.signature_failures.incr();
        }
    }

    fn reset(&self) {
        for counter in [
            &self.total,
            &self.valid,
            &self.invalid,
            &self.errored,
            &self.address_mismatches,
            &self.challenge_mismatches,
            &self.signature_failures,
        ] {
            counter.clear();
        }
        self.latency_total_nanos.store(0, Ordering::Relaxed);
        self.latency_max_nanos.store(0, Ordering::Relaxed);
        *lock(&self.started) = Instant::now();
    }

    fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total.get();
        let latency_total_nanos = self.latency_total_nanos.load(Ordering::Relaxed) as f64;
        let latency_avg_ms = if total == 0 {
            0.0
        } else {
            latency_total_nanos / 1_000_000.0 / total as f64
        };

        MetricsSnapshot {
            window_secs: lock(&self.started).elapsed().as_secs(),
            total,
            valid: self.valid.get(),
            invalid: self.invalid.get(),
            errored: self.errored.get(),
            address_mismatches: self.address_mismatches.get(),
            challenge_mismatches: self.challenge_mismatches.get(),
            signature_failures: self.signature_failures.get(),
            latency_total_seconds: latency_total_nanos / 1_000_000_000.0,
            latency_avg_ms,
            latency_max_ms: self.latency_max_nanos.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

fn lock(started: &Mutex<Instant>) -> MutexGuard<'_, Instant> {
    started.lock().unwrap_or_else(PoisonError::into_inner)
}


/// Point-in-time copy of the verification counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Seconds since metrics were enabled or last reset
    pub window_secs: u64,
    /// Verifications recorded
    pub total: u64,
    /// Outcomes with every check passing
    pub valid: u64,
    /// Processed outcomes with at least one failed check
    pub invalid: u64,
    /// Outcomes rejected as malformed input
    pub errored: u64,
    /// Processed outcomes whose stake address did not match
    pub address_mismatches: u64,
    /// Processed outcomes whose payload did not match the challenge
    pub challenge_mismatches: u64,
    /// Processed outcomes whose signature did not verify
    pub signature_failures: u64,
    /// Cumulative verification time
    pub latency_total_seconds: f64,
    /// Mean verification time
    pub latency_avg_ms: f64,
    /// Slowest verification
    pub latency_max_ms: f64,
}

impl MetricsSnapshot {
    /// Share of recorded verifications that were valid, in percent
    pub fn valid_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f64 * 100.0 / self.total as f64
        }
    }
}

/// Render a snapshot as pretty JSON or Prometheus text exposition.
pub fn render(snapshot: &MetricsSnapshot, format: MetricsFormat) -> Result<String> {
    match format {
        MetricsFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        MetricsFormat::Prometheus => Ok(render_prometheus(snapshot)),
    }
}

/// Emit a snapshot through tracing.
pub fn log_snapshot(snapshot: &MetricsSnapshot) {
    let valid_rate = snapshot.valid_rate();
    info!(
        target: "cip8_verify::metrics",
        window_secs = snapshot.window_secs,
        total = snapshot.total,
        valid = snapshot.valid,
        invalid = snapshot.invalid,
        errored = snapshot.errored,
        address_mismatches = snapshot.address_mismatches,
        challenge_mismatches = snapshot.challenge_mismatches,
        signature_failures = snapshot.signature_failures,
        avg_latency_ms = snapshot.latency_avg_ms,
        valid_rate = format_args!("{valid_rate:.1}%"),
        "Verification metrics"
    );
}

fn render_prometheus(snapshot: &MetricsSnapshot) -> String {
    let mut output = String::new();

    let _ = writeln!(
        &mut output,
        "# HELP cip8_window_seconds Duration of the aggregation window in seconds"
    );
    let _ = writeln!(&mut output, "# TYPE cip8_window_seconds gauge");
    let _ = writeln!(&mut output, "cip8_window_seconds {}", snapshot.window_secs);

    let _ = writeln!(
        &mut output,
        "# HELP cip8_verifications_total Verifications by result"
    );
    let _ = writeln!(&mut output, "# TYPE cip8_verifications_total counter");
    for (result, count) in [
        ("valid", snapshot.valid),
        ("invalid", snapshot.invalid),
        ("error", snapshot.errored),
    ] {
        let _ = writeln!(
            &mut output,
            "cip8_verifications_total{{result=\"{result}\"}} {count}"
        );
    }

    let _ = writeln!(
        &mut output,
        "# HELP cip8_check_failures_total Failed checks among processed verifications"
    );
    let _ = writeln!(&mut output, "# TYPE cip8_check_failures_total counter");
    for (check, count) in [
        ("address", snapshot.address_mismatches),
        ("challenge", snapshot.challenge_mismatches),
        ("signature", snapshot.signature_failures),
    ] {
        let _ = writeln!(
            &mut output,
            "cip8_check_failures_total{{check=\"{check}\"}} {count}"
        );
    }

    let _ = writeln!(
        &mut output,
        "# HELP cip8_verification_latency_seconds Verification latency statistics"
    );
    let _ = writeln!(&mut output, "# TYPE cip8_verification_latency_seconds gauge");
    let _ = writeln!(
        &mut output,
        "cip8_verification_latency_seconds{{stat=\"avg\"}} {:.6}",
        snapshot.latency_avg_ms / 1_000.0
    );
    let _ = writeln!(
        &mut output,
        "cip8_verification_latency_seconds{{stat=\"max\"}} {:.6}",
        snapshot.latency_max_ms / 1_000.0
    );
    let _ = writeln!(
        &mut output,
        "cip8_verification_latency_seconds{{stat=\"sum\"}} {:.6}",
        snapshot.latency_total_seconds
    );

    output
}
