//! cip8-verify command-line entrypoint

use cip8_verify::batch;
use cip8_verify::config::MetricsFormat;
use cip8_verify::output::{RenderedOutcome, render_batch, render_outcome};
use cip8_verify::{Cip8Config, Error, Result, VerificationRequest, logging, metrics, verify};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "cip8-verify",
    version,
    about = "Verify CIP-8 wallet signatures against a Cardano stake address"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to cip8.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Hex-encoded COSE_Sign1 envelope returned by the wallet
    #[arg(long, value_name = "HEX", required_unless_present = "request", conflicts_with = "request")]
    signature_cbor: Option<String>,

    /// Hex-encoded COSE_Key returned by the wallet
    #[arg(long, value_name = "HEX", required_unless_present = "request", conflicts_with = "request")]
    signature_key: Option<String>,

    /// Hex-encoded challenge the wallet was asked to sign
    #[arg(long, value_name = "HEX", required_unless_present = "request", conflicts_with = "request")]
    challenge: Option<String>,

    /// Stake address the signer claims to own
    #[arg(long, value_name = "ADDR", required_unless_present = "request", conflicts_with = "request")]
    stake_address: Option<String>,

    /// 0 for testnets, 1 for mainnet (defaults to the configured value)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    network_mode: Option<i64>,

    /// Verify the request(s) in a JSON/YAML/TOML file instead of command-line values
    #[arg(long, value_name = "PATH")]
    request: Option<PathBuf>,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Print a metrics summary to stderr after verifying
    #[arg(long)]
    metrics: bool,

    /// Metrics summary format (`json` or `prometheus`)
    #[arg(long, value_name = "FORMAT")]
    metrics_format: Option<String>,
}

struct OutputSink {
    json: bool,
}

impl OutputSink {
    fn emit(&self, rendered: &RenderedOutcome) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&rendered.json)?);
        } else {
            for line in &rendered.human {
                println!("{line}");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Cip8Config::load(cli.config.as_deref())?;

    if let Some(mode) = cli.network_mode {
        config.verify.network_mode = mode;
    }

    if cli.metrics {
        config.metrics.enabled = true;
    }

    if let Some(ref format) = cli.metrics_format {
        config.metrics.format = format.parse::<MetricsFormat>().map_err(Error::Config)?;
        config.metrics.enabled = true;
    }

    logging::init(&config.logging)?;

    if config.metrics.enabled {
        metrics::enable();
    }

    let sink = OutputSink { json: cli.json };

    let all_valid = match cli.request.as_deref() {
        Some(path) => {
            let requests = batch::load_requests(path, config.verify.network_mode)?;
            info!(path = %path.display(), count = requests.len(), "Verifying request file");
            verify_many(requests, config.verify.batch_concurrency, &sink).await?
        }
        None => {
            let request = VerificationRequest::new(
                required(cli.signature_cbor, "--signature-cbor")?,
                required(cli.signature_key, "--signature-key")?,
                required(cli.challenge, "--challenge")?,
                required(cli.stake_address, "--stake-address")?,
                config.verify.network_mode,
            );
            let outcome = verify(&request);
            sink.emit(&render_outcome(&request, &outcome))?;
            outcome.is_valid
        }
    };

    if let Some(snapshot) = metrics::snapshot() {
        metrics::log_snapshot(&snapshot);
        eprintln!("{}", metrics::render(&snapshot, config.metrics.format)?);
    }

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

async fn verify_many(
    requests: Vec<VerificationRequest>,
    concurrency: usize,
    sink: &OutputSink,
) -> Result<bool> {
    if requests.is_empty() {
        return Err(Error::Other("request file contains no requests".to_string()));
    }

    if let [request] = requests.as_slice() {
        let outcome = verify(request);
        sink.emit(&render_outcome(request, &outcome))?;
        return Ok(outcome.is_valid);
    }

    let items = batch::verify_all(requests.clone(), concurrency).await;
    sink.emit(&render_batch(&requests, &items))?;
    Ok(items.iter().all(|item| item.outcome.is_valid))
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    value.ok_or_else(|| Error::Config(format!("{flag} is required without --request")))
}
