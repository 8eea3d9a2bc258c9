//! Replays a URL workload through a memoized, simulated fetch.
//!
//! Run with: cargo run --bin memokit-replay --features replay -- --policy recency-single --capacity 2
//! Per-call logs: RUST_LOG=memokit=trace cargo run --bin memokit-replay --features replay

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use memokit::metrics::exporter::PrometheusTextExporter;
use memokit::metrics::traits::MetricsExporter;
use memokit::prelude::*;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_URLS: [&str; 10] = [
    "https://google.com",
    "https://google.com",
    "https://youtube.com",
    "https://youtube.com",
    "https://google.com",
    "https://www.gov.uk",
    "https://google.com",
    "https://ithillel.ua",
    "https://google.com",
    "https://youtube.com",
];

#[derive(Debug, Parser)]
#[command(name = "memokit-replay", about = "Replay URLs through a memoized fetch")]
struct Cli {
    /// Maximum number of cached responses.
    #[arg(long, default_value_t = 2)]
    capacity: usize,

    /// Eviction policy: frequency-batch or recency-single.
    #[arg(long, default_value_t = CachePolicy::FrequencyBatch)]
    policy: CachePolicy,

    /// Bytes of each response to print; 0 prints the whole body.
    #[arg(long, default_value_t = 100)]
    preview: usize,

    /// Simulated latency of one fetch.
    #[arg(long, default_value_t = 50)]
    latency_ms: u64,

    /// Print final counters in Prometheus text format.
    #[arg(long)]
    metrics: bool,

    /// URLs to fetch, in order. Defaults to a fixed ten-URL workload.
    urls: Vec<String>,
}

#[derive(Debug, Error)]
enum FetchError {
    #[error("expected a single url argument")]
    MissingUrl,
    #[error("unsupported url `{0}`: expected http:// or https://")]
    UnsupportedScheme(String),
}

/// Stand-in for an HTTP GET: sleeps for `latency`, then returns a small page.
fn fetch(args: &Args, latency: Duration) -> Result<Vec<u8>, FetchError> {
    let [ArgValue::Str(url)] = args.positional() else {
        return Err(FetchError::MissingUrl);
    };
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(FetchError::UnsupportedScheme(url.clone()));
    }
    thread::sleep(latency);
    let body = format!(
        "<!doctype html><html><head><title>{url}</title></head><body>simulated response</body></html>"
    );
    Ok(body.into_bytes())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let latency = Duration::from_millis(cli.latency_ms);
    let fetch_url = Memoized::new(
        move |args: &Args| fetch(args, latency),
        StoreConfig::new(cli.capacity, cli.policy),
    )?;

    let urls: Vec<String> = if cli.urls.is_empty() {
        DEFAULT_URLS.iter().map(ToString::to_string).collect()
    } else {
        cli.urls
    };

    for url in &urls {
        let misses_before = fetch_url.cache().misses();
        let start = Instant::now();
        let body = match fetch_url.call(&Args::new().arg(url.as_str())) {
            Ok(body) => body,
            Err(err) => {
                warn!(%url, error = %err, "fetch failed");
                continue;
            },
        };
        let elapsed = start.elapsed();
        let outcome = if fetch_url.cache().misses() > misses_before {
            "miss"
        } else {
            "hit"
        };
        info!(
            %url,
            outcome,
            elapsed_secs = format_args!("{:.4}", elapsed.as_secs_f64()),
            "fetched"
        );

        let shown = match cli.preview {
            0 => &body[..],
            n => &body[..body.len().min(n)],
        };
        println!("{}", String::from_utf8_lossy(shown));
    }

    let metrics = fetch_url.cache().metrics();
    info!(
        policy = %cli.policy,
        capacity = metrics.capacity,
        hits = metrics.hits,
        misses = metrics.misses,
        evictions = metrics.evictions,
        hit_rate = metrics.hit_rate(),
        "replay finished"
    );

    if cli.metrics {
        PrometheusTextExporter::new("memokit_replay", std::io::stdout()).export(&metrics);
    }
    Ok(())
}
