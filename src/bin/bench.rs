use chrono::Utc;
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use oracle_relay::bench::{measure_once, BenchError, Sample, Summary};

/// Measure round-trip latency of the chat endpoint.
#[derive(Debug, Parser)]
#[command(name = "bench", version, about)]
struct Args {
    /// Full URL to request, including the query string
    #[arg(
        long,
        env = "BENCH_URL",
        default_value = "http://localhost:3000/api/OmoshiroikotoItte?userInput=abcd"
    )]
    url: String,

    /// Number of sequential requests
    #[arg(short, long, env = "BENCH_ROUNDS", default_value_t = 10)]
    rounds: usize,

    /// File receiving per-request lines and the summary
    #[arg(long, env = "BENCH_LOG", default_value = "log")]
    log: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args).await {
        tracing::error!(error = %e, "Benchmark failed");
        if let Ok(mut log) = OpenOptions::new().append(true).create(true).open(&args.log) {
            let _ = writeln!(log, "Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), BenchError> {
    let mut log = start_log(&args.log)?;
    let client = reqwest::Client::new();
    let mut samples: Vec<Sample> = Vec::with_capacity(args.rounds);

    tracing::info!(url = %args.url, rounds = args.rounds, "Benchmark started");

    for index in 1..=args.rounds {
        let sample = measure_once(&client, &args.url).await?;
        writeln!(log, "{}", sample.log_line(index))?;
        tracing::debug!(round = index, elapsed_ms = sample.elapsed.as_millis() as u64, "Request done");
        samples.push(sample);
    }

    if let Some(summary) = Summary::from_samples(&samples) {
        write!(log, "{}", summary)?;
        println!("{}", summary);
    }

    Ok(())
}

/// Truncate the log and write the start banner.
fn start_log(path: &Path) -> Result<File, BenchError> {
    let mut file = File::create(path)?;
    writeln!(file, "Benchmark started at {}", Utc::now().to_rfc3339())?;
    Ok(file)
}
